//! SARIF (Static Analysis Results Interchange Format) output.
//!
//! With `--format sarif` every finding becomes one SARIF result located at
//! the saved manifest text file, so audits can be fed into code scanning
//! dashboards.

use crate::model::{Classification, PermissionFinding, ScanReport};
use anyhow::Result;
use serde::Serialize;

const GRANT_DOC_URI: &str =
    "https://developer.android.com/guide/topics/manifest/grant-uri-permission-element";

const RULE_ROOT_GRANT: &str = "grant-uri-permission/root-path";
const RULE_REVIEW_GRANT: &str = "grant-uri-permission/manual-review";

/// SARIF v2.1.0 schema root
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "helpUri")]
    help_uri: &'static str,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifRuleConfiguration,
}

#[derive(Serialize)]
struct SarifRuleConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn classification_to_sarif_level(classification: Classification) -> &'static str {
    match classification {
        Classification::Vulnerable => "error",
        Classification::NeedsManualReview => "note",
    }
}

fn rule_id(classification: Classification) -> &'static str {
    match classification {
        Classification::Vulnerable => RULE_ROOT_GRANT,
        Classification::NeedsManualReview => RULE_REVIEW_GRANT,
    }
}

fn rules() -> Vec<SarifRule> {
    vec![
        SarifRule {
            id: RULE_ROOT_GRANT,
            name: "RootPathUriGrant",
            short_description: SarifMessage {
                text: "grant-uri-permission covers the whole content provider path tree"
                    .to_string(),
            },
            help_uri: GRANT_DOC_URI,
            default_configuration: SarifRuleConfiguration {
                level: classification_to_sarif_level(Classification::Vulnerable),
            },
        },
        SarifRule {
            id: RULE_REVIEW_GRANT,
            name: "NarrowUriGrant",
            short_description: SarifMessage {
                text: "grant-uri-permission path rule that may still be too broad".to_string(),
            },
            help_uri: GRANT_DOC_URI,
            default_configuration: SarifRuleConfiguration {
                level: classification_to_sarif_level(Classification::NeedsManualReview),
            },
        },
    ]
}

fn sarif_result(apk_name: &str, uri: String, finding: &PermissionFinding) -> SarifResult {
    SarifResult {
        rule_id: rule_id(finding.classification),
        level: classification_to_sarif_level(finding.classification),
        message: SarifMessage {
            text: format!(
                "{}: instance {} grants {}=\"{}\" ({})",
                apk_name,
                finding.instance,
                finding.qualifier,
                finding.value,
                finding.classification
            ),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation { uri },
            },
        }],
    }
}

/// Generate SARIF as a string (for file output)
pub fn generate_sarif_string(result: &ScanReport) -> Result<String> {
    let results = result
        .apks
        .iter()
        .flat_map(|apk| {
            let uri = apk.manifest_path.display().to_string();
            apk.findings
                .iter()
                .map(move |f| sarif_result(&apk.apk_name, uri.clone(), f))
        })
        .collect();

    let report = SarifReport {
        schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "urigrant",
                    version: env!("CARGO_PKG_VERSION"),
                    rules: rules(),
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

/// Generate and print SARIF output
pub fn print_sarif(result: &ScanReport) -> Result<()> {
    println!("{}", generate_sarif_string(result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApkReport, QualifierKind, ScanTarget};
    use std::path::PathBuf;

    fn report() -> ScanReport {
        let mut report = ScanReport::new(PathBuf::from("out"));
        report.apks.push(ApkReport {
            target: ScanTarget::local("Mail.apk"),
            apk_name: "Mail.apk".to_string(),
            manifest_path: PathBuf::from("out/Manifest_Mail.apk.txt"),
            findings: vec![
                PermissionFinding::new(1, QualifierKind::PathPrefix, "/"),
                PermissionFinding::new(2, QualifierKind::Path, "/attachments"),
            ],
            unqualified_grants: 0,
            decode_warning: None,
        });
        report
    }

    #[test]
    fn test_one_result_per_finding() {
        let json: serde_json::Value =
            serde_json::from_str(&generate_sarif_string(&report()).unwrap()).unwrap();

        let results = json["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["ruleId"], RULE_ROOT_GRANT);
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[1]["ruleId"], RULE_REVIEW_GRANT);
        assert_eq!(results[1]["level"], "note");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "out/Manifest_Mail.apk.txt"
        );
    }

    #[test]
    fn test_empty_report_still_lists_rules() {
        let empty = ScanReport::new(PathBuf::from("."));
        let json: serde_json::Value =
            serde_json::from_str(&generate_sarif_string(&empty).unwrap()).unwrap();

        assert_eq!(json["version"], "2.1.0");
        assert!(json["runs"][0]["results"].as_array().unwrap().is_empty());
        assert_eq!(json["runs"][0]["tool"]["driver"]["rules"].as_array().unwrap().len(), 2);
    }
}
