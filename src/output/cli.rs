use crate::model::{ApkReport, Classification, ScanReport};
use crate::orchestrator::ScanEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ApkRow {
    #[tabled(rename = "APK")]
    apk: String,
    #[tabled(rename = "Grants")]
    grants: usize,
    #[tabled(rename = "Vulnerable")]
    vulnerable: usize,
    #[tabled(rename = "Review")]
    review: usize,
    #[tabled(rename = "No Path")]
    unqualified: usize,
    #[tabled(rename = "Manifest")]
    manifest: String,
}

/// Console lines describing one APK, in the order they are printed.
pub fn apk_report_lines(report: &ApkReport) -> Vec<String> {
    let mut lines = vec![format!(
        "The AndroidManifest.xml for {} has been saved at location: {}",
        report.apk_name,
        report.manifest_path.display()
    )];

    if let Some(ref warning) = report.decode_warning {
        lines.push(format!(
            "Warning: the manifest of {} could not be decoded cleanly ({})",
            report.apk_name, warning
        ));
    }

    lines.push(format!(
        "Found {} instances of grant-uri-permission",
        report.findings.len()
    ));

    for finding in &report.findings {
        let line = match finding.classification {
            Classification::Vulnerable => format!(
                "({}=\"{}\") Instance {} looks vulnerable. It may be possible for any app to query data of this content provider.",
                finding.qualifier, finding.value, finding.instance
            ),
            Classification::NeedsManualReview => format!(
                "({}=\"{}\") Instance {} needs manual review. It's worth analysing the AndroidManifest.xml manually.",
                finding.qualifier, finding.value, finding.instance
            ),
        };
        lines.push(line);
    }

    if report.unqualified_grants > 0 {
        lines.push(format!(
            "Note: {} grant-uri-permission element(s) declare no path, pathPattern or pathPrefix and were not classified. Review them manually.",
            report.unqualified_grants
        ));
    }

    lines
}

/// Prints scan progress as it happens.
///
/// Interactive mode prints every step and shows a spinner while an external
/// tool runs. Otherwise stdout is left for the machine-readable report.
pub struct ConsoleReporter {
    interactive: bool,
    spinner: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            spinner: None,
        }
    }

    pub fn handle(&mut self, event: ScanEvent<'_>) {
        if !self.interactive {
            return;
        }

        match event {
            ScanEvent::Searching { root } => {
                self.start(format!("Searching {} for APKs...", root));
            }
            ScanEvent::Located { root, count } => {
                self.stop();
                println!("Found {} APKs under {}", count, root);
            }
            ScanEvent::Retrieving { remote } => {
                self.start(format!("Downloading apk {}...", remote));
            }
            ScanEvent::Retrieved { local } => {
                self.stop();
                println!("The apk has been saved to: {}", local.display());
            }
            ScanEvent::Extracting { apk } => {
                self.start(format!("Extracting manifest from {}...", apk.display()));
            }
            ScanEvent::ManifestSaved { .. } => self.stop(),
            ScanEvent::Finished { report } => {
                println!();
                for line in apk_report_lines(report) {
                    println!("{}", line);
                }
            }
        }
    }

    fn start(&mut self, message: String) {
        self.stop();
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message);
        self.spinner = Some(pb);
    }

    fn stop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn print_summary_table(result: &ScanReport) {
    println!();

    if result.apks.is_empty() {
        println!("No APKs were scanned.");
        return;
    }

    let rows: Vec<ApkRow> = result
        .apks
        .iter()
        .map(|a| ApkRow {
            apk: truncate(&a.apk_name, 40),
            grants: a.findings.len(),
            vulnerable: a.vulnerable_count(),
            review: a.review_count(),
            unqualified: a.unqualified_grants,
            manifest: a.manifest_path.display().to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!();

    let vulnerable: usize = result.apks.iter().map(|a| a.vulnerable_count()).sum();
    println!(
        "Scanned {} APKs: {} grant-uri-permission rules, {} vulnerable",
        result.apks.len(),
        result.total_findings(),
        vulnerable
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
