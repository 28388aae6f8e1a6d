//! `grant-uri-permission` detection over decoded manifest trees.
//!
//! `aapt d xmltree` prints one element or attribute per line:
//!
//! ```text
//!       E: grant-uri-permission (line=42)
//!         A: android:pathPrefix(0x01010004)="/" (Raw: "/")
//! ```
//!
//! A finding is a `grant-uri-permission` element whose next line carries a
//! `path`, `pathPattern` or `pathPrefix` attribute. Elements without one are
//! counted separately and never become findings.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{PermissionFinding, QualifierKind};

static GRANT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"grant-uri-permission.*?\n.*?path(Pattern|Prefix)?\([0-9a-fx]*\)="(.*?)""#)
        .unwrap()
});

static GRANT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*E: grant-uri-permission\b").unwrap());

/// Outcome of scanning one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub findings: Vec<PermissionFinding>,
    /// Grant elements with no captured path qualifier.
    pub unqualified: usize,
}

/// Extracts `(qualifier, value)` pairs in source order.
pub fn extract_grant_paths(text: &str) -> Vec<(QualifierKind, String)> {
    GRANT_PATH
        .captures_iter(text)
        .filter_map(|caps| {
            let suffix = caps.get(1).map_or("", |m| m.as_str());
            let kind = QualifierKind::from_suffix(suffix)?;
            let value = caps.get(2).map_or("", |m| m.as_str());
            Some((kind, value.to_string()))
        })
        .collect()
}

/// Classifies every qualified grant in `text`. Never fails.
pub fn classify_manifest(text: &str) -> Classified {
    let findings: Vec<PermissionFinding> = extract_grant_paths(text)
        .into_iter()
        .enumerate()
        .map(|(i, (kind, value))| PermissionFinding::new(i + 1, kind, value))
        .collect();

    let elements = GRANT_ELEMENT.find_iter(text).count();
    let unqualified = elements.saturating_sub(findings.len());

    Classified {
        findings,
        unqualified,
    }
}
