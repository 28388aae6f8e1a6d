//! Core data types for scan targets, findings, and scan reports.
//!
//! This module contains the fundamental types used throughout urigrant:
//!
//! - [`ScanTarget`] - One APK to scan and where it came from
//! - [`ManifestDocument`] - Decoded manifest text saved to disk
//! - [`PermissionFinding`] - One `grant-uri-permission` path rule
//! - [`ApkReport`] - Everything found in one APK
//! - [`ScanReport`] - Complete results of one run
//!
//! # Example
//!
//! ```
//! use urigrant::{Classification, QualifierKind, PermissionFinding};
//!
//! let finding = PermissionFinding::new(1, QualifierKind::PathPrefix, "/");
//! assert_eq!(finding.classification, Classification::Vulnerable);
//! ```

mod finding;
mod target;

pub use finding::*;
pub use target::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Results for a single APK.
#[derive(Debug, Clone, Serialize)]
pub struct ApkReport {
    pub target: ScanTarget,
    pub apk_name: String,
    pub manifest_path: PathBuf,
    pub findings: Vec<PermissionFinding>,
    /// `grant-uri-permission` elements without a captured path qualifier.
    pub unqualified_grants: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_warning: Option<String>,
}

impl ApkReport {
    pub fn vulnerable_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_vulnerable()).count()
    }

    pub fn review_count(&self) -> usize {
        self.findings.len() - self.vulnerable_count()
    }
}

/// Results for a whole run, in processing order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub output_dir: PathBuf,
    pub apks: Vec<ApkReport>,
}

impl ScanReport {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            scan_time: Utc::now(),
            output_dir,
            apks: Vec::new(),
        }
    }

    pub fn total_findings(&self) -> usize {
        self.apks.iter().map(|a| a.findings.len()).sum()
    }

    pub fn has_vulnerable(&self) -> bool {
        self.apks.iter().any(|a| a.vulnerable_count() > 0)
    }
}
