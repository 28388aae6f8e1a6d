//! Drives a run: target resolution, retrieval, extraction, classification.
//!
//! Everything happens strictly in sequence. All device targets are pulled
//! before the first manifest is extracted, and every APK report is handed to
//! the caller as soon as it exists.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classifier::classify_manifest;
use crate::config::Config;
use crate::device::DeviceBridge;
use crate::error::ScanError;
use crate::extractor::ManifestExtractor;
use crate::model::{ApkReport, ManifestDocument, ScanReport, ScanTarget};
use crate::runner::ToolRunner;

/// Sentinel `--apk` value that scans the configured system roots.
pub const SCAN_ALL: &str = "scan_all";

/// What the operator asked to scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Device APK paths (`--apk`).
    pub apks: Vec<String>,
    /// Device directories to search (`--apkpath`).
    pub apk_paths: Vec<String>,
    /// Host APK files (`--local`).
    pub locals: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl ScanRequest {
    pub fn has_targets(&self) -> bool {
        !(self.apks.is_empty() && self.apk_paths.is_empty() && self.locals.is_empty())
    }

    /// True only when `scan_all` is the sole `--apk` value.
    pub fn is_scan_all(&self) -> bool {
        matches!(self.apks.as_slice(), [only] if only.eq_ignore_ascii_case(SCAN_ALL))
    }
}

/// Progress notifications, emitted in the order things happen.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    Searching { root: &'a str },
    Located { root: &'a str, count: usize },
    Retrieving { remote: &'a str },
    Retrieved { local: &'a Path },
    Extracting { apk: &'a Path },
    ManifestSaved { document: &'a ManifestDocument },
    Finished { report: &'a ApkReport },
}

pub struct Orchestrator<'a> {
    runner: &'a dyn ToolRunner,
    config: &'a Config,
}

impl<'a> Orchestrator<'a> {
    pub fn new(runner: &'a dyn ToolRunner, config: &'a Config) -> Self {
        Self { runner, config }
    }

    fn bridge(&self) -> DeviceBridge<'_> {
        DeviceBridge::new(self.runner, &self.config.adb_bin, self.config.no_device_status)
    }

    /// Expands the device side of `request` into concrete device APK paths.
    ///
    /// With `scan_all` only the configured roots are searched and
    /// `--apkpath` values are ignored.
    pub async fn resolve_device_targets<F>(
        &self,
        request: &ScanRequest,
        on_event: &mut F,
    ) -> Result<Vec<ScanTarget>, ScanError>
    where
        F: FnMut(ScanEvent<'_>),
    {
        let bridge = self.bridge();
        let mut targets = Vec::new();

        let roots: &[String] = if request.is_scan_all() {
            info!(roots = ?self.config.scan_all_roots, "scanning whole device");
            &self.config.scan_all_roots
        } else {
            targets.extend(request.apks.iter().map(ScanTarget::device));
            &request.apk_paths
        };

        for root in roots {
            let root = root.as_str();
            on_event(ScanEvent::Searching { root });
            let found = bridge.find_apks(root).await?;
            on_event(ScanEvent::Located {
                root,
                count: found.len(),
            });
            targets.extend(found.into_iter().map(|p| ScanTarget::found_under(root, p)));
        }

        Ok(targets)
    }

    /// Runs the whole scan, calling `on_event` as work progresses.
    ///
    /// # Errors
    ///
    /// Stops at the first retrieval error ([`ScanError::DeviceUnreachable`],
    /// [`ScanError::MissingApk`]), at a failed device search spawn, or when a
    /// manifest text file cannot be written. Decoder problems are not errors.
    pub async fn run<F>(&self, request: &ScanRequest, mut on_event: F) -> Result<ScanReport, ScanError>
    where
        F: FnMut(ScanEvent<'_>),
    {
        if !request.has_targets() {
            debug!("nothing to scan");
            return Ok(ScanReport::new(request.output_dir.clone()));
        }

        let outdir = request.output_dir.as_path();
        let bridge = self.bridge();

        let mut worklist = Vec::new();
        for target in self.resolve_device_targets(request, &mut on_event).await? {
            on_event(ScanEvent::Retrieving {
                remote: target.location.as_str(),
            });
            let local = bridge.pull(&target.location, outdir).await?;
            on_event(ScanEvent::Retrieved { local: &local });
            worklist.push(target.with_local_path(local));
        }
        worklist.extend(request.locals.iter().map(ScanTarget::local));

        debug!(count = worklist.len(), "worklist resolved");

        let mut report = ScanReport::new(request.output_dir.clone());
        for target in worklist {
            let apk_report = self.scan_target(target, outdir, &mut on_event).await?;
            report.apks.push(apk_report);
        }

        Ok(report)
    }

    /// Extracts and classifies one retrieved target.
    ///
    /// # Errors
    ///
    /// [`ScanError::UnresolvedTarget`] when the target has no local APK yet,
    /// or an IO error when the manifest text cannot be written.
    pub async fn scan_target<F>(
        &self,
        target: ScanTarget,
        outdir: &Path,
        on_event: &mut F,
    ) -> Result<ApkReport, ScanError>
    where
        F: FnMut(ScanEvent<'_>),
    {
        let apk = target
            .local_path
            .clone()
            .ok_or_else(|| ScanError::UnresolvedTarget {
                location: target.location.clone(),
            })?;

        let extractor = ManifestExtractor::new(self.runner, &self.config.aapt_bin);
        on_event(ScanEvent::Extracting { apk: &apk });
        let document = extractor.extract(&apk, outdir).await?;
        on_event(ScanEvent::ManifestSaved {
            document: &document,
        });

        let classified = classify_manifest(&document.text);
        let apk_report = ApkReport {
            target,
            apk_name: document.apk_name,
            manifest_path: document.location,
            findings: classified.findings,
            unqualified_grants: classified.unqualified,
            decode_warning: document.warning,
        };
        info!(
            apk = %apk_report.apk_name,
            findings = apk_report.findings.len(),
            vulnerable = apk_report.vulnerable_count(),
            "manifest classified"
        );
        on_event(ScanEvent::Finished {
            report: &apk_report,
        });

        Ok(apk_report)
    }
}
