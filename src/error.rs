//! Error types for device, decoder and configuration failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving, retrieving or decoding scan targets.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The device bridge exited with the status it uses for "no device".
    #[error(
        "Looks like the device is not connected. Please connect your Android device via USB and enable USB debugging"
    )]
    DeviceUnreachable,

    /// The pull finished but the APK never showed up locally.
    #[error("APK pulled from {remote}, but it does not exist locally: {}", local.display())]
    MissingApk { remote: String, local: PathBuf },

    /// An external tool could not be started at all.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A target reached extraction without a local APK path.
    #[error("No local APK for scan target {location}")]
    UnresolvedTarget { location: String },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Returns true for errors that must stop the whole run immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::DeviceUnreachable)
    }
}
