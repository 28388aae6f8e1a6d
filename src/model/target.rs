use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a scan target came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TargetOrigin {
    /// Named explicitly with `--apk`.
    DevicePath,
    /// Found by searching a device directory.
    DeviceSearch { root: String },
    /// Named with `--local`; never touches the device.
    LocalFile,
}

/// One APK to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanTarget {
    pub origin: TargetOrigin,
    /// Device path for device targets, host path for local ones.
    pub location: String,
    /// Host path of the APK once it is available for extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

impl ScanTarget {
    pub fn device(path: impl Into<String>) -> Self {
        Self {
            origin: TargetOrigin::DevicePath,
            location: path.into(),
            local_path: None,
        }
    }

    pub fn found_under(root: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: TargetOrigin::DeviceSearch { root: root.into() },
            location: path.into(),
            local_path: None,
        }
    }

    /// Local targets are resolved from the start.
    pub fn local(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            origin: TargetOrigin::LocalFile,
            location: path.display().to_string(),
            local_path: Some(path.to_path_buf()),
        }
    }

    pub fn with_local_path(mut self, path: PathBuf) -> Self {
        self.local_path = Some(path);
        self
    }
}

/// File name component of a device path (`/system/app/Gmail.apk` -> `Gmail.apk`).
pub fn remote_file_name(remote: &str) -> &str {
    remote
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(remote)
}
