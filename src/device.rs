//! Device access over `adb`: APK discovery and retrieval.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::model::remote_file_name;
use crate::runner::ToolRunner;

/// Thin wrapper around the device bridge binary.
pub struct DeviceBridge<'a> {
    runner: &'a dyn ToolRunner,
    adb_bin: &'a str,
    no_device_status: i32,
}

impl<'a> DeviceBridge<'a> {
    pub fn new(runner: &'a dyn ToolRunner, adb_bin: &'a str, no_device_status: i32) -> Self {
        Self {
            runner,
            adb_bin,
            no_device_status,
        }
    }

    /// Lists `*.apk` files below `root` on the device.
    ///
    /// Best effort: whatever `find` prints is taken as-is, and a failing
    /// `find` (permission denied on part of the tree, missing root) still
    /// yields the paths it did print.
    pub async fn find_apks(&self, root: &str) -> Result<Vec<String>, ScanError> {
        let args = ["shell", "find", root, "-name", "*.apk"].map(String::from);
        let output = self.runner.run(self.adb_bin, &args).await?;

        if !output.success() {
            debug!(root, status = ?output.status, "device find reported failure");
        }

        let apks: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        info!(root, count = apks.len(), "located APKs on device");
        Ok(apks)
    }

    /// Pulls `remote` into `outdir` and returns the local file path.
    ///
    /// # Errors
    ///
    /// [`ScanError::DeviceUnreachable`] when adb exits with the no-device
    /// status, [`ScanError::MissingApk`] when the pulled file is not there
    /// afterwards.
    pub async fn pull(&self, remote: &str, outdir: &Path) -> Result<PathBuf, ScanError> {
        let args = vec![
            "pull".to_string(),
            remote.to_string(),
            outdir.display().to_string(),
        ];
        let output = self.runner.run(self.adb_bin, &args).await?;

        match output.status {
            Some(code) if code == self.no_device_status => {
                return Err(ScanError::DeviceUnreachable);
            }
            Some(0) => {}
            status => warn!(remote, ?status, "adb pull exited abnormally"),
        }

        let local = outdir.join(remote_file_name(remote));
        if !local.is_file() {
            return Err(ScanError::MissingApk {
                remote: remote.to_string(),
                local,
            });
        }

        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::FakeRunner;
    use crate::runner::ToolOutput;

    #[tokio::test]
    async fn test_find_apks_drops_blank_lines() {
        let runner = FakeRunner::new(|_, _| {
            Ok(ToolOutput::new(
                0,
                "/system/app/Gmail.apk\r\n\r\n  /system/app/Maps/Maps.apk  \n\n",
            ))
        });
        let bridge = DeviceBridge::new(&runner, "adb", 1);

        let apks = bridge.find_apks("/system/app").await.unwrap();
        assert_eq!(apks, vec!["/system/app/Gmail.apk", "/system/app/Maps/Maps.apk"]);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "adb");
        assert_eq!(
            calls[0].1,
            vec!["shell", "find", "/system/app", "-name", "*.apk"]
        );
    }

    #[tokio::test]
    async fn test_find_apks_keeps_partial_output_on_failure() {
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(1, "/data/app/a.apk\n")));
        let bridge = DeviceBridge::new(&runner, "adb", 1);

        let apks = bridge.find_apks("/data/app").await.unwrap();
        assert_eq!(apks, vec!["/data/app/a.apk"]);
    }

    #[tokio::test]
    async fn test_pull_returns_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, args| {
            std::fs::write(Path::new(&args[2]).join("Gmail.apk"), b"PK").unwrap();
            Ok(ToolOutput::new(0, ""))
        });
        let bridge = DeviceBridge::new(&runner, "adb", 1);

        let local = bridge.pull("/system/app/Gmail.apk", dir.path()).await.unwrap();
        assert_eq!(local, dir.path().join("Gmail.apk"));
    }

    #[tokio::test]
    async fn test_pull_no_device_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(1, "")));
        let bridge = DeviceBridge::new(&runner, "adb", 1);

        let err = bridge
            .pull("/system/app/Gmail.apk", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::DeviceUnreachable));
    }

    #[tokio::test]
    async fn test_pull_success_without_file_is_missing_apk() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(0, "")));
        let bridge = DeviceBridge::new(&runner, "adb", 1);

        let err = bridge
            .pull("/system/app/Gmail.apk", dir.path())
            .await
            .unwrap_err();
        match err {
            ScanError::MissingApk { remote, local } => {
                assert_eq!(remote, "/system/app/Gmail.apk");
                assert_eq!(local, dir.path().join("Gmail.apk"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_custom_no_device_status() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(255, "")));
        let bridge = DeviceBridge::new(&runner, "/opt/adb", 255);

        let err = bridge.pull("/system/app/X.apk", dir.path()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(runner.calls()[0].0, "/opt/adb");
    }
}
