//! Configuration file handling.
//!
//! This module provides loading of urigrant configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/urigrant/config.toml`
//! - macOS: `~/Library/Application Support/urigrant/config.toml`
//! - Windows: `%APPDATA%\urigrant\config.toml`
//!
//! A different file can be selected with `--config`.
//!
//! # Example Configuration
//!
//! ```toml
//! adb_bin = "/opt/android-sdk/platform-tools/adb"
//! aapt_bin = "/opt/android-sdk/build-tools/34.0.0/aapt"
//! scan_all_roots = ["/system/app", "/system/sd/app"]
//! no_device_status = 1
//! default_format = "table"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Application configuration.
///
/// Holds the names of the external tools and the device roots used by a
/// device-wide scan. Tests build one directly to point at fake binaries.
///
/// # Example
///
/// ```no_run
/// use urigrant::Config;
///
/// let config = Config::load().unwrap();
/// println!("adb: {}", config.adb_bin);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device bridge executable.
    ///
    /// Default: `adb` (resolved through `PATH`)
    pub adb_bin: String,

    /// Package inspection executable used to dump the manifest tree.
    ///
    /// Default: `aapt` (resolved through `PATH`)
    pub aapt_bin: String,

    /// Device directories searched when `--apk scan_all` is given.
    pub scan_all_roots: Vec<String>,

    /// Exit status of `adb pull` that means no device is attached.
    ///
    /// Default: 1
    pub no_device_status: i32,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json", "sarif"
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb_bin: "adb".to_string(),
            aapt_bin: "aapt".to_string(),
            scan_all_roots: vec!["/system/app".to_string(), "/system/sd/app".to_string()],
            no_device_status: 1,
            default_format: "table".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ScanError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path.
    ///
    /// A missing file yields the defaults, same as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ScanError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use urigrant::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("urigrant")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.adb_bin, "adb");
        assert_eq!(config.aapt_bin, "aapt");
        assert_eq!(config.scan_all_roots, vec!["/system/app", "/system/sd/app"]);
        assert_eq!(config.no_device_status, 1);
        assert_eq!(config.default_format, "table");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "aapt_bin = \"/sdk/build-tools/aapt\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.aapt_bin, "/sdk/build-tools/aapt");
        assert_eq!(config.adb_bin, "adb");
        assert_eq!(config.scan_all_roots.len(), 2);
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "no_device_status = \"one\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }
}
