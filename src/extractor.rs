//! Manifest extraction with `aapt d xmltree`.

use std::path::Path;
use tracing::warn;

use crate::error::ScanError;
use crate::model::ManifestDocument;
use crate::runner::ToolRunner;

/// Name of the text file a manifest dump is saved under.
pub fn manifest_file_name(apk_name: &str) -> String {
    format!("Manifest_{}.txt", apk_name)
}

pub struct ManifestExtractor<'a> {
    runner: &'a dyn ToolRunner,
    aapt_bin: &'a str,
}

impl<'a> ManifestExtractor<'a> {
    pub fn new(runner: &'a dyn ToolRunner, aapt_bin: &'a str) -> Self {
        Self { runner, aapt_bin }
    }

    /// Dumps the manifest tree of `apk` and saves it into `outdir`.
    ///
    /// Decoder failures are not errors: whatever was captured (possibly
    /// nothing) is still written and returned, with a warning attached.
    /// Only writing the text file can fail.
    pub async fn extract(&self, apk: &Path, outdir: &Path) -> Result<ManifestDocument, ScanError> {
        let apk_name = apk
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| apk.display().to_string());

        let args = vec![
            "d".to_string(),
            "xmltree".to_string(),
            apk.display().to_string(),
            "AndroidManifest.xml".to_string(),
        ];

        let (text, warning) = match self.runner.run(self.aapt_bin, &args).await {
            Ok(output) if !output.success() => {
                let status = output
                    .status
                    .map_or_else(|| "a signal".to_string(), |c| format!("status {}", c));
                (output.stdout, Some(format!("{} exited with {}", self.aapt_bin, status)))
            }
            Ok(output) if output.stdout.trim().is_empty() => {
                (output.stdout, Some(format!("{} printed no manifest", self.aapt_bin)))
            }
            Ok(output) => (output.stdout, None),
            Err(e) => (String::new(), Some(e.to_string())),
        };

        if let Some(ref w) = warning {
            warn!(apk = %apk.display(), "manifest decoding problem: {}", w);
        }

        let location = outdir.join(manifest_file_name(&apk_name));
        tokio::fs::write(&location, text.as_bytes()).await?;

        Ok(ManifestDocument {
            apk_name,
            text,
            location,
            warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::FakeRunner;
    use crate::runner::ToolOutput;

    const DUMP: &str = "N: android=http://schemas.android.com/apk/res/android\n  E: manifest (line=2)\n";

    #[test]
    fn test_manifest_file_name() {
        assert_eq!(manifest_file_name("test.apk"), "Manifest_test.apk.txt");
    }

    #[tokio::test]
    async fn test_extract_writes_verbatim_text() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(0, DUMP)));
        let extractor = ManifestExtractor::new(&runner, "aapt");

        let doc = extractor
            .extract(Path::new("apks/test.apk"), dir.path())
            .await
            .unwrap();

        assert_eq!(doc.apk_name, "test.apk");
        assert_eq!(doc.text, DUMP);
        assert_eq!(doc.location, dir.path().join("Manifest_test.apk.txt"));
        assert!(doc.warning.is_none());
        assert_eq!(std::fs::read_to_string(&doc.location).unwrap(), DUMP);

        let calls = runner.calls();
        assert_eq!(calls[0].0, "aapt");
        assert_eq!(
            calls[0].1,
            vec!["d", "xmltree", "apks/test.apk", "AndroidManifest.xml"]
        );
    }

    #[tokio::test]
    async fn test_decoder_failure_still_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(1, "")));
        let extractor = ManifestExtractor::new(&runner, "aapt");

        let doc = extractor
            .extract(Path::new("broken.apk"), dir.path())
            .await
            .unwrap();

        assert!(doc.text.is_empty());
        assert!(doc.warning.as_deref().unwrap().contains("status 1"));
        assert!(doc.location.is_file());
    }

    #[tokio::test]
    async fn test_missing_decoder_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|program, _| {
            Err(ScanError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });
        let extractor = ManifestExtractor::new(&runner, "aapt");

        let doc = extractor
            .extract(Path::new("a.apk"), dir.path())
            .await
            .unwrap();

        assert!(doc.text.is_empty());
        assert!(doc.warning.is_some());
        assert_eq!(std::fs::read_to_string(&doc.location).unwrap(), "");
    }

    #[tokio::test]
    async fn test_empty_output_warns() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ToolOutput::new(0, "\n")));
        let extractor = ManifestExtractor::new(&runner, "aapt");

        let doc = extractor
            .extract(Path::new("a.apk"), dir.path())
            .await
            .unwrap();
        assert!(doc.warning.unwrap().contains("no manifest"));
    }
}
