use serde::Serialize;
use std::path::PathBuf;

/// Which path attribute a `grant-uri-permission` rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualifierKind {
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "pathPattern")]
    PathPattern,
    #[serde(rename = "pathPrefix")]
    PathPrefix,
}

impl QualifierKind {
    /// Maps the suffix following `path` in the attribute name.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" => Some(QualifierKind::Path),
            "Pattern" => Some(QualifierKind::PathPattern),
            "Prefix" => Some(QualifierKind::PathPrefix),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualifierKind::Path => "path",
            QualifierKind::PathPattern => "pathPattern",
            QualifierKind::PathPrefix => "pathPrefix",
        }
    }
}

impl std::fmt::Display for QualifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// The rule covers the provider's whole path hierarchy.
    Vulnerable,
    /// Narrower rule that may still be too broad.
    NeedsManualReview,
}

impl Classification {
    /// Classifies a captured path value. Only a bare `/` is vulnerable.
    pub fn of(value: &str) -> Self {
        if value == "/" {
            Classification::Vulnerable
        } else {
            Classification::NeedsManualReview
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Classification::Vulnerable => "Vulnerable",
            Classification::NeedsManualReview => "Needs manual review",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One `grant-uri-permission` declaration with a path qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionFinding {
    /// 1-based position among the findings of its manifest.
    pub instance: usize,
    pub qualifier: QualifierKind,
    pub value: String,
    pub classification: Classification,
}

impl PermissionFinding {
    pub fn new(instance: usize, qualifier: QualifierKind, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            instance,
            qualifier,
            classification: Classification::of(&value),
            value,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        self.classification == Classification::Vulnerable
    }
}

/// Decoded manifest tree of one APK, as written to the output directory.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    pub apk_name: String,
    pub text: String,
    pub location: PathBuf,
    /// Set when the decoder failed or produced nothing.
    pub warning: Option<String>,
}
