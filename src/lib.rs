pub mod classifier;
pub mod config;
pub mod device;
pub mod error;
pub mod extractor;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod runner;

pub use config::Config;
pub use error::ScanError;
pub use model::{
    ApkReport, Classification, PermissionFinding, QualifierKind, ScanReport, ScanTarget,
};
pub use orchestrator::{Orchestrator, ScanRequest};
pub use runner::{SystemRunner, ToolRunner};
