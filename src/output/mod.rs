mod cli;
mod json;
mod sarif;

pub use cli::{apk_report_lines, print_summary_table, ConsoleReporter};
pub use json::print_json;
pub use sarif::{generate_sarif_string, print_sarif};

use crate::model::ScanReport;
use anyhow::Result;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines per APK, streamed as each one finishes
    Table,
    /// JSON format for programmatic use
    Json,
    /// SARIF format for code scanning dashboards
    Sarif,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'json', or 'sarif'",
                s
            )),
        }
    }
}

/// Prints the end-of-run output. For `Table` the per-APK lines were already
/// streamed, so only the summary is left.
pub fn print_result(result: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print_summary_table(result);
            Ok(())
        }
        OutputFormat::Json => print_json(result),
        OutputFormat::Sarif => print_sarif(result),
    }
}
