use crate::model::ScanReport;
use anyhow::Result;

pub fn print_json(result: &ScanReport) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}
