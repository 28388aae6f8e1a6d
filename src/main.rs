use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use urigrant::{
    output::{print_result, ConsoleReporter, OutputFormat},
    Config, Orchestrator, ScanError, ScanRequest, SystemRunner,
};

/// Exit codes for scripted audits. Usage errors exit with clap's status 2.
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const VULNERABLE: u8 = 3;
}

#[derive(Parser, Debug)]
#[command(name = "urigrant")]
#[command(
    author,
    version,
    about = "Scan Android APK manifests for overly broad grant-uri-permission rules",
    long_about = "Pulls APKs from a connected device (or takes local files), dumps their \
                  AndroidManifest.xml with aapt, and flags grant-uri-permission rules that \
                  may let any installed app read a content provider's data."
)]
#[command(group(
    ArgGroup::new("targets")
        .required(true)
        .multiple(true)
        .args(["apks", "apk_paths", "locals"])
))]
struct Cli {
    /// Directory for pulled APKs and manifest dumps (must exist)
    #[arg(short = 'o', long = "output-dir", default_value = ".", value_parser = existing_dir)]
    output_dir: PathBuf,

    /// Device path of an APK to scan, e.g. /system/app/Gmail.apk. Use `scan_all`
    /// alone to scan every APK under /system/app and /system/sd/app
    #[arg(short = 'a', long = "apk", value_name = "DEVICE_PATH")]
    apks: Vec<String>,

    /// Local APK file to scan
    #[arg(short = 'l', long = "local", value_name = "LOCAL_PATH")]
    locals: Vec<PathBuf>,

    /// Device directory to search for APKs, e.g. /system/app
    #[arg(short = 'A', long = "apkpath", value_name = "DEVICE_DIR")]
    apk_paths: Vec<String>,

    /// Output format (table, json, sarif)
    #[arg(short, long, value_parser = OutputFormat::from_str)]
    format: Option<OutputFormat>,

    /// Also write the JSON report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// adb executable (overrides the config file)
    #[arg(long, value_name = "PATH")]
    adb_bin: Option<String>,

    /// aapt executable (overrides the config file)
    #[arg(long, value_name = "PATH")]
    aapt_bin: Option<String>,

    /// Exit with status 3 if any rule looks vulnerable
    #[arg(long)]
    fail_on_vulnerable: bool,

    /// Log every external command
    #[arg(short, long)]
    verbose: bool,
}

fn existing_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("Invalid output directory: {}", s))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            match e.downcast_ref::<ScanError>() {
                Some(scan_err) if scan_err.is_fatal() => eprintln!("{}", scan_err),
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "urigrant=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    if let Some(ref adb) = cli.adb_bin {
        config.adb_bin = adb.clone();
    }
    if let Some(ref aapt) = cli.aapt_bin {
        config.aapt_bin = aapt.clone();
    }

    Ok(config)
}

async fn run(cli: Cli) -> Result<u8> {
    let config = load_config(&cli)?;

    let format = match cli.format {
        Some(format) => format,
        None => OutputFormat::from_str(&config.default_format)
            .map_err(|e| anyhow::anyhow!("default_format in config: {}", e))?,
    };
    let is_interactive = format == OutputFormat::Table;

    let request = ScanRequest {
        apks: cli.apks,
        apk_paths: cli.apk_paths,
        locals: cli.locals,
        output_dir: cli.output_dir,
    };

    let runner = SystemRunner;
    let orchestrator = Orchestrator::new(&runner, &config);
    let mut console = ConsoleReporter::new(is_interactive);

    let result = orchestrator
        .run(&request, |event| console.handle(event))
        .await?;
    drop(console);

    if let Some(path) = cli.report {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    }

    print_result(&result, format)?;

    if cli.fail_on_vulnerable && result.has_vulnerable() {
        return Ok(exit_codes::VULNERABLE);
    }
    Ok(exit_codes::SUCCESS)
}
