use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use sonarlog_core::{
    MONO_PROFILE_ID, ScanOptions, ScanReport, default_registry, scan_file, write_message_log,
    write_packets_csv, write_profiles_csv,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("SONARLOG_BUILD_COMMIT"),
    ", ",
    env!("SONARLOG_BUILD_DATE"),
    ")"
);

const INPUT_EXTENSIONS: [&str; 4] = ["svlog", "bin", "log", "raw"];

#[derive(Parser, Debug)]
#[command(name = "sonarlog")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder for Ping Protocol sonar captures.",
    long_about = None,
    after_help = "Examples:\n  sonarlog scan capture.svlog -o packets.json\n  sonarlog scan capture.svlog --format csv --exclude 10 -o packets.csv\n  sonarlog profiles capture.svlog --sender 1 -o profiles.csv"
)]
struct Cli {
    /// Only log errors, and skip the OK message
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log skipped and filtered candidates
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a capture and write the decoded packets.
    #[command(
        after_help = "Examples:\n  sonarlog scan capture.svlog -o packets.json --pretty\n  sonarlog scan capture.svlog --include 2198 --max-packets 100 --stdout\n  sonarlog scan 'logs/*.svlog' --format log -o messages.txt"
    )]
    Scan {
        #[command(flatten)]
        target: Target,

        /// Only keep these message ids (repeatable)
        #[arg(long = "include", value_name = "ID", value_delimiter = ',')]
        include: Vec<u16>,

        /// Drop these message ids (repeatable)
        #[arg(long = "exclude", value_name = "ID", value_delimiter = ',')]
        exclude: Vec<u16>,

        /// Stop after this many accepted packets
        #[arg(long, value_name = "N")]
        max_packets: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Export Mono Profile packets from one sender as CSV.
    Profiles {
        #[command(flatten)]
        target: Target,

        /// Sender (device) id to export
        #[arg(long, default_value_t = 1)]
        sender: u8,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Path (or glob matching exactly one file) to a raw capture
    input: PathBuf,

    /// Output file path
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    output: Option<PathBuf>,

    /// Write output to stdout
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Full scan report (summary, rejections, packets)
    Json,
    /// One row per accepted packet
    Csv,
    /// Human-readable message log
    Log,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            target,
            include,
            exclude,
            max_packets,
            format,
            pretty,
        } => {
            let options = ScanOptions {
                include_ids: include.into_iter().collect(),
                exclude_ids: exclude.into_iter().collect(),
                max_packets,
            };
            cmd_scan(&target, &options, format, pretty, cli.quiet)
        }
        Commands::Profiles { target, sender } => cmd_profiles(&target, sender, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_scan(
    target: &Target,
    options: &ScanOptions,
    format: OutputFormat,
    pretty: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if pretty && format != OutputFormat::Json {
        return Err(CliError::new(
            "--pretty only applies to JSON output",
            Some("drop --pretty or use --format json".to_string()),
        ));
    }
    let input = prepare_target(target)?;
    let report = scan_file(&input, default_registry(), options).context("capture scan failed")?;
    let rendered = render_scan(&report, format, pretty)?;
    emit(target, &rendered, quiet)?;
    if !quiet {
        eprintln!(
            "OK: {} packets accepted, {} rejected",
            report.summary.accepted,
            report.rejections.len()
        );
    }
    Ok(())
}

fn cmd_profiles(target: &Target, sender: u8, quiet: bool) -> Result<(), CliError> {
    let input = prepare_target(target)?;
    let options = ScanOptions {
        include_ids: [MONO_PROFILE_ID].into(),
        ..ScanOptions::default()
    };
    let report = scan_file(&input, default_registry(), &options).context("capture scan failed")?;

    let mut rendered = Vec::new();
    let rows = write_profiles_csv(&mut rendered, &report.packets, sender)
        .context("profile export failed")?;
    if rows == 0 {
        return Err(CliError::new(
            format!("no Mono Profile packets from sender {}", sender),
            Some("check --sender against the device id in the capture".to_string()),
        ));
    }
    emit(target, &rendered, quiet)?;
    if !quiet {
        eprintln!("OK: {} profiles exported", rows);
    }
    Ok(())
}

fn render_scan(report: &ScanReport, format: OutputFormat, pretty: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        OutputFormat::Json if pretty => {
            serde_json::to_writer_pretty(&mut out, report).context("JSON serialization failed")?
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut out, report).context("JSON serialization failed")?
        }
        OutputFormat::Csv => {
            write_packets_csv(&mut out, &report.packets).context("CSV export failed")?
        }
        OutputFormat::Log => {
            write_message_log(&mut out, &report.packets).context("message log export failed")?
        }
    }
    Ok(out)
}

/// Resolve and validate the input, and make sure the output will not
/// overwrite it.
fn prepare_target(target: &Target) -> Result<PathBuf, CliError> {
    let resolved = resolve_input_path(&target.input)?;
    validate_input_file(&resolved)?;
    let input_abs = fs::canonicalize(&resolved)
        .with_context(|| format!("Failed to resolve input path: {}", resolved.display()))?;
    debug!(input = %input_abs.display(), "input resolved");

    if target.stdout {
        return Ok(resolved);
    }
    let output = target.output.as_ref().ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--output or --stdout".to_string()),
        )
    })?;
    let output_dir = output
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing output directory is created later, so it cannot alias the input.
    if let Ok(Some(dir)) = output_dir {
        let name = output
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
        if dir.join(name) == input_abs {
            return Err(CliError::new(
                format!("output path must differ from input: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(resolved)
}

fn emit(target: &Target, bytes: &[u8], quiet: bool) -> Result<(), CliError> {
    let output = match (&target.output, target.stdout) {
        (Some(output), false) => output,
        _ => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
            return Ok(());
        }
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(output, bytes)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    if !quiet {
        eprintln!("OK: output written -> {}", output.display());
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    let hint = format!("use a raw capture file (.{})", INPUT_EXTENSIONS.join(", ."));
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(hint),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(hint),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !INPUT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some(hint),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
