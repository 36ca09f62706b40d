//! assetdupe - find duplicate files in game asset folders.
//!
//! Usage:
//!   assetdupe [ROOTS]...                 Scan with the built-in asset extensions
//!   assetdupe DIR --ext dds --ext nif    Only consider the given extensions
//!   assetdupe DIR --min-size 4KB         Ignore files smaller than 4 KiB
//!   assetdupe --request scan.json        Load the scan request from a file
//!   assetdupe --help                     Show help
//!
//! Exit status: 0 when duplicates were found, 2 when none were, 130 when the
//! scan was interrupted, 1 on any other failure.

mod logging;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};

use assetdupe_analyze::{
    EngineConfig, ScanEvent, ScanProgress, ScanRequest, ScanResult, start_scan,
};

const EXIT_NO_DUPLICATES: u8 = 2;
const EXIT_CANCELED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "assetdupe",
    version,
    about = "Find duplicate files in game asset folders",
    long_about = "assetdupe walks one or more folders, picks files by extension, and \
                  reports groups of byte-identical files. Only files that share a size \
                  are read and hashed (BLAKE3).\n\n\
                  Press Ctrl-C to cancel a running scan."
)]
struct Cli {
    /// Folders to scan (override the roots of --request)
    roots: Vec<PathBuf>,

    /// Extension to include, repeatable (defaults to common asset formats)
    #[arg(short, long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Minimum file size to consider (e.g., "1", "512B", "4KB", "1MB")
    #[arg(short, long)]
    min_size: Option<String>,

    /// Stop collecting after this many matching files
    #[arg(long)]
    max_files: Option<usize>,

    /// Maximum number of duplicate groups to print (text format only)
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Read the scan request from a JSON file
    #[arg(short, long, value_name = "FILE")]
    request: Option<PathBuf>,

    /// Do not print progress to stderr
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let request = build_request(&cli)?;
    let scan_id = format!("cli-{}", std::process::id());
    tracing::debug!(scan_id = %scan_id, roots = request.roots.len(), "starting scan");

    let (mut events, state) = start_scan(scan_id, request, EngineConfig::default());

    let interrupt = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, canceling scan");
            interrupt.cancel();
        }
    });

    let mut progress = ProgressLine::new(!cli.quiet);
    let mut outcome = None;
    while let Some(event) = events.recv().await {
        match event {
            ScanEvent::Progress(p) => progress.update(&p),
            ScanEvent::Complete(result) => outcome = Some(result),
        }
    }
    progress.finish();

    match outcome {
        Some(Ok(result)) => {
            print_report(&result, cli.format, cli.top)?;
            if result.has_duplicates() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_NO_DUPLICATES))
            }
        }
        Some(Err(err)) if err.is_canceled() => {
            eprintln!("Scan canceled.");
            Ok(ExitCode::from(EXIT_CANCELED))
        }
        Some(Err(err)) => Err(err).wrap_err("Scan failed"),
        None => Err(eyre!("Scan ended without a result")),
    }
}

/// Merge the optional request file with command-line overrides.
fn build_request(cli: &Cli) -> Result<ScanRequest> {
    let mut request = match &cli.request {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("Invalid request file {}", path.display()))?
        }
        None => ScanRequest::new(Vec::<PathBuf>::new()),
    };

    if !cli.roots.is_empty() {
        request.roots = cli.roots.clone();
    }
    if !cli.extensions.is_empty() {
        request.extensions = cli.extensions.clone();
    }
    if let Some(min_size) = &cli.min_size {
        request.min_size_bytes = parse_size(min_size)?;
    }
    if cli.max_files.is_some() {
        request.max_files = cli.max_files;
    }

    Ok(request)
}

/// Single-line progress display on stderr.
struct ProgressLine {
    enabled: bool,
    dirty: bool,
}

impl ProgressLine {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            dirty: false,
        }
    }

    fn update(&mut self, progress: &ScanProgress) {
        if !self.enabled || progress.stage.is_terminal() {
            return;
        }

        let message = progress.message.as_deref().unwrap_or_default();
        let line = match (progress.current, progress.total) {
            (Some(current), Some(total)) => format!("{message} {current}/{total}"),
            (Some(current), None) => format!("{message} {current}"),
            _ => message.to_string(),
        };

        let mut stderr = std::io::stderr().lock();
        // Ignore write failures; progress is cosmetic.
        let _ = write!(stderr, "\r\x1b[2K[{}] {}", progress.stage, line);
        let _ = stderr.flush();
        self.dirty = true;
    }

    fn finish(&mut self) {
        if self.dirty {
            eprintln!();
            self.dirty = false;
        }
    }
}

fn print_report(result: &ScanResult, format: OutputFormat, top: Option<usize>) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate Asset Report");
            println!("{}", "─".repeat(70));
            println!(
                " Scanned {} files ({}) in {:.2}s",
                result.total_files_scanned,
                format_size(result.total_bytes_scanned),
                result.elapsed.as_secs_f64()
            );
            println!();

            if result.groups.is_empty() {
                println!(" No duplicate files found.");
                return Ok(());
            }

            println!(
                " Found {} duplicate groups ({} files)",
                result.groups.len(),
                result.duplicate_file_count()
            );
            println!(
                " Total wasted space: {}",
                format_size(result.total_wasted_bytes())
            );
            println!();

            let shown = top.unwrap_or(result.groups.len());
            for (i, group) in result.groups.iter().take(shown).enumerate() {
                println!(
                    " Group {} ({} files, {} each, {} wasted)",
                    i + 1,
                    group.count(),
                    format_size(group.size),
                    format_size(group.wasted_bytes())
                );
                for path in &group.files {
                    println!("   {}", path.display());
                }
                println!();
            }

            let hidden = result.groups.len().saturating_sub(shown);
            if hidden > 0 {
                println!(" ... and {} more groups", hidden);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "100", "512B", "4K", "10MB", "1.5GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        other => bail!("Unknown size unit {other:?} in {s:?}"),
    };
    let number: f64 = number
        .parse()
        .wrap_err_with(|| format!("Invalid size {s:?}"))?;

    Ok((number * multiplier as f64) as u64)
}
