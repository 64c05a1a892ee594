// courtsync - reconcile local court records against the authoritative directory

mod exit_codes;
mod fetch;
mod report;
mod sources;
mod zipgen;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use courtsync_recon::engine;
use courtsync_recon::model::ReconInput;
use courtsync_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "courtsync")]
#[command(about = "Reconcile local court records against the authoritative directory")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare local records to the cached directory and write a CSV report
    #[command(after_help = "\
Examples:
  courtsync fetch --endpoint https://example.gov/jsonapi/node/location -o data/.cache_locations.json
  courtsync validate data/sources --cache data/.cache_locations.json
  courtsync validate data/sources --cache cache.json --config recon.toml -o report.csv")]
    Validate {
        /// Directory holding the local *.json source files
        sources_dir: PathBuf,

        /// Directory cache written by `courtsync fetch`
        #[arg(long)]
        cache: PathBuf,

        /// Engine config TOML (thresholds, bonuses, directory base URL)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report output path (default: <sources-dir>/court_address_validation.csv)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Apply adopt-verified corrections back into the local source files
    #[command(after_help = "\
Examples:
  courtsync apply data/sources
  courtsync apply data/sources --dry-run")]
    Apply {
        /// Directory holding the local *.json source files
        sources_dir: PathBuf,

        /// Verification table (default: <sources-dir>/court_address_manual_verifications.json)
        #[arg(long)]
        verifications: Option<PathBuf>,

        /// Report what would change without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch directory locations from the JSON:API endpoint into a cache file
    #[command(after_help = "\
Examples:
  courtsync fetch --endpoint https://example.gov/jsonapi/node/location -o cache.json
  courtsync fetch --endpoint https://example.gov/jsonapi/node/location --filter Court -o cache.json")]
    Fetch {
        /// JSON:API location collection endpoint
        #[arg(long, env = "COURTSYNC_ENDPOINT")]
        endpoint: String,

        /// Title substring filter applied server-side
        #[arg(long, default_value = "Court")]
        filter: String,

        /// Cache output path
        #[arg(long, short = 'o')]
        out: PathBuf,

        /// Page size for offset paging
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    /// Reformat a geocoding CSV into a zip-code lookup table
    #[command(after_help = "\
Examples:
  courtsync zip-table geonames_us.csv --state MA -o ma_zip_codes.json")]
    ZipTable {
        /// Geocoding CSV (postal_code, place_name, state_code, county_name,
        /// latitude, longitude)
        input: PathBuf,

        /// Keep only rows for this state code
        #[arg(long)]
        state: String,

        /// Output JSON path
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { sources_dir, cache, config, out } => {
            cmd_validate(sources_dir, cache, config, out)
        }
        Commands::Apply { sources_dir, verifications, dry_run } => {
            cmd_apply(sources_dir, verifications, dry_run)
        }
        Commands::Fetch { endpoint, filter, out, page_size } => {
            fetch::cmd_fetch(&endpoint, &filter, &out, page_size)
        }
        Commands::ZipTable { input, state, out } => zipgen::cmd_zip_table(&input, &state, &out),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with its registered exit code.
    pub fn recon(err: ReconError) -> Self {
        Self { code: recon_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(
    sources_dir: PathBuf,
    cache: PathBuf,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = sources::load_config(config.as_deref())?;
    let locations = sources::load_cache(&cache)?;

    let files = sources::load_source_files(&sources_dir)?;
    let records: Vec<_> = files.into_values().flatten().collect();
    let verifications =
        sources::load_verifications(&sources_dir.join(sources::VERIFICATIONS_FILE))?;

    eprintln!(
        "validating {} records against {} directory locations",
        records.len(),
        locations.len(),
    );

    let input = ReconInput { records, locations, verifications };
    let result = engine::run(&config, &input);

    let out = out.unwrap_or_else(|| sources_dir.join("court_address_validation.csv"));
    report::write_report(&out, &result)?;

    for (action, count) in &result.summary.action_counts {
        eprintln!("  {action}: {count}");
    }
    if result.summary.overridden > 0 {
        eprintln!("  ({} overridden by verifications)", result.summary.overridden);
    }
    println!("wrote {}", out.display());

    Ok(())
}

// ============================================================================
// apply
// ============================================================================

fn cmd_apply(
    sources_dir: PathBuf,
    verifications: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), CliError> {
    let verifications_path =
        verifications.unwrap_or_else(|| sources_dir.join(sources::VERIFICATIONS_FILE));
    let verifications = sources::load_verifications(&verifications_path)?;
    if verifications.is_empty() {
        return Err(CliError::args(format!(
            "no verifications found in {}",
            verifications_path.display(),
        )));
    }

    let mut files = sources::load_source_files(&sources_dir)?;

    // All-or-nothing: nothing is written unless every verification applied.
    let summary =
        engine::apply_verifications(&mut files, &verifications).map_err(CliError::recon)?;

    if dry_run {
        println!(
            "dry run: would update {} record(s) across {} file(s)",
            summary.records_updated,
            summary.files_touched.len(),
        );
        for file in &summary.files_touched {
            println!("  {file}");
        }
        return Ok(());
    }

    for file in &summary.files_touched {
        sources::write_source_file(&sources_dir.join(file), &files[file])?;
        eprintln!("updated {file}");
    }
    println!(
        "applied {} update(s) across {} file(s)",
        summary.records_updated,
        summary.files_touched.len(),
    );

    Ok(())
}
