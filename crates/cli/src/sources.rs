//! Local dataset IO: source files, verification table, engine config,
//! directory cache.
//!
//! Source files are rewritten pretty-printed with a trailing newline, and
//! unknown fields survive the round trip, so an apply run produces minimal
//! diffs.

use std::collections::BTreeMap;
use std::path::Path;

use courtsync_recon::model::{CourtRecord, DirectoryLocation, Verification};
use courtsync_recon::ReconConfig;

use crate::CliError;

/// Verification table file name inside a sources directory. Skipped when
/// loading source files.
pub const VERIFICATIONS_FILE: &str = "court_address_manual_verifications.json";

/// Load every `*.json` source file in the directory, sorted by name.
/// Dotfiles (caches) and the verification table are not source files.
pub fn load_source_files(dir: &Path) -> Result<BTreeMap<String, Vec<CourtRecord>>, CliError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", dir.display(), e)))?;

    let mut files = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| CliError::io(e.to_string()))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file()
            || name.starts_with('.')
            || name == VERIFICATIONS_FILE
            || !name.ends_with(".json")
        {
            continue;
        }
        files.insert(name.to_string(), load_source_file(&path, name)?);
    }

    Ok(files)
}

fn load_source_file(path: &Path, name: &str) -> Result<Vec<CourtRecord>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
    let mut records: Vec<CourtRecord> = serde_json::from_str(&text)
        .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))?;
    for record in &mut records {
        record.source_file = name.to_string();
    }
    Ok(records)
}

/// Write a source file back, pretty-printed with a trailing newline.
pub fn write_source_file(path: &Path, records: &[CourtRecord]) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| CliError::io(format!("cannot serialize {}: {}", path.display(), e)))?;
    std::fs::write(path, json + "\n")
        .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))
}

/// Load the verification table. A missing file is an empty table.
pub fn load_verifications(path: &Path) -> Result<BTreeMap<String, Verification>, CliError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))
}

/// Load the directory cache written by `courtsync fetch`.
pub fn load_cache(path: &Path) -> Result<Vec<DirectoryLocation>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::io(format!("cannot read cache {}: {}", path.display(), e))
            .with_hint("run `courtsync fetch` first to populate the directory cache")
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))
}

/// Load the engine config, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
    ReconConfig::from_toml(&text).map_err(CliError::recon)
}
