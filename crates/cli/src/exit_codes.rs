//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | Reserved (general error, never emitted)  |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-4     | Universal        | Parse / IO errors                        |
//! | 10-19   | apply            | Verified-update apply codes              |
//! | 50-59   | fetch            | Directory fetch codes                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use courtsync_recon::ReconError;

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

// 1 is reserved for unspecified failures; every current error path has a
// specific code, so no constant is defined for it.

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Parse error reading input files (JSON, TOML, CSV).
pub const EXIT_PARSE: u8 = 3;

/// IO error (cannot read or write a file).
pub const EXIT_IO: u8 = 4;

// =============================================================================
// Apply (10-19)
// =============================================================================

/// A verification key matched no record in its source file.
pub const EXIT_APPLY_NOT_FOUND: u8 = 10;

/// A verification key matched more than one record.
pub const EXIT_APPLY_AMBIGUOUS: u8 = 11;

/// A verification key is not of the form `file::name::city`, or names a
/// source file that was not loaded.
pub const EXIT_APPLY_BAD_KEY: u8 = 12;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Upstream error (5xx) or network failure after retries, or a 4xx reject.
pub const EXIT_FETCH_UPSTREAM: u8 = 50;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 51;

// =============================================================================
// Engine error mapping
// =============================================================================

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_PARSE,
        ReconError::MalformedKey(_) | ReconError::UnknownSourceFile { .. } => EXIT_APPLY_BAD_KEY,
        ReconError::RecordNotFound { .. } => EXIT_APPLY_NOT_FOUND,
        ReconError::AmbiguousRecord { .. } => EXIT_APPLY_AMBIGUOUS,
    }
}
