//! `courtsync-recon` — Court directory reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns classified results.
//! No CLI or IO dependencies.

pub mod address;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use config::ReconConfig;
pub use engine::{apply_verifications, run};
pub use error::ReconError;
pub use model::{CourtRecord, DirectoryLocation, ReconInput, ReconResult, Verification};
