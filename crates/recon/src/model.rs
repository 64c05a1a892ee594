use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Local records
// ---------------------------------------------------------------------------

/// One entity from a local source file.
///
/// `extra` captures every field this tool does not interpret (geo locations,
/// descriptions, hours) so a rewrite of the file preserves them untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourtRecord {
    /// Provenance; filled in by the loader, never serialized.
    #[serde(skip)]
    pub source_file: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub secondary_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub fax: String,
    #[serde(default)]
    pub has_po_box: bool,
    #[serde(default)]
    pub address: CourtAddress,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Structured address block of a local record. `line1` lives under the JSON
/// key `address`; `unit` is removed from the JSON entirely when `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourtAddress {
    #[serde(rename = "address", default)]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub county: String,
    /// Free-form display string as originally published.
    #[serde(default)]
    pub orig_address: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Identity of a record within a run. City comparison during apply is
/// case-insensitive, but the key itself carries the city as written.
pub fn verification_key(source_file: &str, name: &str, city: &str) -> String {
    format!("{source_file}::{name}::{city}")
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// One location from the authoritative directory, as cached on disk.
/// Read-only during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryLocation {
    pub title: String,
    pub id: String,
    #[serde(default)]
    pub path_alias: Option<String>,
    #[serde(default)]
    pub addresses: Vec<DirectoryAddress>,
    /// Normalized city names covered by `addresses`, derived at fetch time.
    #[serde(default)]
    pub cities: BTreeSet<String>,
}

impl DirectoryLocation {
    /// Public URL for the location, when a base URL is configured and the
    /// directory supplied a path alias.
    pub fn url(&self, base: Option<&str>) -> String {
        match (base, self.path_alias.as_deref()) {
            (Some(base), Some(alias)) => format!("{}{}", base.trim_end_matches('/'), alias),
            _ => String::new(),
        }
    }

    pub fn primary_address(&self) -> Option<&DirectoryAddress> {
        self.addresses.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAddress {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Outcome of matching one local record against the directory.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub location: Option<DirectoryLocation>,
    pub score: f64,
    pub address_matched: bool,
    pub city_matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Review,
    NoChange,
    UpdateLocalFromDirectory,
    VerifyWeb,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Review => write!(f, "review"),
            Self::NoChange => write!(f, "no_change"),
            Self::UpdateLocalFromDirectory => write!(f, "update_local_from_directory"),
            Self::VerifyWeb => write!(f, "verify_web"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredSource {
    Local,
    Directory,
    NeedsManual,
}

impl std::fmt::Display for PreferredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Directory => write!(f, "directory"),
            Self::NeedsManual => write!(f, "needs_manual"),
        }
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Human-supplied review outcome, keyed by `verification_key`. Consumed
/// read-only by both the reporting and apply passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub verified_address1: String,
    #[serde(default)]
    pub verified_address2: String,
    #[serde(default)]
    pub verified_city: String,
    #[serde(default)]
    pub verified_state: String,
    #[serde(default)]
    pub verified_zip: String,
    #[serde(default)]
    pub verification_source_name: String,
    #[serde(default)]
    pub verification_source_url: String,
    #[serde(default)]
    pub verification_notes: String,
    #[serde(default)]
    pub secondary_address1: String,
    #[serde(default)]
    pub secondary_address2: String,
    #[serde(default)]
    pub secondary_city: String,
    #[serde(default)]
    pub secondary_state: String,
    #[serde(default)]
    pub secondary_zip: String,
    #[serde(default)]
    pub secondary_source_name: String,
    #[serde(default)]
    pub secondary_source_url: String,
    #[serde(default)]
    pub secondary_source_notes: String,
    #[serde(default)]
    pub secondary_source_confidence: String,
    #[serde(default)]
    pub preferred_source: String,
    #[serde(default)]
    pub final_action: String,
}

/// `final_action` value that routes a verification through the apply pass.
pub const FINAL_ACTION_ADOPT_VERIFIED: &str = "update_local_from_verified";

impl Verification {
    /// True when any override field would replace the heuristic outcome.
    pub fn overrides_recommendation(&self) -> bool {
        !self.preferred_source.is_empty()
            || !self.final_action.is_empty()
            || !self.verification_notes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Address parsing
// ---------------------------------------------------------------------------

/// Output of parsing a verified free-form address line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub building: String,
    pub line1: String,
    pub unit: String,
}

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

/// One CSV report row per local record. Field order is column order.
/// Action, preferred source, and notes are post-override values; the raw
/// verification fields follow for audit.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub source_file: String,
    pub court_name: String,
    pub code: String,
    pub secondary_code: String,
    pub phone: String,
    pub fax: String,
    pub has_po_box: bool,
    pub local_address1: String,
    pub local_city: String,
    pub local_state: String,
    pub local_zip: String,
    pub local_county: String,
    pub local_orig_address: String,
    pub directory_name: String,
    pub directory_match_score: String,
    pub directory_address1: String,
    pub directory_address2: String,
    pub directory_city: String,
    pub directory_state: String,
    pub directory_zip: String,
    pub directory_url: String,
    pub address_match: bool,
    pub city_match: bool,
    pub recommended_action: String,
    pub preferred_source: String,
    pub notes: String,
    pub verified_address1: String,
    pub verified_address2: String,
    pub verified_city: String,
    pub verified_state: String,
    pub verified_zip: String,
    pub verification_source_name: String,
    pub verification_source_url: String,
    pub verification_notes: String,
    pub secondary_address1: String,
    pub secondary_address2: String,
    pub secondary_city: String,
    pub secondary_state: String,
    pub secondary_zip: String,
    pub secondary_source_name: String,
    pub secondary_source_url: String,
    pub secondary_source_notes: String,
    pub secondary_source_confidence: String,
    pub final_action: String,
}

// ---------------------------------------------------------------------------
// Input + Output
// ---------------------------------------------------------------------------

/// Pre-loaded inputs for one reconciliation run.
pub struct ReconInput {
    pub records: Vec<CourtRecord>,
    pub locations: Vec<DirectoryLocation>,
    pub verifications: BTreeMap<String, Verification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub record_count: usize,
    pub location_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    /// Post-override action counts, keyed by action string.
    pub action_counts: BTreeMap<String, usize>,
    /// Rows where a verification replaced the heuristic outcome.
    pub overridden: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<ReportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn court_record_round_trips_unknown_fields() {
        let raw = r#"{
            "name": "Worcester District Court",
            "code": "WDC",
            "has_po_box": false,
            "description": "kept verbatim",
            "address": {
                "address": "225 Main St",
                "unit": "Room 12",
                "city": "Worcester",
                "state": "MA",
                "zip": "01608",
                "county": "Worcester",
                "orig_address": "225 Main St, Room 12, Worcester, MA 01608",
                "notes": "side entrance"
            }
        }"#;
        let record: CourtRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.address.line1, "225 Main St");
        assert_eq!(record.address.unit.as_deref(), Some("Room 12"));
        assert_eq!(record.extra["description"], "kept verbatim");
        assert_eq!(record.address.extra["notes"], "side entrance");

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["description"], "kept verbatim");
        assert_eq!(out["address"]["address"], "225 Main St");
        assert_eq!(out["address"]["notes"], "side entrance");
        // source_file never leaks into the file
        assert!(out.get("source_file").is_none());
    }

    #[test]
    fn unit_field_dropped_when_none() {
        let mut record = CourtRecord::default();
        record.address.unit = None;
        let out = serde_json::to_value(&record).unwrap();
        assert!(out["address"].get("unit").is_none());
    }

    #[test]
    fn location_url_requires_base_and_alias() {
        let loc = DirectoryLocation {
            title: "Central Court".into(),
            id: "abc".into(),
            path_alias: Some("/locations/central-court".into()),
            ..Default::default()
        };
        assert_eq!(
            loc.url(Some("https://directory.example.gov")),
            "https://directory.example.gov/locations/central-court"
        );
        assert_eq!(loc.url(None), "");
        let no_alias = DirectoryLocation::default();
        assert_eq!(no_alias.url(Some("https://directory.example.gov")), "");
    }

    #[test]
    fn verification_key_format() {
        assert_eq!(
            verification_key("courts.json", "Central Court", "Boston"),
            "courts.json::Central Court::Boston"
        );
    }
}
