use std::collections::{BTreeMap, BTreeSet};

use crate::address::merge_verified;
use crate::classify::{apply_override, recommend};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::{candidates_for, select_best};
use crate::model::{
    verification_key, CourtRecord, ReconInput, ReconMeta, ReconResult, ReconSummary, ReportRow,
    Verification, FINAL_ACTION_ADOPT_VERIFIED,
};

// ---------------------------------------------------------------------------
// Reconciliation pass
// ---------------------------------------------------------------------------

/// Run one reconciliation pass. One row per record; record decisions are
/// independent, so the output is deterministic in input order.
pub fn run(config: &ReconConfig, input: &ReconInput) -> ReconResult {
    let mut rows = Vec::with_capacity(input.records.len());
    let mut summary = ReconSummary::default();

    for record in &input.records {
        let candidates = candidates_for(&record.address.city, &input.locations);
        let result = select_best(config, record, &candidates);
        let recommendation = recommend(config, &result);

        let key = verification_key(&record.source_file, &record.name, &record.address.city);
        let verification = input.verifications.get(&key);
        let (action, preferred_source, notes) = apply_override(&recommendation, verification);

        if verification.is_some_and(Verification::overrides_recommendation) {
            summary.overridden += 1;
        }
        *summary.action_counts.entry(action.clone()).or_insert(0) += 1;

        let primary = result
            .location
            .as_ref()
            .and_then(|loc| loc.primary_address())
            .cloned()
            .unwrap_or_default();
        let v = verification.cloned().unwrap_or_default();

        rows.push(ReportRow {
            source_file: record.source_file.clone(),
            court_name: record.name.clone(),
            code: record.code.clone(),
            secondary_code: record.secondary_code.clone(),
            phone: record.phone.clone(),
            fax: record.fax.clone(),
            has_po_box: record.has_po_box,
            local_address1: record.address.line1.clone(),
            local_city: record.address.city.clone(),
            local_state: record.address.state.clone(),
            local_zip: record.address.zip.clone(),
            local_county: record.address.county.clone(),
            local_orig_address: record.address.orig_address.clone(),
            directory_name: result
                .location
                .as_ref()
                .map(|loc| loc.title.clone())
                .unwrap_or_default(),
            directory_match_score: result
                .location
                .as_ref()
                .map(|_| format!("{:.2}", result.score))
                .unwrap_or_default(),
            directory_address1: primary.line1,
            directory_address2: primary.line2,
            directory_city: primary.city,
            directory_state: primary.state,
            directory_zip: primary.postal_code,
            directory_url: result
                .location
                .as_ref()
                .map(|loc| loc.url(config.directory_base_url.as_deref()))
                .unwrap_or_default(),
            address_match: result.address_matched,
            city_match: result.city_matched,
            recommended_action: action,
            preferred_source,
            notes,
            verified_address1: v.verified_address1,
            verified_address2: v.verified_address2,
            verified_city: v.verified_city,
            verified_state: v.verified_state,
            verified_zip: v.verified_zip,
            verification_source_name: v.verification_source_name,
            verification_source_url: v.verification_source_url,
            verification_notes: v.verification_notes,
            secondary_address1: v.secondary_address1,
            secondary_address2: v.secondary_address2,
            secondary_city: v.secondary_city,
            secondary_state: v.secondary_state,
            secondary_zip: v.secondary_zip,
            secondary_source_name: v.secondary_source_name,
            secondary_source_url: v.secondary_source_url,
            secondary_source_notes: v.secondary_source_notes,
            secondary_source_confidence: v.secondary_source_confidence,
            final_action: v.final_action,
        });
    }

    summary.total = rows.len();

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            record_count: input.records.len(),
            location_count: input.locations.len(),
        },
        summary,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Apply pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ApplySummary {
    pub records_updated: usize,
    pub files_touched: BTreeSet<String>,
}

/// Apply every adopt-verified verification to the in-memory source files.
///
/// Zero or multiple records matching a key is fatal: partial application
/// would corrupt the audit trail, so the caller must only persist the map
/// after an `Ok`.
pub fn apply_verifications(
    files: &mut BTreeMap<String, Vec<CourtRecord>>,
    verifications: &BTreeMap<String, Verification>,
) -> Result<ApplySummary, ReconError> {
    let mut summary = ApplySummary::default();

    for (key, verification) in verifications {
        if verification.final_action != FINAL_ACTION_ADOPT_VERIFIED {
            continue;
        }

        let mut parts = key.splitn(3, "::");
        let (Some(source_file), Some(name), Some(city)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ReconError::MalformedKey(key.clone()));
        };

        let records = files
            .get_mut(source_file)
            .ok_or_else(|| ReconError::UnknownSourceFile {
                key: key.clone(),
                file: source_file.to_string(),
            })?;

        let matches: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.name == name && r.address.city.eq_ignore_ascii_case(city))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => return Err(ReconError::RecordNotFound { key: key.clone() }),
            [index] => merge_verified(&mut records[*index], verification),
            _ => {
                return Err(ReconError::AmbiguousRecord {
                    key: key.clone(),
                    count: matches.len(),
                })
            }
        }

        summary.records_updated += 1;
        summary.files_touched.insert(source_file.to_string());
    }

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
