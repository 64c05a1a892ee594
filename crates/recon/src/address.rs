//! Verified-address parsing and the apply-time merge.
//!
//! The parser splits a reviewer's free-form address line on commas and maps
//! the parts onto (building, line1, unit). Its quirks around the existing
//! unit are load-bearing: historical data was matched under them, so they
//! are preserved exactly rather than smoothed over.

use crate::model::{CourtRecord, ParsedAddress, Verification};
use crate::normalize::normalize_text;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a verified free-form address line.
///
/// Zero parts returns a fully blank parse; one part sets `line1` only. In
/// both cases the caller's existing unit is discarded. `existing_unit` only
/// survives into the two-or-more-part branches, where later assignments may
/// still replace it.
pub fn parse_verified_address(address1: &str, existing_unit: &str) -> ParsedAddress {
    let parts: Vec<&str> = address1
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return ParsedAddress::default();
    }

    if parts.len() == 1 {
        return ParsedAddress {
            line1: parts[0].to_string(),
            ..Default::default()
        };
    }

    let mut parsed = ParsedAddress {
        unit: existing_unit.to_string(),
        ..Default::default()
    };

    // Only the first part is checked for a building label; a courthouse
    // name appearing later is treated as ordinary line1/unit data.
    if normalize_text(parts[0]).contains("courthouse") {
        parsed.building = parts[0].to_string();
        parsed.line1 = parts[1].to_string();
        if parts.len() >= 3 {
            parsed.unit = parts[2].to_string();
        }
        return parsed;
    }

    parsed.line1 = parts[0].to_string();
    parsed.unit = parts[1].to_string();

    if parts.len() > 2 {
        parsed.unit = parts[1..].join(", ");
    }

    parsed
}

// ---------------------------------------------------------------------------
// Display string
// ---------------------------------------------------------------------------

/// Rebuild the canonical display string from structured fields. Empty
/// fields drop out of their segment; a lone zip stands in for the locality.
pub fn build_display_address(
    building: &str,
    line1: &str,
    unit: &str,
    line2: &str,
    city: &str,
    state: &str,
    zip: &str,
) -> String {
    let street = [building, line1, unit, line2]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    let mut locality = [city, state]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if !zip.is_empty() {
        locality = if locality.is_empty() {
            zip.to_string()
        } else {
            format!("{locality} {zip}")
        };
    }

    match (street.is_empty(), locality.is_empty()) {
        (false, false) => format!("{street}, {locality}"),
        (false, true) => street,
        (true, _) => locality,
    }
}

// ---------------------------------------------------------------------------
// Apply-time merge
// ---------------------------------------------------------------------------

/// Merge a verification into a record's structured address.
///
/// Fields absent from the verified string keep their prior values, except
/// the unit: when the parse yields no unit, the record's unit is removed
/// rather than left stale. The display string is recomputed last from the
/// now-current fields.
pub fn merge_verified(record: &mut CourtRecord, verification: &Verification) {
    let existing_unit = record.address.unit.clone().unwrap_or_default();
    let parsed = parse_verified_address(&verification.verified_address1, &existing_unit);

    if !parsed.line1.is_empty() {
        record.address.line1 = parsed.line1;
    }
    record.address.unit = if parsed.unit.is_empty() {
        None
    } else {
        Some(parsed.unit)
    };

    if !verification.verified_city.is_empty() {
        record.address.city = verification.verified_city.clone();
    }
    if !verification.verified_state.is_empty() {
        record.address.state = verification.verified_state.clone();
    }
    if !verification.verified_zip.is_empty() {
        record.address.zip = verification.verified_zip.clone();
    }

    record.has_po_box = !verification.verified_address2.is_empty() || record.has_po_box;

    record.address.orig_address = build_display_address(
        &parsed.building,
        &record.address.line1,
        record.address.unit.as_deref().unwrap_or(""),
        &verification.verified_address2,
        &record.address.city,
        &record.address.state,
        &record.address.zip,
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
