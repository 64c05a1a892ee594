use crate::config::ReconConfig;
use crate::model::{Action, MatchResult, PreferredSource, Verification};

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Heuristic outcome for one record, before any human override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub action: Action,
    pub preferred_source: PreferredSource,
    pub note: &'static str,
}

/// Pure decision table over the match result.
///
/// Local data is trusted once the address is independently confirmed; the
/// directory address is adopted only on a high-confidence name/city match
/// that actually carries an address.
pub fn recommend(config: &ReconConfig, result: &MatchResult) -> Recommendation {
    let Some(ref location) = result.location else {
        return Recommendation {
            action: Action::Review,
            preferred_source: PreferredSource::NeedsManual,
            note: "No directory location match",
        };
    };

    if result.address_matched {
        return Recommendation {
            action: Action::NoChange,
            preferred_source: PreferredSource::Local,
            note: "Address matches directory",
        };
    }

    if result.score >= config.high_confidence && result.city_matched && !location.addresses.is_empty()
    {
        return Recommendation {
            action: Action::UpdateLocalFromDirectory,
            preferred_source: PreferredSource::Directory,
            note: "High-confidence name/city match",
        };
    }

    Recommendation {
        action: Action::VerifyWeb,
        preferred_source: PreferredSource::NeedsManual,
        note: "Name match without address confirmation",
    }
}

/// Final (action, preferred source, note) strings after the optional human
/// override. Each non-empty verification field replaces the heuristic value
/// unconditionally.
pub fn apply_override(
    recommendation: &Recommendation,
    verification: Option<&Verification>,
) -> (String, String, String) {
    let mut action = recommendation.action.to_string();
    let mut preferred = recommendation.preferred_source.to_string();
    let mut note = recommendation.note.to_string();

    if let Some(v) = verification {
        if !v.final_action.is_empty() {
            action = v.final_action.clone();
        }
        if !v.preferred_source.is_empty() {
            preferred = v.preferred_source.clone();
        }
        if !v.verification_notes.is_empty() {
            note = v.verification_notes.clone();
        }
    }

    (action, preferred, note)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
