use crate::config::ReconConfig;
use crate::model::{CourtRecord, DirectoryLocation, MatchResult};
use crate::normalize::{normalize_address, normalize_name, normalize_text};

// ---------------------------------------------------------------------------
// Candidate filter
// ---------------------------------------------------------------------------

/// Narrow the directory to locations covering the record's city.
///
/// An empty filter result (or an empty city) falls back to the full list:
/// narrowing to zero would make a genuine match unreachable.
pub fn candidates_for<'a>(
    local_city: &str,
    locations: &'a [DirectoryLocation],
) -> Vec<&'a DirectoryLocation> {
    let city = normalize_text(local_city);
    let city_matches: Vec<&DirectoryLocation> = locations
        .iter()
        .filter(|loc| !city.is_empty() && loc.cities.contains(&city))
        .collect();
    if city_matches.is_empty() {
        locations.iter().collect()
    } else {
        city_matches
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score one (record, candidate) pair. Returns (score, address_matched,
/// city_matched).
///
/// Base score is name similarity on normalized names; bonuses stack on top
/// without clamping. The total is a ranking signal, not a probability.
fn score_candidate(
    config: &ReconConfig,
    local: &CourtRecord,
    candidate: &DirectoryLocation,
) -> (f64, bool, bool) {
    let local_name = normalize_name(&local.name);
    let local_line1 = normalize_address(&local.address.line1);
    let local_city = normalize_text(&local.address.city);

    let mut score = strsim::normalized_levenshtein(&local_name, &normalize_name(&candidate.title));

    let mut city_matched = false;
    if !local_city.is_empty() && candidate.cities.contains(&local_city) {
        score += config.city_bonus;
        city_matched = true;
    }

    // First candidate address to satisfy either branch wins; no further search.
    let mut address_matched = false;
    if !local_line1.is_empty() {
        let local_display = normalize_address(&local.address.orig_address);
        for addr in &candidate.addresses {
            let addr_norm = normalize_address(&addr.line1);
            if !addr_norm.is_empty() && addr_norm == local_line1 {
                score += config.address_exact_bonus;
                address_matched = true;
                break;
            }
            if !local_display.is_empty() && !addr_norm.is_empty() && local_display.contains(&addr_norm)
            {
                score += config.address_contains_bonus;
                address_matched = true;
                break;
            }
        }
    }

    (score, address_matched, city_matched)
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick the best-scoring candidate above the confidence floor.
///
/// Candidates are scanned in order and replacement requires a strictly
/// greater score, so the first candidate wins ties. A winner below the floor
/// is reported as no-match with the score and flags reset.
pub fn select_best(
    config: &ReconConfig,
    local: &CourtRecord,
    candidates: &[&DirectoryLocation],
) -> MatchResult {
    let mut best: Option<&DirectoryLocation> = None;
    let mut best_score = 0.0;
    let mut best_address = false;
    let mut best_city = false;

    for candidate in candidates {
        let (score, address_matched, city_matched) = score_candidate(config, local, candidate);
        if score > best_score {
            best = Some(candidate);
            best_score = score;
            best_address = address_matched;
            best_city = city_matched;
        }
    }

    if best_score < config.confidence_floor {
        return MatchResult::default();
    }

    MatchResult {
        location: best.cloned(),
        score: best_score,
        address_matched: best_address,
        city_matched: best_city,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DirectoryAddress;

    fn location(title: &str, city: &str, line1: &str) -> DirectoryLocation {
        DirectoryLocation {
            title: title.into(),
            id: format!("id-{title}"),
            path_alias: None,
            addresses: vec![DirectoryAddress {
                line1: line1.into(),
                city: city.into(),
                state: "MA".into(),
                ..Default::default()
            }],
            cities: [normalize_text(city)].into_iter().collect(),
        }
    }

    fn record(name: &str, city: &str, line1: &str) -> CourtRecord {
        let mut record = CourtRecord::default();
        record.name = name.into();
        record.address.city = city.into();
        record.address.line1 = line1.into();
        record
    }

    #[test]
    fn filter_narrows_by_city() {
        let locations = vec![
            location("Worcester District Court", "Worcester", "225 Main St"),
            location("Boston Municipal Court", "Boston", "24 New Chardon St"),
        ];
        let picked = candidates_for("Worcester", &locations);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].title, "Worcester District Court");
    }

    #[test]
    fn filter_falls_back_to_full_list() {
        let locations = vec![
            location("Worcester District Court", "Worcester", "225 Main St"),
            location("Boston Municipal Court", "Boston", "24 New Chardon St"),
        ];
        assert_eq!(candidates_for("Springfield", &locations).len(), 2);
        assert_eq!(candidates_for("", &locations).len(), 2);
    }

    #[test]
    fn exact_address_beats_contains() {
        let config = ReconConfig::default();
        let local = record("Worcester District Court", "Worcester", "225 Main Street");
        let loc = location("Worcester District Court", "Worcester", "225 Main St");
        let (score, address_matched, city_matched) = score_candidate(&config, &local, &loc);
        // 1.0 name + 0.1 city + 0.2 exact address; no clamping
        assert!((score - 1.3).abs() < 1e-9);
        assert!(address_matched);
        assert!(city_matched);
    }

    #[test]
    fn contains_bonus_uses_display_string() {
        let config = ReconConfig::default();
        let mut local = record("Worcester District Court", "Worcester", "225 Main St Fl 2");
        local.address.orig_address = "225 Main St, Worcester, MA 01608".into();
        let loc = location("Worcester District Court", "Worcester", "225 Main Street");
        let (score, address_matched, _) = score_candidate(&config, &local, &loc);
        assert!(address_matched);
        assert!((score - 1.25).abs() < 1e-9);
    }

    #[test]
    fn no_address_bonus_when_local_line1_empty() {
        let config = ReconConfig::default();
        let mut local = record("Worcester District Court", "Worcester", "");
        local.address.orig_address = "225 Main St, Worcester, MA 01608".into();
        let loc = location("Worcester District Court", "Worcester", "225 Main St");
        let (_, address_matched, _) = score_candidate(&config, &local, &loc);
        assert!(!address_matched);
    }

    #[test]
    fn first_candidate_wins_ties() {
        let config = ReconConfig::default();
        let local = record("Central Court", "Riverton", "");
        let locations = vec![
            location("Central Court", "Riverton", "1 First St"),
            location("Central Court", "Riverton", "2 Second St"),
        ];
        let candidates: Vec<&DirectoryLocation> = locations.iter().collect();
        let result = select_best(&config, &local, &candidates);
        assert_eq!(result.location.unwrap().id, "id-Central Court");
        assert!(result.city_matched);
    }

    #[test]
    fn higher_name_similarity_wins_selection() {
        let config = ReconConfig::default();
        let local = record("Worcester District Court", "Worcester", "");
        let close = location("Worcester District Court", "Worcester", "225 Main St");
        let far = location("Worcester Juvenile Court", "Worcester", "225 Main St");

        let (close_score, _, _) = score_candidate(&config, &local, &close);
        let (far_score, _, _) = score_candidate(&config, &local, &far);
        assert!(close_score > far_score);

        // The more similar title is selected regardless of scan order,
        // and the winner's score is the higher one.
        let result = select_best(&config, &local, &[&far, &close]);
        assert_eq!(result.location.unwrap().id, "id-Worcester District Court");
        assert!((result.score - close_score).abs() < 1e-9);
    }

    #[test]
    fn floor_resets_score_and_flags() {
        let config = ReconConfig::default();
        // Dissimilar name, but the city bonus alone pushes the raw score
        // above zero. Still below 0.6, so everything resets.
        let local = record("Housing Review Board", "Riverton", "");
        let locations = vec![location("Western Circuit", "Riverton", "9 Elm St")];
        let candidates: Vec<&DirectoryLocation> = locations.iter().collect();
        let result = select_best(&config, &local, &candidates);
        assert!(result.location.is_none());
        assert_eq!(result.score, 0.0);
        assert!(!result.address_matched);
        assert!(!result.city_matched);
    }

    #[test]
    fn suffix_variance_still_matches_high() {
        let config = ReconConfig::default();
        let local = record("Worcester District Court", "Worcester", "225 Main Street");
        let locations = vec![location("Worcester District Court", "Worcester", "225 Main St")];
        let candidates: Vec<&DirectoryLocation> = locations.iter().collect();
        let result = select_best(&config, &local, &candidates);
        assert!(result.score >= config.high_confidence);
        assert!(result.address_matched);
    }
}
