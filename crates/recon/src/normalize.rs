//! Text canonicalization for fuzzy comparison.
//!
//! All three normalizers are total over arbitrary strings and never fail.
//! `normalize_text` is the base layer; names and addresses add a
//! domain-specific token pass on top of it.

/// Generic qualifiers that carry no distinguishing signal in court names.
/// "district" is deliberately absent: it distinguishes real entities.
const NAME_STOPWORDS: &[&str] = &[
    "the",
    "department",
    "division",
    "dept",
    "court",
    "courthouse",
    "municipal",
    "probate",
    "family",
];

/// Street-suffix spellings mapped to their USPS-style abbreviations.
/// Suffix variance dominates address spelling drift, so a token table
/// beats general fuzziness here.
const ADDRESS_ABBREVIATIONS: &[(&str, &str)] = &[
    ("street", "st"),
    ("road", "rd"),
    ("avenue", "ave"),
    ("boulevard", "blvd"),
    ("drive", "dr"),
    ("court", "ct"),
    ("place", "pl"),
    ("square", "sq"),
    ("lane", "ln"),
    ("highway", "hwy"),
    ("route", "rt"),
    ("parkway", "pkwy"),
    ("circle", "cir"),
    ("center", "ctr"),
    ("mount", "mt"),
];

/// Trim, lowercase, turn `.` and `,` into spaces, collapse whitespace runs.
pub fn normalize_text(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c == '.' || c == ',' { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize then strip stop-word tokens, preserving token order.
pub fn normalize_name(value: &str) -> String {
    normalize_text(value)
        .split_whitespace()
        .filter(|t| !NAME_STOPWORDS.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize then abbreviate each street-suffix token; unknown tokens
/// pass through unchanged.
pub fn normalize_address(value: &str) -> String {
    normalize_text(value)
        .split_whitespace()
        .map(|t| {
            ADDRESS_ABBREVIATIONS
                .iter()
                .find(|(long, _)| *long == t)
                .map_or(t, |(_, short)| *short)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_trims_lowercases_and_collapses() {
        assert_eq!(normalize_text("  Boston,  MA. "), "boston ma");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" .,. "), "");
    }

    #[test]
    fn name_strips_stopwords_in_order() {
        assert_eq!(normalize_name("Boston Municipal Court"), "boston");
        assert_eq!(normalize_name("The Probate and Family Court Dept."), "and");
        // "district" is not a stop word
        assert_eq!(normalize_name("Worcester District Court"), "worcester district");
    }

    #[test]
    fn address_abbreviates_suffixes() {
        assert_eq!(normalize_address("123 Main Street"), "123 main st");
        assert_eq!(normalize_address("123 MAIN ST."), "123 main st");
        assert_eq!(normalize_address("1 Pemberton Square"), "1 pemberton sq");
        assert_eq!(normalize_address("Mount Auburn Boulevard"), "mt auburn blvd");
    }

    #[test]
    fn address_leaves_unknown_tokens_alone() {
        assert_eq!(normalize_address("45 Shawmut Way"), "45 shawmut way");
    }

    proptest! {
        #[test]
        fn normalize_text_is_idempotent(s in "\\PC*") {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn normalize_address_is_idempotent(s in "\\PC*") {
            let once = normalize_address(&s);
            prop_assert_eq!(normalize_address(&once), once);
        }
    }
}
