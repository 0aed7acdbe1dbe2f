//! Canonicalization of free-text organization names for comparison.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").unwrap());

/// Canonicalize a name for comparison: fold to ASCII, lower-case, drop
/// parenthetical segments, drop everything that is not a word character.
/// Both sides of every similarity comparison must pass through here.
pub fn normalize(text: &str) -> String {
    let folded = deunicode(text).to_lowercase();
    let stripped = PARENTHETICAL.replace_all(&folded, "");
    NON_WORD.replace_all(&stripped, "").into_owned()
}

/// Normalized edit-distance similarity between two strings, scaled to 0-100.
pub fn similarity_ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_parentheticals_and_whitespace() {
        assert_eq!(normalize("Example University (EU)"), "exampleuniversity");
    }

    #[test]
    fn test_folds_accents() {
        assert_eq!(normalize("Université d'Exemple"), "universitedexemple");
        assert_eq!(normalize("Technische Universität München"), "technischeuniversitatmunchen");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize("St. Mary's College, Ltd."), "stmaryscollegeltd");
    }

    #[test]
    fn test_multiple_parenthetical_segments() {
        assert_eq!(normalize("Alpha (a) Beta (b)"), "alphabeta");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "Example University (EU)",
            "Université d'Exemple",
            "  spaced   out  ",
            "",
            "already-normal",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_identical_names_score_100() {
        let a = normalize("Example University (EU)");
        let b = normalize("Example University");
        assert_eq!(a, b);
        assert_eq!(similarity_ratio(&a, &b), 100);
    }

    #[test]
    fn test_drifted_names_score_below_100() {
        let a = normalize("Example University");
        let b = normalize("Exemplar University");
        let ratio = similarity_ratio(&a, &b);
        assert!(ratio < 100);
        assert!(ratio > 50, "minor drift should still score high, got {}", ratio);
    }

    #[test]
    fn test_distinct_names_score_low() {
        let ratio = similarity_ratio(&normalize("Example University"), &normalize("Oceanic Research Institute"));
        assert!(ratio < 90, "distinct institutions must not clear the threshold, got {}", ratio);
    }
}
