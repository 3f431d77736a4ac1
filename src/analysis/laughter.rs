// Laughter - collapse classifier categories into one laughter probability

use crate::analysis::classifier::Category;

/// Substring lexicon identifying laughter-like categories
#[derive(Debug, Clone)]
pub struct LaughterLexicon {
    terms: Vec<String>,
}

impl LaughterLexicon {
    /// Build a lexicon from terms; matching is case-insensitive
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Whether a category name contains any lexicon term
    pub fn matches(&self, category_name: &str) -> bool {
        let name = category_name.to_lowercase();
        self.terms.iter().any(|term| name.contains(term.as_str()))
    }

    /// Tick laughter probability
    ///
    /// Sum of the scores of every matching category across all frames,
    /// clamped to [0, 1]. Non-finite scores are ignored.
    pub fn probability(&self, categories: &[Category]) -> f32 {
        let total: f32 = categories
            .iter()
            .filter(|c| c.score.is_finite() && self.matches(&c.name))
            .map(|c| c.score)
            .sum();
        total.clamp(0.0, 1.0)
    }
}

impl Default for LaughterLexicon {
    fn default() -> Self {
        Self::new(["laugh", "giggle", "chuckle", "chortle", "snicker"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_case_insensitive_substrings() {
        let lexicon = LaughterLexicon::default();
        assert!(lexicon.matches("Laughter"));
        assert!(lexicon.matches("Baby laughter"));
        assert!(lexicon.matches("Belly laugh"));
        assert!(lexicon.matches("Giggle"));
        assert!(lexicon.matches("Chuckle, chortle"));
        assert!(lexicon.matches("snicker"));
        assert!(!lexicon.matches("Speech"));
        assert!(!lexicon.matches("Music"));
    }

    #[test]
    fn test_probability_sums_matching_scores() {
        let lexicon = LaughterLexicon::default();
        let categories = vec![
            Category::new("Laughter", 0.3),
            Category::new("Speech", 0.5),
            Category::new("Giggle", 0.2),
        ];
        assert!((lexicon.probability(&categories) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_probability_is_clamped() {
        let lexicon = LaughterLexicon::default();
        let categories = vec![
            Category::new("Laughter", 0.8),
            Category::new("Belly laugh", 0.7),
            Category::new("Chuckle, chortle", 0.4),
        ];
        assert_eq!(lexicon.probability(&categories), 1.0);
    }

    #[test]
    fn test_probability_of_empty_or_unmatched_is_zero() {
        let lexicon = LaughterLexicon::default();
        assert_eq!(lexicon.probability(&[]), 0.0);
        assert_eq!(
            lexicon.probability(&[Category::new("Silence", 0.9)]),
            0.0
        );
    }

    #[test]
    fn test_probability_ignores_non_finite_scores() {
        let lexicon = LaughterLexicon::default();
        let categories = vec![
            Category::new("Laughter", f32::NAN),
            Category::new("Giggle", 0.25),
        ];
        assert!((lexicon.probability(&categories) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_custom_terms_are_normalized() {
        let lexicon = LaughterLexicon::new([" HaHa ", ""]);
        assert!(lexicon.matches("hahaha"));
        assert!(!lexicon.matches("Laughter"));
    }
}
