// 🔤 Name Similarity - pluggable scoring for "similar name" duplicate rules
// Scores are in [0.0, 1.0]; the detector compares them against a configured threshold.

use serde::{Deserialize, Serialize};

/// Honorifics and credentials ignored when comparing provider names
pub const DEFAULT_HONORIFICS: &[&str] = &["dr", "mr", "mrs", "ms", "prof", "md"];

/// Lowercase, drop punctuation, drop honorifics, collapse whitespace.
/// "Dr. Jane  Smith, MD" -> "jane smith"
pub fn normalize_person_name<S: AsRef<str>>(name: &str, honorifics: &[S]) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .filter(|token| !honorifics.iter().any(|h| h.as_ref().eq_ignore_ascii_case(token)))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// SIMILARITY TRAIT
// ============================================================================

/// Compares two already-normalized names
pub trait NameSimilarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &'static str;
}

/// 1.0 on identical normalized names, otherwise 0.0
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactNormalized;

impl NameSimilarity for ExactNormalized {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl NameSimilarity for JaroWinkler {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// 1 - (edit distance / longer length)
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl NameSimilarity for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }

    fn name(&self) -> &'static str {
        "normalized_levenshtein"
    }
}

/// 1.0 when the names share a token longer than `min_token_len` characters.
/// Loose on purpose: "jane smith" and "jane johnson" match.
#[derive(Debug, Clone, Copy)]
pub struct SharedSignificantToken {
    pub min_token_len: usize,
}

impl Default for SharedSignificantToken {
    fn default() -> Self {
        SharedSignificantToken { min_token_len: 3 }
    }
}

impl NameSimilarity for SharedSignificantToken {
    fn score(&self, a: &str, b: &str) -> f64 {
        let significant = |s: &str| -> Vec<String> {
            s.split_whitespace()
                .filter(|t| t.chars().count() > self.min_token_len)
                .map(str::to_string)
                .collect()
        };
        let a_tokens = significant(a);
        let b_tokens = significant(b);

        if a_tokens.iter().any(|t| b_tokens.contains(t)) {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "shared_token"
    }
}

// ============================================================================
// POLICY SELECTION (config-facing)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityPolicy {
    Exact,
    #[default]
    JaroWinkler,
    NormalizedLevenshtein,
    SharedToken,
}

impl SimilarityPolicy {
    pub fn build(self) -> Box<dyn NameSimilarity> {
        match self {
            SimilarityPolicy::Exact => Box::new(ExactNormalized),
            SimilarityPolicy::JaroWinkler => Box::new(JaroWinkler),
            SimilarityPolicy::NormalizedLevenshtein => Box::new(NormalizedLevenshtein),
            SimilarityPolicy::SharedToken => Box::new(SharedSignificantToken::default()),
        }
    }
}
