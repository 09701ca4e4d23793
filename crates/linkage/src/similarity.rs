//! Fuzzy string similarity.

use serde::{Deserialize, Serialize};

/// Reference cutoff for [`is_similar`].
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// A similarity metric in `[0, 1]` where `1.0` means identical.
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    fn is_similar(&self, a: &str, b: &str, threshold: f64) -> bool {
        self.similarity(a, b) > threshold
    }
}

/// `1 - indel / (|a| + |b|)`, where `indel` is the insertion/deletion edit
/// distance. Counted in characters. Two empty strings score `1.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelRatio;

impl SimilarityScorer for IndelRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        // indel = total - 2 * lcs
        2.0 * lcs_len(&a, &b) as f64 / total as f64
    }
}

/// `1 - levenshtein / max(|a|, |b|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl SimilarityScorer for NormalizedLevenshtein {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl SimilarityScorer for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }
}

/// Config-selectable scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    Indel,
    Levenshtein,
    JaroWinkler,
}

impl ScorerKind {
    pub fn scorer(self) -> Box<dyn SimilarityScorer> {
        match self {
            Self::Indel => Box::new(IndelRatio),
            Self::Levenshtein => Box::new(NormalizedLevenshtein),
            Self::JaroWinkler => Box::new(JaroWinkler),
        }
    }
}

/// Similarity of `a` and `b` under [`IndelRatio`]. Symmetric, `sim(a, a) == 1.0`.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    IndelRatio.similarity(a, b)
}

/// `string_similarity(a, b) > threshold`.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    IndelRatio.is_similar(a, b, threshold)
}

/// Length of the longest common subsequence, single rolling row.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diag = 0;
        for (j, y) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y { diag + 1 } else { above.max(row[j]) };
            diag = above;
        }
    }
    row[b.len()]
}
