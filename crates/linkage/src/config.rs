use serde::Deserialize;

use crate::bloom::BloomFilter;
use crate::date::DateOrder;
use crate::error::LinkageError;
use crate::similarity::{ScorerKind, DEFAULT_THRESHOLD};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LinkageConfig {
    pub name: String,
    pub datasets: Datasets,
    #[serde(default)]
    pub bloom: BloomConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

/// The two collections being linked. Matches are reported in `a` order.
#[derive(Debug, Clone, Deserialize)]
pub struct Datasets {
    pub a: DatasetConfig,
    pub b: DatasetConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub file: String,
    #[serde(default)]
    pub columns: ColumnMapping,
}

/// CSV header names bound to the three record fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_name_column")]
    pub name: String,
    #[serde(default = "default_dob_column")]
    pub date_of_birth: String,
    #[serde(default = "default_address_column")]
    pub address: String,
}

fn default_name_column() -> String {
    "Name".into()
}

fn default_dob_column() -> String {
    "DOB".into()
}

fn default_address_column() -> String {
    "Address".into()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: default_name_column(),
            date_of_birth: default_dob_column(),
            address: default_address_column(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bloom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BloomConfig {
    #[serde(default = "default_bloom_size")]
    pub size: usize,
    #[serde(default = "default_hash_count")]
    pub hash_count: u32,
}

fn default_bloom_size() -> usize {
    BloomFilter::DEFAULT_SIZE
}

fn default_hash_count() -> u32 {
    BloomFilter::DEFAULT_HASH_COUNT
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            size: default_bloom_size(),
            hash_count: default_hash_count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching policy
// ---------------------------------------------------------------------------

/// How the name field takes part in the accept decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// Names are not compared; only date of birth and address gate a match.
    #[default]
    Ignore,
    /// Phonetic codes must be equal.
    Phonetic,
    /// Normalized names must pass the similarity threshold.
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Scan every record of B for every record of A.
    #[default]
    Exhaustive,
    /// Skip the scan when B's Bloom filter rules out the exact-match tokens.
    BloomPrefilter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub scorer: ScorerKind,
    #[serde(default)]
    pub date_order: DateOrder,
    #[serde(default)]
    pub name_policy: NamePolicy,
    #[serde(default)]
    pub strategy: MatchStrategy,
    /// A record of B may be matched by at most one record of A.
    #[serde(default)]
    pub exclusive_b: bool,
    /// Records whose date of birth did not parse never pass the date gate.
    #[serde(default)]
    pub skip_unparsed_dates: bool,
    #[serde(default)]
    pub parallel: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            scorer: ScorerKind::default(),
            date_order: DateOrder::default(),
            name_policy: NamePolicy::default(),
            strategy: MatchStrategy::default(),
            exclusive_b: false,
            skip_unparsed_dates: false,
            parallel: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LinkageConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkageError> {
        let config: LinkageConfig =
            toml::from_str(input).map_err(|e| LinkageError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkageError> {
        let threshold = self.matching.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LinkageError::ConfigValidation(format!(
                "matching.threshold must be between 0 and 1, got {threshold}"
            )));
        }

        if self.bloom.size == 0 || self.bloom.hash_count == 0 {
            return Err(LinkageError::InvalidBloomParams {
                size: self.bloom.size,
                hash_count: self.bloom.hash_count,
            });
        }

        for (label, dataset) in [("a", &self.datasets.a), ("b", &self.datasets.b)] {
            if dataset.file.trim().is_empty() {
                return Err(LinkageError::ConfigValidation(format!(
                    "datasets.{label}.file must not be empty"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "Clinic vs Registry"

[datasets.a]
file = "clinic.csv"

[datasets.b]
file = "registry.csv"
"#;

    #[test]
    fn parse_minimal_uses_reference_defaults() {
        let config = LinkageConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "Clinic vs Registry");
        assert_eq!(config.datasets.a.file, "clinic.csv");
        assert_eq!(config.datasets.a.columns.name, "Name");
        assert_eq!(config.datasets.b.columns.date_of_birth, "DOB");
        assert_eq!(config.datasets.b.columns.address, "Address");
        assert_eq!(config.bloom, BloomConfig { size: 10_000, hash_count: 10 });
        assert_eq!(config.matching.threshold, 0.8);
        assert_eq!(config.matching.scorer, ScorerKind::Indel);
        assert_eq!(config.matching.date_order, DateOrder::DayFirst);
        assert_eq!(config.matching.name_policy, NamePolicy::Ignore);
        assert_eq!(config.matching.strategy, MatchStrategy::Exhaustive);
        assert!(!config.matching.exclusive_b);
        assert!(!config.matching.parallel);
        assert!(config.output.json.is_none());
    }

    #[test]
    fn parse_full() {
        let input = r#"
name = "Full"

[datasets.a]
file = "left.csv"
[datasets.a.columns]
name = "full_name"
date_of_birth = "birth_date"
address = "street"

[datasets.b]
file = "right.csv"

[bloom]
size = 4096
hash_count = 4

[matching]
threshold = 0.9
scorer = "jaro_winkler"
date_order = "month_first"
name_policy = "phonetic"
strategy = "bloom_prefilter"
exclusive_b = true
skip_unparsed_dates = true
parallel = true

[output]
json = "matches.json"
"#;
        let config = LinkageConfig::from_toml(input).unwrap();
        let cols = &config.datasets.a.columns;
        assert_eq!(cols.name, "full_name");
        assert_eq!(cols.date_of_birth, "birth_date");
        assert_eq!(cols.address, "street");
        assert_eq!(config.bloom.size, 4096);
        assert_eq!(config.bloom.hash_count, 4);

        let m = &config.matching;
        assert_eq!(m.threshold, 0.9);
        assert_eq!(m.scorer, ScorerKind::JaroWinkler);
        assert_eq!(m.date_order, DateOrder::MonthFirst);
        assert_eq!(m.name_policy, NamePolicy::Phonetic);
        assert_eq!(m.strategy, MatchStrategy::BloomPrefilter);
        assert!(m.exclusive_b);
        assert!(m.skip_unparsed_dates);
        assert!(m.parallel);
        assert_eq!(config.output.json.as_deref(), Some("matches.json"));
    }

    #[test]
    fn reject_threshold_out_of_range() {
        let input = format!("{MINIMAL}\n[matching]\nthreshold = 1.5\n");
        let err = LinkageConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn reject_zero_bloom_size() {
        let input = format!("{MINIMAL}\n[bloom]\nsize = 0\n");
        let err = LinkageConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, LinkageError::InvalidBloomParams { size: 0, hash_count: 10 }));
    }

    #[test]
    fn reject_zero_hash_count() {
        let input = format!("{MINIMAL}\n[bloom]\nhash_count = 0\n");
        let err = LinkageConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, LinkageError::InvalidBloomParams { hash_count: 0, .. }));
    }

    #[test]
    fn reject_empty_dataset_file() {
        let input = r#"
name = "Bad"
[datasets.a]
file = "a.csv"
[datasets.b]
file = "  "
"#;
        let err = LinkageConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("datasets.b.file"));
    }

    #[test]
    fn reject_unknown_name_policy() {
        let input = format!("{MINIMAL}\n[matching]\nname_policy = \"soundex\"\n");
        assert!(LinkageConfig::from_toml(&input).is_err());
    }

    #[test]
    fn reject_missing_dataset() {
        let input = r#"
name = "Bad"
[datasets.a]
file = "a.csv"
"#;
        let err = LinkageConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, LinkageError::ConfigParse(_)));
    }
}
