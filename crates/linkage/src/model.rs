use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LinkageError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single personal record as supplied by the caller.
///
/// The record's identifier is its index in the collection it came from.
/// Empty fields are valid and compare as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub date_of_birth: String,
    pub address: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        date_of_birth: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            address: address.into(),
        }
    }

    /// Build a record from a field map keyed `name`, `date_of_birth`, `address`.
    ///
    /// Every key must be present. An empty value is fine; a missing key is a
    /// data-contract error.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, LinkageError> {
        let get = |key: &str| -> Result<String, LinkageError> {
            fields
                .get(key)
                .cloned()
                .ok_or_else(|| LinkageError::MissingField { field: key.into() })
        };

        Ok(Self {
            name: get("name")?,
            date_of_birth: get("date_of_birth")?,
            address: get("address")?,
        })
    }
}

/// Pre-loaded record collections for one linkage run.
#[derive(Debug, Clone, Default)]
pub struct LinkInput {
    pub a: Vec<Record>,
    pub b: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Derived
// ---------------------------------------------------------------------------

/// Canonical values derived from one [`Record`]. Never outlives a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub phonetic_name: String,
    pub normalized_name: String,
    /// `DD-MM-YYYY`, or the original input when it did not parse.
    pub canonical_dob: String,
    pub dob_parsed: bool,
    pub canonical_address: String,
}

impl CanonicalRecord {
    /// The tokens inserted into the collection's Bloom filter.
    pub fn tokens(&self) -> [&str; 3] {
        [
            self.phonetic_name.as_str(),
            self.canonical_dob.as_str(),
            self.canonical_address.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A linked pair: record `index_a` of collection A and `index_b` of B.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub index_a: usize,
    pub index_b: usize,
    pub name_a: String,
    pub name_b: String,
    pub address_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BloomStats {
    pub size: usize,
    pub hash_count: u32,
    pub bits_set: usize,
    pub load_factor: f64,
    pub estimated_fpp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkSummary {
    pub records_a: usize,
    pub records_b: usize,
    pub matched: usize,
    pub unmatched_a: usize,
    pub unparsed_dates_a: usize,
    pub unparsed_dates_b: usize,
    /// Records of A whose scan of B was skipped because B's filter proved no candidate.
    pub prefiltered: usize,
    pub bloom_a: BloomStats,
    pub bloom_b: BloomStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    pub meta: LinkMeta,
    pub summary: LinkSummary,
    pub matches: Vec<Match>,
}
