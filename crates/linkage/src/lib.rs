//! `pprl-linkage`: privacy-preserving record linkage engine.
//!
//! Links personal records across two collections without exchanging raw
//! identifiers: fields are canonicalized, summarized in Bloom filters, and
//! paired on exact date of birth plus fuzzy address similarity.
//!
//! Pure engine crate: receives pre-loaded records, returns matches.
//! CSV parsing is provided for callers that load datasets from disk.

pub mod bloom;
pub mod config;
pub mod date;
pub mod engine;
pub mod error;
pub mod hash;
pub mod model;
pub mod normalize;
pub mod phonetic;
pub mod similarity;

pub use bloom::BloomFilter;
pub use config::{LinkageConfig, MatchStrategy, NamePolicy};
pub use date::{canonicalize_date, canonicalize_date_with, parse_date, DateOrder};
pub use engine::{link_records, load_csv_records, load_input, run, LinkOptions, LinkOutcome, Linker};
pub use error::LinkageError;
pub use model::{CanonicalRecord, LinkInput, LinkResult, LinkSummary, Match, Record};
pub use normalize::{canonicalize_address, normalize_text};
pub use phonetic::{phonetic_name, DoubleMetaphoneEncoder, PhoneticEncoder};
pub use similarity::{is_similar, string_similarity, ScorerKind, SimilarityScorer, DEFAULT_THRESHOLD};
