use std::path::Path;

use rayon::prelude::*;

use crate::bloom::BloomFilter;
use crate::config::{BloomConfig, ColumnMapping, LinkageConfig, MatchStrategy, MatchingConfig, NamePolicy};
use crate::date::{parse_date, DateOrder, CANONICAL_FORMAT};
use crate::error::LinkageError;
use crate::model::{
    BloomStats, CanonicalRecord, LinkInput, LinkMeta, LinkResult, LinkSummary, Match, Record,
};
use crate::normalize::{canonicalize_address, normalize_text};
use crate::phonetic::{DoubleMetaphoneEncoder, PhoneticEncoder};
use crate::similarity::{IndelRatio, SimilarityScorer};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Matching policy for one [`Linker`]. `Default` is the reference rule:
/// exact date of birth, address similarity above 0.8, names ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOptions {
    pub threshold: f64,
    pub date_order: DateOrder,
    pub name_policy: NamePolicy,
    pub strategy: MatchStrategy,
    pub exclusive_b: bool,
    pub skip_unparsed_dates: bool,
    pub parallel: bool,
    pub bloom: BloomConfig,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default(), &BloomConfig::default())
    }
}

impl LinkOptions {
    pub fn from_config(matching: &MatchingConfig, bloom: &BloomConfig) -> Self {
        Self {
            threshold: matching.threshold,
            date_order: matching.date_order,
            name_policy: matching.name_policy,
            strategy: matching.strategy,
            exclusive_b: matching.exclusive_b,
            skip_unparsed_dates: matching.skip_unparsed_dates,
            parallel: matching.parallel,
            bloom: *bloom,
        }
    }
}

// ---------------------------------------------------------------------------
// Linker
// ---------------------------------------------------------------------------

/// Everything one linkage pass produced.
pub struct LinkOutcome {
    pub matches: Vec<Match>,
    pub canonical_a: Vec<CanonicalRecord>,
    pub canonical_b: Vec<CanonicalRecord>,
    pub bloom_a: BloomFilter,
    pub bloom_b: BloomFilter,
    pub prefiltered: usize,
}

/// Links two record collections under a [`LinkOptions`] policy with a
/// pluggable phonetic encoder and similarity scorer.
pub struct Linker {
    options: LinkOptions,
    encoder: Box<dyn PhoneticEncoder>,
    scorer: Box<dyn SimilarityScorer>,
}

/// Per-record result of scanning B.
enum Scan {
    Matched(usize, f64),
    NoMatch,
    Prefiltered,
}

impl Linker {
    pub fn new(options: LinkOptions) -> Self {
        Self {
            options,
            encoder: Box::new(DoubleMetaphoneEncoder),
            scorer: Box::new(IndelRatio),
        }
    }

    pub fn from_config(config: &LinkageConfig) -> Self {
        Self::new(LinkOptions::from_config(&config.matching, &config.bloom))
            .with_scorer_boxed(config.matching.scorer.scorer())
    }

    pub fn with_encoder(mut self, encoder: impl PhoneticEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    pub fn with_scorer(self, scorer: impl SimilarityScorer + 'static) -> Self {
        self.with_scorer_boxed(Box::new(scorer))
    }

    fn with_scorer_boxed(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    pub fn canonicalize(&self, record: &Record) -> CanonicalRecord {
        let parsed = parse_date(&record.date_of_birth, self.options.date_order);
        CanonicalRecord {
            phonetic_name: self.encoder.encode(&record.name),
            normalized_name: normalize_text(&record.name),
            canonical_dob: match parsed {
                Some(date) => date.format(CANONICAL_FORMAT).to_string(),
                None => record.date_of_birth.clone(),
            },
            dob_parsed: parsed.is_some(),
            canonical_address: canonicalize_address(&record.address),
        }
    }

    pub fn canonicalize_all(&self, records: &[Record]) -> Vec<CanonicalRecord> {
        if self.options.parallel {
            records.par_iter().map(|r| self.canonicalize(r)).collect()
        } else {
            records.iter().map(|r| self.canonicalize(r)).collect()
        }
    }

    /// One filter per collection; each record contributes its three tokens.
    pub fn build_filter(&self, canonical: &[CanonicalRecord]) -> Result<BloomFilter, LinkageError> {
        let mut filter = BloomFilter::new(self.options.bloom.size, self.options.bloom.hash_count)?;
        for record in canonical {
            for token in record.tokens() {
                filter.insert(token);
            }
        }
        Ok(filter)
    }

    /// Address similarity if `b` is an acceptable partner for `a`.
    fn accepts(&self, a: &CanonicalRecord, b: &CanonicalRecord) -> Option<f64> {
        if a.canonical_dob != b.canonical_dob {
            return None;
        }
        if self.options.skip_unparsed_dates && !(a.dob_parsed && b.dob_parsed) {
            return None;
        }

        match self.options.name_policy {
            NamePolicy::Ignore => {}
            NamePolicy::Phonetic => {
                if a.phonetic_name != b.phonetic_name {
                    return None;
                }
            }
            NamePolicy::Fuzzy => {
                if !self.scorer.is_similar(&a.normalized_name, &b.normalized_name, self.options.threshold) {
                    return None;
                }
            }
        }

        let score = self.scorer.similarity(&a.canonical_address, &b.canonical_address);
        (score > self.options.threshold).then_some(score)
    }

    /// True when B's filter proves no record of B can pass the exact gates.
    fn ruled_out(&self, a: &CanonicalRecord, bloom_b: &BloomFilter) -> bool {
        if self.options.strategy != MatchStrategy::BloomPrefilter {
            return false;
        }
        if !bloom_b.contains(&a.canonical_dob) {
            return true;
        }
        self.options.name_policy == NamePolicy::Phonetic && !bloom_b.contains(&a.phonetic_name)
    }

    fn scan(
        &self,
        a: &CanonicalRecord,
        canonical_b: &[CanonicalRecord],
        bloom_b: &BloomFilter,
        used_b: Option<&[bool]>,
    ) -> Scan {
        if self.ruled_out(a, bloom_b) {
            return Scan::Prefiltered;
        }

        for (j, b) in canonical_b.iter().enumerate() {
            if used_b.is_some_and(|used| used[j]) {
                continue;
            }
            if let Some(score) = self.accepts(a, b) {
                return Scan::Matched(j, score);
            }
        }
        Scan::NoMatch
    }

    /// Link `a` against `b`: for each record of A in order, the first record
    /// of B that passes the gates is its match.
    pub fn link(&self, a: &[Record], b: &[Record]) -> Result<LinkOutcome, LinkageError> {
        log::info!("linking {} x {} records", a.len(), b.len());

        let (canonical_a, canonical_b) = if self.options.parallel {
            rayon::join(|| self.canonicalize_all(a), || self.canonicalize_all(b))
        } else {
            (self.canonicalize_all(a), self.canonicalize_all(b))
        };

        let (bloom_a, bloom_b) = if self.options.parallel {
            let (fa, fb) = rayon::join(|| self.build_filter(&canonical_a), || self.build_filter(&canonical_b));
            (fa?, fb?)
        } else {
            (self.build_filter(&canonical_a)?, self.build_filter(&canonical_b)?)
        };

        log::debug!(
            "bloom filters built: A {}/{} bits, B {}/{} bits",
            bloom_a.bits_set(),
            bloom_a.size(),
            bloom_b.bits_set(),
            bloom_b.size()
        );

        let scans: Vec<Scan> = if self.options.exclusive_b {
            // Later records of A depend on earlier claims, so this stays sequential.
            let mut used = vec![false; canonical_b.len()];
            canonical_a
                .iter()
                .map(|ca| {
                    let scan = self.scan(ca, &canonical_b, &bloom_b, Some(used.as_slice()));
                    if let Scan::Matched(j, _) = scan {
                        used[j] = true;
                    }
                    scan
                })
                .collect()
        } else if self.options.parallel {
            canonical_a
                .par_iter()
                .map(|ca| self.scan(ca, &canonical_b, &bloom_b, None))
                .collect()
        } else {
            canonical_a
                .iter()
                .map(|ca| self.scan(ca, &canonical_b, &bloom_b, None))
                .collect()
        };

        let mut matches = Vec::new();
        let mut prefiltered = 0;
        for (i, scan) in scans.into_iter().enumerate() {
            match scan {
                Scan::Matched(j, address_score) => matches.push(Match {
                    index_a: i,
                    index_b: j,
                    name_a: a[i].name.clone(),
                    name_b: b[j].name.clone(),
                    address_score,
                }),
                Scan::Prefiltered => prefiltered += 1,
                Scan::NoMatch => {}
            }
        }

        log::info!("{} matches, {} records prefiltered", matches.len(), prefiltered);

        Ok(LinkOutcome {
            matches,
            canonical_a,
            canonical_b,
            bloom_a,
            bloom_b,
            prefiltered,
        })
    }
}

/// Link two collections with the reference policy at the given threshold.
///
/// ```
/// use pprl_linkage::{link_records, Record};
///
/// let a = vec![Record::new("Jon Smith", "01/02/1990", "12 Main Str.")];
/// let b = vec![Record::new("John Smyth", "01-02-1990", "12-14 Main Street")];
///
/// let matches = link_records(&a, &b, 0.8);
/// assert_eq!(matches.len(), 1);
/// assert_eq!((matches[0].index_a, matches[0].index_b), (0, 0));
/// ```
pub fn link_records(a: &[Record], b: &[Record], threshold: f64) -> Vec<Match> {
    let options = LinkOptions {
        threshold,
        ..LinkOptions::default()
    };
    // The reference Bloom parameters are always valid, so this cannot fail.
    Linker::new(options)
        .link(a, b)
        .map(|outcome| outcome.matches)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Config-driven run
// ---------------------------------------------------------------------------

/// Run linkage per config. Returns matches + summary.
pub fn run(config: &LinkageConfig, input: &LinkInput) -> Result<LinkResult, LinkageError> {
    let linker = Linker::from_config(config);
    let outcome = linker.link(&input.a, &input.b)?;

    let unparsed = |canonical: &[CanonicalRecord]| canonical.iter().filter(|c| !c.dob_parsed).count();

    let summary = LinkSummary {
        records_a: input.a.len(),
        records_b: input.b.len(),
        matched: outcome.matches.len(),
        unmatched_a: input.a.len() - outcome.matches.len(),
        unparsed_dates_a: unparsed(&outcome.canonical_a),
        unparsed_dates_b: unparsed(&outcome.canonical_b),
        prefiltered: outcome.prefiltered,
        bloom_a: bloom_stats(&outcome.bloom_a),
        bloom_b: bloom_stats(&outcome.bloom_b),
    };

    Ok(LinkResult {
        meta: LinkMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            threshold: config.matching.threshold,
        },
        summary,
        matches: outcome.matches,
    })
}

fn bloom_stats(filter: &BloomFilter) -> BloomStats {
    BloomStats {
        size: filter.size(),
        hash_count: filter.hash_count(),
        bits_set: filter.bits_set(),
        load_factor: filter.load_factor(),
        estimated_fpp: filter.estimated_fpp(),
    }
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// Parse a dataset's CSV into records using its column mapping.
///
/// Headers must contain every mapped column; cells may be empty.
pub fn load_csv_records(
    dataset: &str,
    csv_data: &str,
    columns: &ColumnMapping,
) -> Result<Vec<Record>, LinkageError> {
    let csv_err = |e: csv::Error| LinkageError::Csv {
        dataset: dataset.into(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, LinkageError> {
        headers.iter().position(|h| h == name).ok_or_else(|| LinkageError::MissingColumn {
            dataset: dataset.into(),
            column: name.into(),
        })
    };

    let name_idx = idx(&columns.name)?;
    let dob_idx = idx(&columns.date_of_birth)?;
    let address_idx = idx(&columns.address)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        records.push(Record {
            name: row.get(name_idx).unwrap_or("").to_string(),
            date_of_birth: row.get(dob_idx).unwrap_or("").to_string(),
            address: row.get(address_idx).unwrap_or("").to_string(),
        });
    }

    Ok(records)
}

/// Load both datasets named by `config`, resolving files against `base_dir`.
pub fn load_input(config: &LinkageConfig, base_dir: &Path) -> Result<LinkInput, LinkageError> {
    let load = |label: &str, dataset: &crate::config::DatasetConfig| {
        let path = base_dir.join(&dataset.file);
        let csv_data = std::fs::read_to_string(&path)
            .map_err(|e| LinkageError::Io(format!("cannot read {}: {e}", path.display())))?;
        load_csv_records(label, &csv_data, &dataset.columns)
    };

    Ok(LinkInput {
        a: load("a", &config.datasets.a)?,
        b: load("b", &config.datasets.b)?,
    })
}
