//! Bloom filter over normalized string tokens.
//!
//! A Bloom filter answers "possibly in set" or "definitely not in set":
//!
//! - **No false negatives**: an inserted item always tests positive
//! - **Possible false positives**: roughly `(1 - e^(-kn/m))^k` after `n` inserts
//! - **Monotone**: bits are only ever set, there is no removal
//!
//! # Usage
//!
//! ```rust
//! use pprl_linkage::BloomFilter;
//!
//! let mut filter = BloomFilter::new(10_000, 10).unwrap();
//! filter.insert("01-02-1990");
//! filter.insert("12 main strasse");
//!
//! assert!(filter.contains("01-02-1990"));
//! assert!(filter.contains("  12 MAIN STRASSE ")); // items are normalized first
//! ```
//!
//! # Implementation Details
//!
//! - k digests come from MurmurHash3 x86_32 re-seeded with the round number `0..k`
//! - the 32-bit digest is read as signed and reduced with a Euclidean remainder,
//!   so bit positions agree with `mmh3.hash(item, i) % m` implementations
//! - bits packed in `u64` words

use crate::error::LinkageError;
use crate::hash::murmur3_32;
use crate::normalize::normalize_text;

/// Fixed-size bit array with `hash_count` seeded hash rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Total number of bits (m)
    size: usize,
    /// Number of hash rounds (k)
    hash_count: u32,
    /// Count of bits set to 1
    bits_set: usize,
    /// Length = ceil(size / 64)
    bit_array: Vec<u64>,
}

impl BloomFilter {
    pub const DEFAULT_SIZE: usize = 10_000;
    pub const DEFAULT_HASH_COUNT: u32 = 10;

    /// Creates an empty filter of `size` bits and `hash_count` hash rounds.
    ///
    /// Both must be positive; a zero-sized array or zero rounds leave
    /// membership undefined.
    pub fn new(size: usize, hash_count: u32) -> Result<Self, LinkageError> {
        if size == 0 || hash_count == 0 {
            return Err(LinkageError::InvalidBloomParams { size, hash_count });
        }

        Ok(Self {
            size,
            hash_count,
            bits_set: 0,
            bit_array: vec![0u64; size.div_ceil(64)],
        })
    }

    /// Inserts an item after [`normalize_text`].
    ///
    /// Idempotent: inserting the same item again leaves the bits unchanged.
    pub fn insert(&mut self, item: &str) {
        let item = normalize_text(item);
        for seed in 0..self.hash_count {
            let bit = self.digest(&item, seed);
            self.set_bit(bit);
        }
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns `false` on the first unset bit.
    pub fn contains(&self, item: &str) -> bool {
        let item = normalize_text(item);
        (0..self.hash_count).all(|seed| self.get_bit(self.digest(&item, seed)))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    pub fn bits_set(&self) -> usize {
        self.bits_set
    }

    pub fn is_empty(&self) -> bool {
        self.bits_set == 0
    }

    /// Fraction of bits set.
    pub fn load_factor(&self) -> f64 {
        self.bits_set as f64 / self.size as f64
    }

    /// False positive probability estimated from the current load: `load^k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(self.hash_count as i32)
    }

    /// Expected false positive probability after `items` distinct inserts:
    /// `(1 - e^(-kn/m))^k`.
    pub fn theoretical_fpp(&self, items: usize) -> f64 {
        let k = self.hash_count as f64;
        let exponent = -k * items as f64 / self.size as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    fn digest(&self, item: &str, seed: u32) -> usize {
        let hash = murmur3_32(item.as_bytes(), seed) as i32;
        (hash as i64).rem_euclid(self.size as i64) as usize
    }

    fn set_bit(&mut self, bit: usize) {
        let word = &mut self.bit_array[bit >> 6];
        let mask = 1u64 << (bit & 63);
        if *word & mask == 0 {
            *word |= mask;
            self.bits_set += 1;
        }
    }

    fn get_bit(&self, bit: usize) -> bool {
        self.bit_array[bit >> 6] & (1u64 << (bit & 63)) != 0
    }
}
