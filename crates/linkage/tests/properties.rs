// Property-based tests for canonicalization, Bloom filters and matching.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use pprl_linkage::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn config_64() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_token() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-zA-Z0-9 ]{0,24}",
        1 => r"[0-9]{2}-[0-9]{2}-[0-9]{4}",
        1 => "\\PC{0,12}",
    ]
}

/// (day, month, year) that exists in every month.
fn arb_ymd() -> impl Strategy<Value = (u32, u32, i32)> {
    (1u32..=28, 1u32..=12, 1900i32..=2030)
}

fn arb_address() -> impl Strategy<Value = String> {
    (1u32..200, prop::sample::select(vec!["Main", "Oak", "Elm", "Harbour"]),
     prop::sample::select(vec!["St", "Street", "Rd", "Ave", "Str."]))
        .prop_map(|(n, street, kind)| format!("{n} {street} {kind}"))
}

fn arb_record() -> impl Strategy<Value = Record> {
    (r"[A-Z][a-z]{2,8}", arb_ymd(), arb_address()).prop_map(|(name, (d, m, y), address)| {
        Record::new(name, format!("{d}/{m}/{y}"), address)
    })
}

// ---------------------------------------------------------------------------
// Bloom filter
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn bloom_has_no_false_negatives(
        items in prop::collection::vec(arb_token(), 0..40),
        size in 1usize..5000,
        hash_count in 1u32..12,
    ) {
        let mut filter = BloomFilter::new(size, hash_count).unwrap();
        for item in &items {
            filter.insert(item);
        }
        for item in &items {
            prop_assert!(filter.contains(item), "inserted item {:?} not found", item);
        }
        prop_assert!(filter.bits_set() <= size);
    }

    #[test]
    fn bloom_insert_is_idempotent(items in prop::collection::vec(arb_token(), 1..20)) {
        let mut once = BloomFilter::new(2048, 5).unwrap();
        for item in &items {
            once.insert(item);
        }
        let mut twice = once.clone();
        for item in &items {
            twice.insert(item);
        }
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn bloom_membership_ignores_case_and_spacing(item in r"[a-z0-9]{1,8}( [a-z0-9]{1,8}){0,3}") {
        let mut filter = BloomFilter::new(4096, 7).unwrap();
        filter.insert(&item);
        let shouted = format!("  {}  ", item.to_uppercase().replace(' ', "   "));
        prop_assert!(filter.contains(&shouted));
    }
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn similarity_is_symmetric(a in arb_token(), b in arb_token()) {
        prop_assert_eq!(string_similarity(&a, &b), string_similarity(&b, &a));
    }

    #[test]
    fn similarity_is_bounded(a in arb_token(), b in arb_token()) {
        let s = string_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s), "similarity {} out of range", s);
    }

    #[test]
    fn identical_strings_score_one(a in arb_token()) {
        prop_assert_eq!(string_similarity(&a, &a), 1.0);
        prop_assert!(is_similar(&a, &a, 0.99));
    }
}

// ---------------------------------------------------------------------------
// Canonicalization
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn normalize_text_is_idempotent(s in arb_token()) {
        let once = normalize_text(&s);
        prop_assert_eq!(normalize_text(&once), once.clone());
    }

    #[test]
    fn numeric_formats_agree((d, m, y) in arb_ymd()) {
        let expected = format!("{d:02}-{m:02}-{y:04}");
        for input in [
            format!("{d}/{m}/{y}"),
            format!("{d:02}.{m:02}.{y}"),
            format!("{y}-{m:02}-{d:02}"),
            format!("{y}{m:02}{d:02}"),
        ] {
            prop_assert_eq!(canonicalize_date(&input), expected.clone(), "input {:?}", input);
        }
    }

    #[test]
    fn canonical_date_is_a_fixed_point(s in r"[0-9]{1,4}[ ./-][0-9]{1,4}[ ./-][0-9]{1,4}") {
        let once = canonicalize_date(&s);
        prop_assert_eq!(canonicalize_date(&once), once.clone());
    }
}

// ---------------------------------------------------------------------------
// Linking
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_64())]

    #[test]
    fn every_match_passes_the_gates(
        a in prop::collection::vec(arb_record(), 0..15),
        b in prop::collection::vec(arb_record(), 0..15),
    ) {
        let matches = link_records(&a, &b, 0.8);
        for m in &matches {
            prop_assert!(m.index_a < a.len() && m.index_b < b.len());
            let ra = &a[m.index_a];
            let rb = &b[m.index_b];
            prop_assert_eq!(canonicalize_date(&ra.date_of_birth), canonicalize_date(&rb.date_of_birth));
            let score = string_similarity(&canonicalize_address(&ra.address), &canonicalize_address(&rb.address));
            prop_assert!(score > 0.8);
            prop_assert_eq!(score, m.address_score);
        }
    }

    #[test]
    fn a_collection_links_to_itself(a in prop::collection::vec(arb_record(), 1..15)) {
        let matches = link_records(&a, &a, 0.8);
        prop_assert_eq!(matches.len(), a.len());
        for (i, m) in matches.iter().enumerate() {
            prop_assert_eq!(m.index_a, i);
            prop_assert!(m.index_b <= i);
        }
    }

    #[test]
    fn prefilter_never_loses_a_match(
        a in prop::collection::vec(arb_record(), 0..15),
        b in prop::collection::vec(arb_record(), 0..15),
    ) {
        let exhaustive = Linker::new(LinkOptions::default()).link(&a, &b).unwrap();
        let options = LinkOptions {
            strategy: MatchStrategy::BloomPrefilter,
            ..LinkOptions::default()
        };
        let prefiltered = Linker::new(options).link(&a, &b).unwrap();
        prop_assert_eq!(exhaustive.matches, prefiltered.matches);
    }
}
