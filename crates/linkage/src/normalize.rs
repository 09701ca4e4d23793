//! Text and address canonicalization.
//!
//! Every function here is total: any input string yields an output string.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercase, trim, and collapse internal whitespace runs to a single space.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Street-type abbreviations, applied in order to normalized text.
static ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"straße", "strasse"),
        (r"\bstr\b\.?", "strasse"),
        // compounds: hauptstr. => hauptstrasse
        (r"(\w)str\b\.?", "${1}strasse"),
        (r"\bpl\b\.?", "platz"),
        (r"\bst\b\.?", "street"),
        (r"\bave?\b\.?", "avenue"),
        (r"\brd\b\.?", "road"),
        (r"\bblvd\b\.?", "boulevard"),
        (r"\bln\b\.?", "lane"),
        (r"\bdr\b\.?", "drive"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// `12-14`, `12 - 14` => `12`
static NUMBER_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\s*-\s*\d+").unwrap());

/// Canonicalize a free-form street address.
///
/// Runs [`normalize_text`] first; the rewrites below assume lowercase,
/// single-spaced input. Street-type abbreviations are expanded to one
/// spelling, then hyphenated house-number ranges keep only their first number.
///
/// ```
/// use pprl_linkage::canonicalize_address;
///
/// assert_eq!(canonicalize_address("12-14 Main Str."), "12 main strasse");
/// ```
pub fn canonicalize_address(address: &str) -> String {
    let mut canonical = normalize_text(address);

    for (pattern, replacement) in ABBREVIATIONS.iter() {
        if pattern.is_match(&canonical) {
            canonical = pattern.replace_all(&canonical, *replacement).into_owned();
        }
    }

    NUMBER_RANGE.replace_all(&canonical, "${1}").into_owned()
}
