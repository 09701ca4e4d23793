//! Phonetic name encoding.

use std::panic;

use rphonetic::{DoubleMetaphone, Encoder};
use unicode_normalization::UnicodeNormalization;

/// Turns a name into a code approximating its pronunciation.
pub trait PhoneticEncoder: Send + Sync {
    fn encode(&self, name: &str) -> String;
}

/// Primary Double Metaphone code of the ASCII-folded name.
///
/// Each word is encoded on its own and the codes are joined with a space;
/// the encoder caps a code at four characters, which would otherwise drop
/// the surname of most full names.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleMetaphoneEncoder;

impl PhoneticEncoder for DoubleMetaphoneEncoder {
    fn encode(&self, name: &str) -> String {
        let folded = fold_for_phonetic(name);
        if folded.is_empty() {
            return String::new();
        }

        let codes = panic::catch_unwind(|| {
            let encoder = DoubleMetaphone::default();
            folded
                .split(' ')
                .map(|word| encoder.encode(word))
                .filter(|code| !code.is_empty())
                .collect::<Vec<String>>()
        });

        match codes {
            Ok(codes) => codes.join(" "),
            Err(_) => {
                log::warn!("double metaphone failed on a {}-character name", folded.len());
                String::new()
            }
        }
    }
}

/// Primary phonetic code of `name` using [`DoubleMetaphoneEncoder`].
///
/// Spelling variants share a code: `Smith`/`Smyth`, `Jon`/`John`.
pub fn phonetic_name(name: &str) -> String {
    DoubleMetaphoneEncoder.encode(name)
}

/// Decompose diacritics and keep ASCII letters plus single spaces.
fn fold_for_phonetic(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().nfd() {
        for lc in ch.to_lowercase() {
            if lc.is_ascii_alphabetic() {
                out.push(lc);
            } else if lc.is_whitespace() {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            } else {
                match lc {
                    'ß' => out.push_str("ss"),
                    'æ' => out.push_str("ae"),
                    'ø' => out.push('o'),
                    'đ' => out.push('d'),
                    _ => {}
                }
            }
        }
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out
}
