//! Free-form date canonicalization to `DD-MM-YYYY`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub(crate) const CANONICAL_FORMAT: &str = "%d-%m-%Y";

/// How an all-numeric date like `01/02/1990` is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `01/02/1990` is 1 February 1990.
    #[default]
    DayFirst,
    /// `01/02/1990` is 2 January 1990. Hyphenated `DD-MM-YYYY` is still read
    /// day first, so canonical output parses back to itself.
    MonthFirst,
}

/// Canonicalize a date with day-first reading of numeric dates.
///
/// Returns `DD-MM-YYYY` on success and the input unchanged otherwise.
pub fn canonicalize_date(input: &str) -> String {
    canonicalize_date_with(input, DateOrder::DayFirst)
}

pub fn canonicalize_date_with(input: &str, order: DateOrder) -> String {
    match parse_date(input, order) {
        Some(date) => date.format(CANONICAL_FORMAT).to_string(),
        None => input.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number { value: u32, digits: usize },
    Month(u32),
}

/// Parse a free-form date.
///
/// Accepted shapes:
/// - `YYYY-MM-DD` and `YYYYMMDD`
/// - `D/M/Y`, `D.M.Y`, `D-M-Y` (or `M/D/Y` under [`DateOrder::MonthFirst`])
/// - month names in either position: `1 February 1990`, `Feb 1st, 1990`, `1. März 1990`
///
/// Weekday names and filler words (`of`, `the`, `den`) are ignored. Two-digit
/// years pivot at 69: `00..=68` is 20xx, `69..=99` is 19xx.
pub fn parse_date(input: &str, order: DateOrder) -> Option<NaiveDate> {
    let lowered = input.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if lowered.len() == 8 && lowered.bytes().all(|b| b.is_ascii_digit()) {
        let year = lowered[0..4].parse().ok()?;
        let month = lowered[4..6].parse().ok()?;
        let day = lowered[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(date) = parse_canonical(&lowered) {
        return Some(date);
    }

    let mut tokens = Vec::new();
    for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        if is_filler(word) {
            continue;
        }
        tokens.push(classify(word)?);
    }

    let months: Vec<u32> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Month(m) => Some(*m),
            _ => None,
        })
        .collect();
    let numbers: Vec<(u32, usize)> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Number { value, digits } => Some((*value, *digits)),
            _ => None,
        })
        .collect();

    match (months.as_slice(), numbers.as_slice()) {
        ([month], [first, second]) => {
            // Whichever number is long enough to be a year is the year;
            // otherwise day comes before year.
            let (day, year) = if first.1 > 2 { (*second, *first) } else { (*first, *second) };
            build(year, *month, day.0)
        }
        ([], [first, second, third]) => {
            if first.1 == 4 {
                return build(*first, second.0, third.0);
            }
            let (day, month) = match order {
                DateOrder::DayFirst => (first.0, second.0),
                DateOrder::MonthFirst => (second.0, first.0),
            };
            build(*third, month, day).or_else(|| build(*third, day, month))
        }
        _ => None,
    }
}

/// Exactly `DD-MM-YYYY`, independent of [`DateOrder`].
fn parse_canonical(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    let day = input[0..2].parse().ok()?;
    let month = input[3..5].parse().ok()?;
    let year = input[6..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn build(year: (u32, usize), month: u32, day: u32) -> Option<NaiveDate> {
    let (value, digits) = year;
    let year = match digits {
        2 if value < 69 => 2000 + value,
        2 => 1900 + value,
        4 => value,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn classify(word: &str) -> Option<Token> {
    if let Some(month) = month_number(word) {
        return Some(Token::Month(month));
    }

    let digits = strip_ordinal(word);
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(Token::Number {
        value: digits.parse().ok()?,
        digits: digits.len(),
    })
}

/// `1st` => `1`, `22nd` => `22`; other words pass through.
fn strip_ordinal(word: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
                return stem;
            }
        }
    }
    word
}

fn is_filler(word: &str) -> bool {
    matches!(
        word,
        "of" | "the" | "den" | "der" | "am"
            | "monday" | "mon" | "tuesday" | "tue" | "tues" | "wednesday" | "wed"
            | "thursday" | "thu" | "thur" | "thurs" | "friday" | "fri"
            | "saturday" | "sat" | "sunday" | "sun"
            | "montag" | "dienstag" | "mittwoch" | "donnerstag" | "freitag"
            | "samstag" | "sonnabend" | "sonntag"
    )
}

fn month_number(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" | "januar" | "jän" | "jänner" => 1,
        "february" | "feb" | "februar" => 2,
        "march" | "mar" | "märz" | "maerz" | "mrz" => 3,
        "april" | "apr" => 4,
        "may" | "mai" => 5,
        "june" | "jun" | "juni" => 6,
        "july" | "jul" | "juli" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" | "oktober" | "okt" => 10,
        "november" | "nov" => 11,
        "december" | "dec" | "dezember" | "dez" => 12,
        _ => return None,
    };
    Some(month)
}
