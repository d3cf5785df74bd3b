//! Text normalization and matching helpers shared by the resolver,
//! classifier and hint propagation.
//!
//! All matching in this crate happens over *folded* text: NFD-decomposed,
//! combining marks stripped, lowercased, trimmed. Scanned Brazilian documents
//! mix accented and unaccented spellings freely ("Sócio" vs "Socio"), so
//! every comparison goes through [`fold`] first.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PLACEHOLDER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(socio|socia|partner)\s*\d+$").unwrap());
static POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{5}-?\d{3}").unwrap());
static STREET_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{1,5}\b").unwrap());
static STATE_ABBREV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(ac|al|ap|am|ba|ce|df|es|go|ma|mt|ms|mg|pa|pb|pr|pe|pi|rj|rn|rs|ro|rr|sc|sp|se|to)\b",
    )
    .unwrap()
});

/// Fold text for matching: decompose, drop combining marks, lowercase, trim.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Fold for filename matching: separators become spaces so
/// "rg_bruno-costa.pdf" can contain "bruno costa".
pub fn fold_loose(text: &str) -> String {
    let folded = fold(text);
    let spaced: String = folded
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.' | ',') { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if the folded haystack contains any of the (already folded) keywords.
pub fn contains_any(folded: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| folded.contains(kw))
}

/// Loose person-name match: folded equality, or either name containing the
/// other. Handles "Ana Silva" vs "Ana Maria Silva" and partial filename hits.
pub fn is_likely_same_person(a: &str, b: &str) -> bool {
    let a = fold(a);
    let b = fold(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

/// Auto-provisioned partners get "Sócio N" names until a real name arrives.
pub fn is_placeholder_partner_name(name: &str) -> bool {
    let folded = fold(name);
    folded.is_empty() || PLACEHOLDER_NAME.is_match(&folded)
}

/// Placeholder name for the partner at 1-based position `position`.
pub fn placeholder_partner_name(position: usize) -> String {
    format!("Sócio {position}")
}

/// Score how much a free-text candidate looks like a street address.
/// Postal code is the strongest signal, then a street number, a state
/// abbreviation, and overall length.
pub fn score_address_candidate(text: &str) -> i32 {
    let folded = fold(text);
    if folded.is_empty() {
        return 0;
    }

    let mut score = 0;
    if POSTAL_CODE.is_match(&folded) {
        score += 4;
    }
    if STREET_NUMBER.is_match(&folded) {
        score += 2;
    }
    if STATE_ABBREV.is_match(&folded) {
        score += 2;
    }
    if folded.len() >= 20 {
        score += 2;
    }
    if folded.len() >= 35 {
        score += 1;
    }
    score
}

/// Pick the best address among candidates: highest score, longest on ties.
pub fn best_address_candidate<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .max_by_key(|c| (score_address_candidate(c), c.trim().len()))
}

/// Infer an age from a dd/mm/yyyy birth date. Rejects years before 1900 and
/// implausible results outside 0..=120.
pub fn infer_age_from_birth_date(birth_date: &str) -> Option<u32> {
    infer_age_at(birth_date, Utc::now().date_naive())
}

fn infer_age_at(birth_date: &str, today: NaiveDate) -> Option<u32> {
    let parsed = NaiveDate::parse_from_str(birth_date.trim(), "%d/%m/%Y").ok()?;
    if parsed.year() < 1900 {
        return None;
    }
    let mut age = today.year() - parsed.year();
    if (today.month(), today.day()) < (parsed.month(), parsed.day()) {
        age -= 1;
    }
    u32::try_from(age).ok().filter(|a| *a <= 120)
}

/// Parse a confidence string into a number: strips '%', accepts a decimal
/// comma. Returns None for non-numeric labels like "alta".
pub fn parse_confidence_number(confidence: &str) -> Option<f64> {
    let cleaned = confidence.trim().trim_end_matches('%').replace(',', ".");
    cleaned.trim().parse::<f64>().ok()
}

/// How many ASCII digits the string carries. Used for phone completeness.
pub fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}
