//! University name matching for runner registrations
//!
//! Free-text input is normalized and matched against a canonical list:
//! exact match first, then substring containment in either direction.
//! Containment is permissive on purpose ("nairobi" resolves to
//! "University of Nairobi") and callers rely on it.

use once_cell::sync::Lazy;
use regex::Regex;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Canonical institutions offered on the registration form
pub const KENYAN_UNIVERSITIES: &[&str] = &[
    "University of Nairobi",
    "Kenyatta University",
    "Strathmore University",
    "Jomo Kenyatta University of Agriculture and Technology",
    "Moi University",
    "Egerton University",
    "Maseno University",
    "Technical University of Kenya",
    "United States International University Africa",
    "Daystar University",
    "Mount Kenya University",
    "Catholic University of Eastern Africa",
    "Africa Nazarene University",
    "KCA University",
    "Multimedia University of Kenya",
    "Dedan Kimathi University of Technology",
    "Masinde Muliro University of Science and Technology",
    "Pwani University",
    "Riara University",
    "Zetech University",
];

/// Lower-case, strip punctuation, collapse whitespace, trim
#[must_use]
pub fn normalize_string(input: &str) -> String {
    let lowered = input.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Resolve free text to a canonical name
///
/// Returns `None` when nothing matches or the input normalizes to nothing.
#[must_use]
pub fn match_university<'a, S>(input: &str, canonical: &'a [S]) -> Option<&'a str>
where
    S: AsRef<str>,
{
    let needle = normalize_string(input);
    if needle.is_empty() {
        return None;
    }

    let normalized: Vec<(String, &'a str)> = canonical
        .iter()
        .map(|name| (normalize_string(name.as_ref()), name.as_ref()))
        .collect();

    if let Some((_, name)) = normalized.iter().find(|(n, _)| *n == needle) {
        return Some(*name);
    }

    normalized
        .iter()
        .filter(|(n, _)| !n.is_empty())
        .find(|(n, _)| n.contains(needle.as_str()) || needle.contains(n.as_str()))
        .map(|(_, name)| *name)
}
