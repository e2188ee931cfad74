//! Grammar touch-up for salesperson notes: whitespace, capitalisation and a
//! fixed table of informal contractions. Pure string transform.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const CONTRACTIONS: &[(&str, &str)] = &[
    ("i", "I"),
    ("dont", "don't"),
    ("cant", "can't"),
    ("wont", "won't"),
    ("thats", "that's"),
    ("its", "it's"),
];

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

static CONTRACTION_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<&str> = CONTRACTIONS.iter().map(|(from, _)| *from).collect();
    Regex::new(&format!(r"(?i)\b({})\b", alternatives.join("|"))).expect("static regex")
});

pub fn correct(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    let capitalized = capitalize(&collapsed);

    CONTRACTION_RE
        .replace_all(&capitalized, |caps: &Captures| {
            let found = &caps[1];
            let lower = found.to_lowercase();
            let replacement = CONTRACTIONS
                .iter()
                .find(|(from, _)| *from == lower)
                .map(|(_, to)| *to)
                .unwrap_or(found);
            if found.starts_with(char::is_uppercase) {
                capitalize_first(replacement)
            } else {
                replacement.to_string()
            }
        })
        .into_owned()
}

/// First character upper-cased, the rest lower-cased
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
