use std::collections::HashSet;

use crate::models::{RawSignals, Signals, Term, ANY_LANGUAGE, GENERAL_GENRE};

/// Fills the gaps in interpreted signals
///
/// Missing or blank genre becomes "General", missing or blank language becomes "Any", and
/// missing keywords become an empty list. Keywords are trimmed and deduplicated ignoring
/// case, first occurrence kept. Never fails.
pub fn normalize(raw: RawSignals) -> Signals {
    let mut seen = HashSet::new();
    let keywords = raw
        .keywords
        .unwrap_or_default()
        .into_iter()
        .map(Term::new)
        .filter(|term| !term.needle.is_empty())
        .filter(|term| seen.insert(term.needle.clone()))
        .collect();

    Signals {
        keywords,
        genre: preference(raw.target_genre, GENERAL_GENRE),
        language: preference(raw.target_language, ANY_LANGUAGE),
    }
}

fn preference(value: Option<String>, sentinel: &str) -> Option<Term> {
    value
        .map(Term::new)
        .filter(|term| !term.needle.is_empty() && !term.label.eq_ignore_ascii_case(sentinel))
}
