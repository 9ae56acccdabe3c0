use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Genre sentinel meaning "no genre preference"
pub const GENERAL_GENRE: &str = "General";

/// Language sentinel meaning "no language preference"
pub const ANY_LANGUAGE: &str = "Any";

/// Best-effort interpretation of a mood query, as handed over by the Mood Interpreter
///
/// Every field may be missing. Nothing here is trusted until it has been normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSignals {
    #[serde(default)]
    pub target_genre: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub target_language: Option<String>,
}

impl RawSignals {
    /// Builds raw signals from the raw query tokens, with no genre or language preference
    pub fn from_query(mood: &str) -> Self {
        Self {
            target_genre: None,
            keywords: Some(mood.split_whitespace().map(str::to_string).collect()),
            target_language: None,
        }
    }

    /// Extracts signals from an arbitrary JSON document
    ///
    /// Fields with an unexpected type are treated as absent, and non-string keyword entries
    /// are skipped.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        let keywords = value.get("keywords").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });

        Self {
            target_genre: text("target_genre"),
            keywords,
            target_language: text("target_language"),
        }
    }

    pub fn has_keywords(&self) -> bool {
        self.keywords
            .as_ref()
            .is_some_and(|k| k.iter().any(|kw| !kw.trim().is_empty()))
    }
}

/// A signal string kept in its display casing alongside its lower-cased matching form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub label: String,
    pub needle: String,
}

impl Term {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into().trim().to_string();
        let needle = label.to_lowercase();
        Self { label, needle }
    }
}

/// Normalized signals consumed by the scoring function
///
/// `genre: None` is the "General" sentinel and `language: None` is "Any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub keywords: Vec<Term>,
    pub genre: Option<Term>,
    pub language: Option<Term>,
}

impl Signals {
    pub fn genre_label(&self) -> &str {
        self.genre.as_ref().map_or(GENERAL_GENRE, |g| g.label.as_str())
    }

    pub fn language_label(&self) -> &str {
        self.language.as_ref().map_or(ANY_LANGUAGE, |l| l.label.as_str())
    }

    pub fn keyword_labels(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.label.clone()).collect()
    }
}
