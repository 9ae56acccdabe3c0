use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Movie, Signals};

/// Non-English languages the scorer knows well enough to exclude on
///
/// A requested language outside this list is still rewarded when present, but its absence
/// never excludes a movie.
const KNOWN_LANGUAGES: &[&str] = &[
    "hindi",
    "telugu",
    "tamil",
    "kannada",
    "malayalam",
    "bengali",
    "marathi",
    "punjabi",
    "korean",
    "japanese",
    "mandarin",
    "cantonese",
    "chinese",
    "spanish",
    "french",
    "german",
    "italian",
    "portuguese",
    "danish",
    "swedish",
    "norwegian",
    "russian",
    "arabic",
    "turkish",
    "thai",
];

const ENGLISH: &str = "english";

/// Tunable scoring weights
///
/// Only the ordering between weights is load-bearing: mood tag > title > text for keywords,
/// genre containment > genre prefix, native language > available language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Keyword equals a mood tag or the genre
    pub mood_tag: i64,
    /// Keyword appears in the title
    pub title: i64,
    /// Keyword appears in the description or genre text
    pub text: i64,
    /// Target genre contained in the movie's genre
    pub genre: i64,
    /// Movie's genre starts with the singular form of the target genre
    pub genre_prefix: i64,
    /// Target language is one of the movie's languages
    pub language: i64,
    /// Target language is the movie's original language
    pub native_language: i64,
    /// Minimum top score for an "exact" match
    pub strong_match: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            mood_tag: 5,
            title: 3,
            text: 1,
            genre: 4,
            genre_prefix: 3,
            language: 3,
            native_language: 8,
            strong_match: 4,
        }
    }
}

/// Outcome of scoring one movie
///
/// A hard-excluded movie is out of every ranking pass whatever its points are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub points: i64,
    pub hard_excluded: bool,
}

impl Score {
    fn included(points: i64) -> Self {
        Self {
            points,
            hard_excluded: false,
        }
    }

    fn excluded(points: i64) -> Self {
        Self {
            points,
            hard_excluded: true,
        }
    }

    /// Eligible for the primary pass
    pub fn is_positive(&self) -> bool {
        !self.hard_excluded && self.points > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordTier {
    Feature,
    Title,
    Text,
}

impl KeywordTier {
    fn weight(self, weights: &ScoringWeights) -> i64 {
        match self {
            KeywordTier::Feature => weights.mood_tag,
            KeywordTier::Title => weights.title,
            KeywordTier::Text => weights.text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageOutcome {
    Neutral,
    Bonus(i64),
    Excluded,
}

/// Lower-cased views of a movie's searchable fields
struct MovieText {
    features: HashSet<String>,
    title: String,
    free_text: String,
    genre: String,
}

impl MovieText {
    fn new(movie: &Movie) -> Self {
        let genre = movie.genre.as_deref().unwrap_or_default().trim().to_lowercase();

        let mut features: HashSet<String> = movie
            .mood_tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        if !genre.is_empty() {
            features.insert(genre.clone());
        }

        let description = movie.description.as_deref().unwrap_or_default();
        let free_text = format!("{} {}", description, genre).to_lowercase();

        Self {
            features,
            title: movie.title.to_lowercase(),
            free_text,
            genre,
        }
    }

    fn best_tier(&self, keyword: &str) -> Option<KeywordTier> {
        if self.features.contains(keyword) {
            Some(KeywordTier::Feature)
        } else if self.title.contains(keyword) {
            Some(KeywordTier::Title)
        } else if self.free_text.contains(keyword) {
            Some(KeywordTier::Text)
        } else {
            None
        }
    }
}

/// Scores one movie against normalized signals
///
/// Pure and deterministic: the same movie and signals always give the same score.
pub fn score(movie: &Movie, signals: &Signals, weights: &ScoringWeights) -> Score {
    let text = MovieText::new(movie);

    let mut points: i64 = signals
        .keywords
        .iter()
        .filter_map(|keyword| text.best_tier(&keyword.needle))
        .map(|tier| tier.weight(weights))
        .sum();

    if let Some(genre) = &signals.genre {
        points += genre_bonus(&text.genre, &genre.needle, weights);
    }

    match language_outcome(movie, signals, weights) {
        LanguageOutcome::Neutral => Score::included(points),
        LanguageOutcome::Bonus(bonus) => Score::included(points + bonus),
        LanguageOutcome::Excluded => Score::excluded(points),
    }
}

fn genre_bonus(genre: &str, target: &str, weights: &ScoringWeights) -> i64 {
    if genre.is_empty() || target.is_empty() {
        return 0;
    }
    if genre.contains(target) {
        return weights.genre;
    }

    let stem = singular(target);
    if stem.is_empty() || stem == target {
        return 0;
    }

    let prefixed = genre
        .split(['/', ',', '&', '|'])
        .map(str::trim)
        .any(|segment| segment.starts_with(stem.as_str()));

    if prefixed {
        weights.genre_prefix
    } else {
        0
    }
}

/// "comedies" -> "comedy", "thrillers" -> "thriller"
fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn language_outcome(movie: &Movie, signals: &Signals, weights: &ScoringWeights) -> LanguageOutcome {
    let Some(target) = &signals.language else {
        return LanguageOutcome::Neutral;
    };
    let target = target.needle.as_str();
    let known_set = !movie.languages.is_empty();

    if target == ENGLISH {
        return if movie.speaks(ENGLISH) {
            LanguageOutcome::Bonus(weights.language)
        } else if known_set {
            LanguageOutcome::Excluded
        } else {
            LanguageOutcome::Neutral
        };
    }

    if movie.speaks(target) {
        if movie.is_native_in(target) {
            LanguageOutcome::Bonus(weights.native_language)
        } else {
            LanguageOutcome::Bonus(weights.language)
        }
    } else if known_set && KNOWN_LANGUAGES.contains(&target) {
        LanguageOutcome::Excluded
    } else {
        LanguageOutcome::Neutral
    }
}
