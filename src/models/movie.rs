use serde::{Deserialize, Serialize};

/// A catalog entry as stored in the Catalog Store and returned to the client
///
/// Optional fields are explicit: a movie without a genre has `genre: None`, never an empty
/// string standing in for "unknown". Collections default to empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    /// Display title, also the deduplication key
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub mood_tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Languages the movie is available in (dubbed, subtitled or original)
    #[serde(default)]
    pub languages: Vec<String>,
    /// Language the movie was originally produced in
    #[serde(default)]
    pub original_language: Option<String>,
    /// Where the movie can be watched, filled in after ranking
    #[serde(default, rename = "ott")]
    #[sqlx(rename = "ott")]
    pub availability: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_mood_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mood_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_original_language(mut self, language: impl Into<String>) -> Self {
        self.original_language = Some(language.into());
        self
    }

    /// Case-insensitive key used to detect duplicate titles
    pub fn title_key(&self) -> String {
        self.title.trim().to_lowercase()
    }

    /// Whether the movie is available in `language` (already lower-cased)
    ///
    /// Entries such as "Swedish/Danish" match each of their parts.
    pub fn speaks(&self, language: &str) -> bool {
        self.languages.iter().any(|entry| {
            entry
                .split('/')
                .any(|part| part.trim().to_lowercase() == language)
        })
    }

    /// Whether `language` (already lower-cased) is the movie's original language
    pub fn is_native_in(&self, language: &str) -> bool {
        self.original_language
            .as_deref()
            .is_some_and(|native| native.trim().to_lowercase() == language)
    }
}
