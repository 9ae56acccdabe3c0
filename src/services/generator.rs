use serde::Deserialize;
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{ChatMessage, Movie},
    services::llm::GroqClient,
};

const MOVIES_PER_REQUEST: usize = 5;

/// Manufactures catalog entries for a genre (and language) the catalog has nothing for
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentGenerator: Send + Sync {
    /// `language` is `None` when any language is acceptable
    async fn generate(&self, genre: &str, language: Option<String>) -> AppResult<Vec<Movie>>;

    /// Generator name for logging
    fn name(&self) -> &'static str;
}

/// Movie as described by the model; every field is optional and loosely typed
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratedMovie {
    title: Option<String>,
    description: Option<String>,
    mood_tags: Option<Vec<String>>,
    languages: Option<Vec<String>>,
    original_language: Option<String>,
    poster_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratedMovies {
    movies: Vec<serde_json::Value>,
}

/// Content generator backed by a Groq-hosted model
#[derive(Clone)]
pub struct GroqGenerator {
    client: GroqClient,
}

impl GroqGenerator {
    pub fn new(client: GroqClient) -> Self {
        Self { client }
    }

    fn prompt(genre: &str, language: Option<&str>) -> String {
        let language_clause = language
            .map(|l| format!(" in the {} language", l))
            .unwrap_or_default();
        format!(
            "Generate {MOVIES_PER_REQUEST} high-quality, real {genre} movies{language_clause}. \
             Fields: title, description, genre, mood_tags (list of 3 words), languages (list of all \
             languages the movie is released in), original_language, poster_url (use placeholder \
             https://placehold.co/600x900?text=Movie). Return a JSON object with a 'movies' list."
        )
    }
}

/// Turns loosely-typed model output into movies of the requested genre
///
/// Entries that fail to parse or have no title are dropped. The genre is forced to the
/// requested one and the requested language is added when missing.
fn conform(raw: Vec<serde_json::Value>, genre: &str, language: Option<&str>) -> Vec<Movie> {
    raw.into_iter()
        .filter_map(|value| serde_json::from_value::<GeneratedMovie>(value).ok())
        .filter_map(|generated| {
            let title = generated.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }

            let mut movie = Movie {
                title,
                genre: Some(genre.to_string()),
                mood_tags: generated.mood_tags.unwrap_or_default(),
                description: generated.description,
                languages: generated.languages.unwrap_or_default(),
                original_language: generated.original_language,
                availability: None,
                poster_url: generated.poster_url,
            };

            if let Some(language) = language {
                if !movie.speaks(&language.to_lowercase()) {
                    movie.languages.push(language.to_string());
                }
            }

            Some(movie)
        })
        .collect()
}

#[async_trait::async_trait]
impl ContentGenerator for GroqGenerator {
    async fn generate(&self, genre: &str, language: Option<String>) -> AppResult<Vec<Movie>> {
        let value = self
            .client
            .complete_json(vec![ChatMessage::user(Self::prompt(genre, language.as_deref()))])
            .await?;

        let generated: GeneratedMovies = serde_json::from_value(value).map_err(|e| {
            AppError::ExternalApi(format!("Unexpected generator output: {}", e))
        })?;

        let movies = conform(generated.movies, genre, language.as_deref());
        tracing::info!(
            genre = %genre,
            language = ?language,
            generated = movies.len(),
            "Generated movies on demand"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

/// Appends freshly generated movies to a catalog snapshot
///
/// Generated movies keep their generation order and land after the existing catalog; a title
/// already in the snapshot (ignoring case) is skipped. Returns how many were appended.
pub fn merge_generated(snapshot: &mut Vec<Movie>, generated: &[Movie]) -> usize {
    let mut titles: HashSet<String> = snapshot.iter().map(Movie::title_key).collect();
    let before = snapshot.len();

    snapshot.extend(
        generated
            .iter()
            .filter(|movie| !movie.title.trim().is_empty())
            .filter(|movie| titles.insert(movie.title_key()))
            .cloned(),
    );

    snapshot.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_conform_forces_genre_and_language() {
        let raw = vec![
            json!({"title": "Ong-Bak", "genre": "Martial Arts", "languages": ["Thai"], "mood_tags": ["fast"]}),
            json!({"title": "  ", "genre": "Action"}),
            json!({"description": "no title at all"}),
            json!({"title": "The Raid", "languages": ["Indonesian", "thai"]}),
            json!("not an object"),
        ];

        let movies = conform(raw, "Action", Some("Thai"));

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Ong-Bak");
        assert_eq!(movies[0].genre.as_deref(), Some("Action"));
        assert_eq!(movies[0].languages, vec!["Thai".to_string()]);
        assert_eq!(
            movies[1].languages,
            vec!["Indonesian".to_string(), "thai".to_string()]
        );
    }

    #[test]
    fn test_conform_adds_missing_language() {
        let movies = conform(vec![json!({"title": "Vikram"})], "Action", Some("Tamil"));
        assert_eq!(movies[0].languages, vec!["Tamil".to_string()]);
        assert_eq!(movies[0].availability, None);
    }

    #[test]
    fn test_conform_without_language_keeps_languages() {
        let movies = conform(vec![json!({"title": "Heat", "languages": []})], "Crime", None);
        assert!(movies[0].languages.is_empty());
    }

    #[test]
    fn test_merge_appends_new_titles_in_order() {
        let mut snapshot = vec![Movie::new("Oldboy")];
        let added = merge_generated(
            &mut snapshot,
            &[Movie::new("Memories of Murder"), Movie::new("The Chaser")],
        );

        assert_eq!(added, 2);
        let titles: Vec<&str> = snapshot.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Oldboy", "Memories of Murder", "The Chaser"]);
    }

    #[test]
    fn test_merge_skips_known_and_repeated_titles() {
        let mut snapshot = vec![Movie::new("Oldboy")];
        let added = merge_generated(
            &mut snapshot,
            &[
                Movie::new("OLDBOY"),
                Movie::new("Mother"),
                Movie::new("mother"),
                Movie::new(""),
            ],
        );

        assert_eq!(added, 1);
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_groq_generator_parses_movies() {
        let server = MockServer::start().await;
        let content = json!({
            "movies": [
                {"title": "Train to Busan", "genre": "Zombie", "languages": ["Korean"], "mood_tags": ["tense"]},
                {"title": "The Host", "languages": ["Korean"]}
            ]
        })
        .to_string();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;

        let client = GroqClient::new("key".to_string(), server.uri(), "model".to_string()).unwrap();
        let movies = GroqGenerator::new(client)
            .generate("Horror", Some("Korean".to_string()))
            .await
            .unwrap();

        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|m| m.genre.as_deref() == Some("Horror")));
        assert!(movies.iter().all(|m| m.speaks("korean")));
    }

    #[tokio::test]
    async fn test_groq_generator_rejects_wrong_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"movies\": \"none\"}"}}]
            })))
            .mount(&server)
            .await;

        let client = GroqClient::new("key".to_string(), server.uri(), "model".to_string()).unwrap();
        let result = GroqGenerator::new(client).generate("Horror", None).await;

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
