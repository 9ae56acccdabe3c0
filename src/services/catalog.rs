/// Catalog Store abstraction
///
/// The ranking pipeline only ever sees a snapshot of the catalog. Stores are injected into
/// the application state so that tests can substitute a fixed in-memory catalog.
use crate::{error::AppResult, models::Movie};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::RwLock;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns every movie in catalog order as one consistent read
    async fn snapshot(&self) -> AppResult<Vec<Movie>>;

    /// Whether any movie's genre contains `genre` (case-insensitive), optionally
    /// restricted to movies available in `language`
    async fn has_match(&self, genre: &str, language: Option<String>) -> AppResult<bool>;

    /// Adds movies whose titles are not in the catalog yet, returning how many were added
    async fn insert(&self, movies: &[Movie]) -> AppResult<usize>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

fn genre_matches(movie: &Movie, genre: &str) -> bool {
    movie
        .genre
        .as_deref()
        .is_some_and(|g| g.to_lowercase().contains(&genre.to_lowercase()))
}

/// Catalog kept in process memory, seeded from JSON
#[derive(Debug)]
pub struct InMemoryCatalogStore {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryCatalogStore {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies: RwLock::new(movies),
        }
    }

    /// Loads the catalog from a JSON array of movies
    pub async fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read seed file {}: {}", path.display(), e))?;
        let movies: Vec<Movie> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid seed file {}: {}", path.display(), e))?;

        tracing::info!(path = %path.display(), movies = movies.len(), "Loaded seed catalog");

        Ok(Self::new(movies))
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn snapshot(&self) -> AppResult<Vec<Movie>> {
        Ok(self.movies.read().await.clone())
    }

    async fn has_match(&self, genre: &str, language: Option<String>) -> AppResult<bool> {
        let language = language.map(|l| l.trim().to_lowercase());
        let movies = self.movies.read().await;

        Ok(movies.iter().any(|movie| {
            genre_matches(movie, genre)
                && language.as_deref().map_or(true, |l| movie.speaks(l))
        }))
    }

    async fn insert(&self, new_movies: &[Movie]) -> AppResult<usize> {
        let mut movies = self.movies.write().await;
        let mut titles: HashSet<String> = movies.iter().map(Movie::title_key).collect();

        let mut added = 0;
        for movie in new_movies {
            if movie.title.trim().is_empty() || !titles.insert(movie.title_key()) {
                continue;
            }
            movies.push(movie.clone());
            added += 1;
        }

        Ok(added)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Catalog backed by the `movies` table
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so user-provided genres match literally
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn snapshot(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT title, genre, mood_tags, description, languages, original_language, ott, poster_url
            FROM movies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }

    async fn has_match(&self, genre: &str, language: Option<String>) -> AppResult<bool> {
        let pattern = format!("%{}%", escape_like(genre.trim()));

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM movies
                WHERE genre ILIKE $1
                  AND ($2::text IS NULL
                       OR EXISTS (SELECT 1 FROM unnest(languages) AS l WHERE lower(l) = lower($2)))
            )
            "#,
        )
        .bind(pattern)
        .bind(language)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, movies: &[Movie]) -> AppResult<usize> {
        let movies: Vec<&Movie> = movies
            .iter()
            .filter(|m| !m.title.trim().is_empty())
            .collect();
        if movies.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO movies (title, genre, mood_tags, description, languages, original_language, ott, poster_url) ",
        );
        builder.push_values(movies, |mut row, movie| {
            row.push_bind(movie.title.clone())
                .push_bind(movie.genre.clone())
                .push_bind(movie.mood_tags.clone())
                .push_bind(movie.description.clone())
                .push_bind(movie.languages.clone())
                .push_bind(movie.original_language.clone())
                .push_bind(movie.availability.clone())
                .push_bind(movie.poster_url.clone());
        });
        builder.push(" ON CONFLICT (title) DO NOTHING");

        let result = builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected() as usize)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryCatalogStore {
        InMemoryCatalogStore::new(vec![
            Movie::new("Oldboy")
                .with_genre("Thriller")
                .with_languages(["Korean"]),
            Movie::new("Kantara")
                .with_genre("Action/Thriller")
                .with_languages(["Kannada", "Hindi"]),
            Movie::new("Akira").with_genre("Animation"),
        ])
    }

    #[tokio::test]
    async fn test_snapshot_preserves_catalog_order() {
        let titles: Vec<String> = store()
            .snapshot()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Oldboy", "Kantara", "Akira"]);
    }

    #[tokio::test]
    async fn test_has_match_by_genre_substring() {
        let store = store();
        assert!(store.has_match("thriller", None).await.unwrap());
        assert!(store.has_match("ANIMATION", None).await.unwrap());
        assert!(!store.has_match("Horror", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_has_match_respects_language() {
        let store = store();
        assert!(store
            .has_match("Thriller", Some("Hindi".to_string()))
            .await
            .unwrap());
        assert!(!store
            .has_match("Thriller", Some("Telugu".to_string()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_insert_skips_existing_and_blank_titles() {
        let store = store();
        let added = store
            .insert(&[
                Movie::new("oldboy"),
                Movie::new(""),
                Movie::new("Train to Busan").with_genre("Horror"),
                Movie::new("Train to Busan"),
            ])
            .await
            .unwrap();

        assert_eq!(added, 1);
        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot[3].genre.as_deref(), Some("Horror"));
    }

    #[tokio::test]
    async fn test_from_json_file_loads_bundled_seed() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/movies.json");
        let store = tokio_test::assert_ok!(InMemoryCatalogStore::from_json_file(path).await);

        let snapshot = store.snapshot().await.unwrap();
        assert!(!snapshot.is_empty());
        assert!(snapshot.iter().all(|m| !m.title.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_from_json_file_reports_missing_file() {
        let result = InMemoryCatalogStore::from_json_file("/nonexistent/movies.json").await;
        tokio_test::assert_err!(result);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_pure\\"), "100\\%\\_pure\\\\");
        assert_eq!(escape_like("Sci-Fi"), "Sci-Fi");
    }
}
