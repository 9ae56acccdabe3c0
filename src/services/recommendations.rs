use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, RecommendResponse, Signals},
    services::{
        catalog::CatalogStore,
        enrichment::{enrich_availability, EnrichmentSettings},
        generator::{merge_generated, ContentGenerator},
        interpreter::{interpret_mood, MoodInterpreter},
        providers::AvailabilityProvider,
        ranking::{normalize, RankingEngine},
    },
};

const DEFAULT_DISPLAY_COUNT: usize = 6;

/// Mood-based movie recommendations
///
/// Only the Catalog Store is required. Every other collaborator is optional and degrades to a
/// default when missing or failing: raw query tokens instead of interpreted signals, no
/// generated content, no availability enrichment.
pub struct Recommender {
    store: Arc<dyn CatalogStore>,
    interpreter: Option<Arc<dyn MoodInterpreter>>,
    generator: Option<Arc<dyn ContentGenerator>>,
    availability: Option<Arc<dyn AvailabilityProvider>>,
    engine: RankingEngine,
    display_count: usize,
    enrichment: EnrichmentSettings,
}

/// Movies produced by on-demand generation
struct Generated {
    movies: Vec<Movie>,
    stored: usize,
}

impl Recommender {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            interpreter: None,
            generator: None,
            availability: None,
            engine: RankingEngine::default(),
            display_count: DEFAULT_DISPLAY_COUNT,
            enrichment: EnrichmentSettings::default(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn MoodInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_availability(mut self, provider: Arc<dyn AvailabilityProvider>) -> Self {
        self.availability = Some(provider);
        self
    }

    pub fn with_engine(mut self, engine: RankingEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_display_count(mut self, display_count: usize) -> Self {
        self.display_count = display_count;
        self
    }

    pub fn with_enrichment(mut self, enrichment: EnrichmentSettings) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Recommends movies for a free-text mood
    ///
    /// Fails only on an empty mood or a Catalog Store failure. A mood nothing matches is a
    /// successful response with `match_type` none.
    pub async fn recommend(&self, mood: &str) -> AppResult<RecommendResponse> {
        let mood = mood.trim();
        if mood.is_empty() {
            return Err(AppError::InvalidInput("Mood cannot be empty".to_string()));
        }

        let started = Instant::now();
        let raw = interpret_mood(self.interpreter.as_deref(), mood).await;
        let signals = normalize(raw);

        tracing::info!(
            keywords = ?signals.keyword_labels(),
            target_genre = %signals.genre_label(),
            target_language = %signals.language_label(),
            "Signals normalized"
        );

        let generated = self.generate_if_missing(&signals).await?;

        let mut snapshot = self.store.snapshot().await?;
        let merged = merge_generated(&mut snapshot, &generated.movies);

        let ranking = self.engine.rank(&snapshot, &signals);
        let mut movies = ranking.movies;
        movies.truncate(self.display_count);

        if let Some(provider) = &self.availability {
            enrich_availability(provider.clone(), &mut movies, &self.enrichment).await;
        }

        tracing::info!(
            catalog = snapshot.len(),
            results = movies.len(),
            match_type = %ranking.match_type,
            fallback = ranking.fallback_used,
            generated_stored = generated.stored,
            generated_merged = merged,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation completed"
        );

        Ok(RecommendResponse {
            movies,
            keywords_used: signals.keyword_labels(),
            match_type: ranking.match_type,
            generated_new: generated.stored + merged > 0,
            target_genre: signals.genre_label().to_string(),
            target_language: signals.language_label().to_string(),
            fallback_used: ranking.fallback_used,
        })
    }

    /// Generates and stores movies when the catalog has nothing for the target genre
    ///
    /// Generation and insert failures are logged and yield no movies; a failing
    /// `has_match` is a store failure and propagates.
    async fn generate_if_missing(&self, signals: &Signals) -> AppResult<Generated> {
        let none = Generated {
            movies: Vec::new(),
            stored: 0,
        };

        let (Some(generator), Some(genre)) = (&self.generator, &signals.genre) else {
            return Ok(none);
        };
        let language = signals.language.as_ref().map(|l| l.label.clone());

        if self.store.has_match(&genre.label, language.clone()).await? {
            return Ok(none);
        }

        tracing::info!(
            genre = %genre.label,
            language = ?language,
            generator = generator.name(),
            "No catalog match, generating movies"
        );

        let movies = match generator.generate(&genre.label, language).await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(error = %e, generator = generator.name(), "Content generation failed");
                return Ok(none);
            }
        };

        if movies.is_empty() {
            return Ok(none);
        }

        let stored = match self.store.insert(&movies).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, store = self.store.name(), "Failed to store generated movies");
                0
            }
        };

        Ok(Generated { movies, stored })
    }
}
