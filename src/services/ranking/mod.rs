/// Deterministic mood ranking engine
///
/// Signals are normalized once, every movie of the catalog snapshot is scored, and the
/// scored set is ranked in a primary pass (positive scores only). When that pass is empty
/// a best-effort pass relaxes the score filter, never the language hard exclusion.
use crate::models::{MatchType, Movie, Signals};

mod fallback;
mod normalize;
mod ranker;
mod scoring;

pub use normalize::normalize;
pub use scoring::{score, Score, ScoringWeights};

/// Output of one ranking pass
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub movies: Vec<Movie>,
    pub match_type: MatchType,
    /// True when the list came from the best-effort pass
    pub fallback_used: bool,
}

#[derive(Debug, Clone)]
pub struct RankingEngine {
    weights: ScoringWeights,
    max_results: usize,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(ScoringWeights::default(), 10)
    }
}

impl RankingEngine {
    pub fn new(weights: ScoringWeights, max_results: usize) -> Self {
        Self {
            weights,
            max_results,
        }
    }

    /// Ranks a catalog snapshot against normalized signals
    pub fn rank(&self, movies: &[Movie], signals: &Signals) -> Ranking {
        let candidates = ranker::score_all(movies, signals, &self.weights);
        let excluded = candidates.iter().filter(|c| c.score.hard_excluded).count();

        let mut ranked = ranker::primary(&candidates, self.max_results);
        let mut fallback_used = false;

        if ranked.is_empty() {
            ranked = fallback::best_effort(&candidates, self.max_results);
            fallback_used = !ranked.is_empty();
        }

        let match_type = ranker::classify(&ranked, self.weights.strong_match);

        tracing::debug!(
            catalog = movies.len(),
            scored = candidates.len(),
            excluded = excluded,
            ranked = ranked.len(),
            top_score = ranked.first().map(|c| c.score.points),
            fallback = fallback_used,
            match_type = %match_type,
            "Ranking pass completed"
        );

        Ranking {
            movies: ranked.into_iter().map(|c| c.movie.clone()).collect(),
            match_type,
            fallback_used,
        }
    }
}
