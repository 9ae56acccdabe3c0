use std::collections::HashSet;

use super::scoring::{score, Score, ScoringWeights};
use crate::models::{MatchType, Movie, Signals};

/// A movie paired with its score for the duration of one ranking pass
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Position in the catalog snapshot, used to break ties
    pub index: usize,
    pub score: Score,
    pub movie: &'a Movie,
}

/// Scores every movie of the snapshot, skipping entries without a usable title
pub fn score_all<'a>(
    movies: &'a [Movie],
    signals: &Signals,
    weights: &ScoringWeights,
) -> Vec<Candidate<'a>> {
    movies
        .iter()
        .enumerate()
        .filter(|(_, movie)| {
            let usable = !movie.title.trim().is_empty();
            if !usable {
                tracing::debug!("Skipping catalog entry without a title");
            }
            usable
        })
        .map(|(index, movie)| Candidate {
            index,
            score: score(movie, signals, weights),
            movie,
        })
        .collect()
}

/// Orders candidates by descending score, drops repeated titles and keeps the first `limit`
///
/// Ties keep catalog order. The first occurrence of a title in sorted order wins.
pub fn select_top<'a, I>(candidates: I, limit: usize) -> Vec<Candidate<'a>>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let mut sorted: Vec<Candidate<'a>> = candidates.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.score
            .points
            .cmp(&a.score.points)
            .then(a.index.cmp(&b.index))
    });

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|candidate| seen.insert(candidate.movie.title_key()))
        .take(limit)
        .collect()
}

/// Primary pass: only candidates with a positive score that were not hard-excluded
pub fn primary<'a>(candidates: &[Candidate<'a>], limit: usize) -> Vec<Candidate<'a>> {
    select_top(
        candidates.iter().copied().filter(|c| c.score.is_positive()),
        limit,
    )
}

/// Classifies a ranked list by the score of its first entry
pub fn classify(ranked: &[Candidate<'_>], strong_match: i64) -> MatchType {
    match ranked.first() {
        None => MatchType::None,
        Some(top) if top.score.points >= strong_match => MatchType::Exact,
        Some(_) => MatchType::Related,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;

    fn candidate(index: usize, points: i64, movie: &Movie) -> Candidate<'_> {
        Candidate {
            index,
            score: Score {
                points,
                hard_excluded: false,
            },
            movie,
        }
    }

    fn titles(ranked: &[Candidate<'_>]) -> Vec<String> {
        ranked.iter().map(|c| c.movie.title.clone()).collect()
    }

    #[test]
    fn test_select_top_sorts_descending() {
        let a = Movie::new("A");
        let b = Movie::new("B");
        let c = Movie::new("C");

        let ranked = select_top(
            vec![candidate(0, 1, &a), candidate(1, 9, &b), candidate(2, 5, &c)],
            10,
        );
        assert_eq!(titles(&ranked), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_select_top_keeps_catalog_order_on_ties() {
        let a = Movie::new("A");
        let b = Movie::new("B");
        let c = Movie::new("C");

        let ranked = select_top(
            vec![candidate(2, 4, &c), candidate(0, 4, &a), candidate(1, 4, &b)],
            10,
        );
        assert_eq!(titles(&ranked), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_select_top_drops_duplicate_titles() {
        let first = Movie::new("Dangal").with_genre("Drama");
        let second = Movie::new("dangal ").with_genre("Sports");
        let other = Movie::new("Lagaan");

        let ranked = select_top(
            vec![
                candidate(0, 3, &first),
                candidate(1, 8, &second),
                candidate(2, 5, &other),
            ],
            10,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].movie.genre.as_deref(), Some("Sports"));
        assert_eq!(ranked[1].movie.title, "Lagaan");
    }

    #[test]
    fn test_select_top_truncates_after_dedup() {
        let movies: Vec<Movie> = ["A", "A", "B", "C"].iter().map(|t| Movie::new(*t)).collect();
        let candidates: Vec<Candidate<'_>> = movies
            .iter()
            .enumerate()
            .map(|(i, m)| candidate(i, 10 - i as i64, m))
            .collect();

        let ranked = select_top(candidates, 2);
        assert_eq!(titles(&ranked), vec!["A", "B"]);
    }

    #[test]
    fn test_primary_filters_non_positive_and_excluded() {
        let good = Movie::new("Good");
        let zero = Movie::new("Zero");
        let banned = Movie::new("Banned");

        let mut excluded = candidate(2, 50, &banned);
        excluded.score.hard_excluded = true;

        let ranked = primary(
            &[candidate(0, 2, &good), candidate(1, 0, &zero), excluded],
            10,
        );
        assert_eq!(titles(&ranked), vec!["Good"]);
    }

    #[test]
    fn test_score_all_skips_blank_titles() {
        let movies = vec![Movie::new("  "), Movie::new("Akira")];
        let signals = Signals {
            keywords: vec![Term::new("akira")],
            ..Default::default()
        };

        let candidates = score_all(&movies, &signals, &ScoringWeights::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, 1);
        assert!(candidates[0].score.is_positive());
    }

    #[test]
    fn test_classify_boundaries() {
        let movie = Movie::new("A");
        assert_eq!(classify(&[], 4), MatchType::None);
        assert_eq!(classify(&[candidate(0, 3, &movie)], 4), MatchType::Related);
        assert_eq!(classify(&[candidate(0, 4, &movie)], 4), MatchType::Exact);
    }
}
