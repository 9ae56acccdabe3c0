use super::ranker::{select_top, Candidate};

/// Best-effort selection used when the primary pass comes back empty
///
/// Accepts any score, including zero and negative ones, but never a hard-excluded
/// candidate. An all-excluded snapshot yields an empty list.
pub fn best_effort<'a>(candidates: &[Candidate<'a>], limit: usize) -> Vec<Candidate<'a>> {
    select_top(
        candidates
            .iter()
            .copied()
            .filter(|c| !c.score.hard_excluded),
        limit,
    )
}
