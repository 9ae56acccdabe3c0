/// Streaming availability providers
///
/// Availability is enrichment only: a provider answers with a short human-readable summary of
/// where a title streams, and the recommendation flow treats every failure as "unknown".
use crate::error::AppResult;

pub mod watchmode;

pub use watchmode::WatchmodeProvider;

/// Summary reported when a title is found but no subscription service carries it
pub const NOT_STREAMING: &str = "Not Streaming";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Looks a title up by name
    ///
    /// Returns `Ok(None)` when the provider does not know the title, otherwise a summary such
    /// as "Netflix, Prime Video" or [`NOT_STREAMING`].
    async fn lookup(&self, title: &str) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
