/// Best-effort streaming availability enrichment
///
/// Lookups for the displayed movies run concurrently, bounded by a semaphore. Each lookup has
/// its own timeout and the whole enrichment has a deadline; whatever has not finished by then
/// is aborted and keeps the availability it already had.
use crate::{models::Movie, services::providers::AvailabilityProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::Semaphore,
    task::JoinSet,
    time::{timeout, timeout_at, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentSettings {
    /// Maximum lookups in flight
    pub concurrency: usize,
    pub lookup_timeout: Duration,
    /// Budget for the whole enrichment
    pub deadline: Duration,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            concurrency: 6,
            lookup_timeout: Duration::from_millis(3000),
            deadline: Duration::from_millis(5000),
        }
    }
}

/// What happened to the lookups of one enrichment run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub requested: usize,
    /// Movies whose availability was overwritten
    pub enriched: usize,
    /// Lookups that succeeded but did not know the title
    pub unknown: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Lookups cut off by the deadline
    pub abandoned: usize,
}

enum Outcome {
    Found(String),
    Unknown,
    Failed,
    TimedOut,
}

/// Fills in `availability` for every movie with a non-blank title
///
/// Only a successful lookup that knows the title overwrites the field; failures, timeouts
/// and unknown titles leave it as it was. Never fails.
pub async fn enrich_availability(
    provider: Arc<dyn AvailabilityProvider>,
    movies: &mut [Movie],
    settings: &EnrichmentSettings,
) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let lookup_timeout = settings.lookup_timeout;
    let deadline = Instant::now() + settings.deadline;

    let mut tasks = JoinSet::new();
    for (index, movie) in movies.iter().enumerate() {
        if movie.title.trim().is_empty() {
            continue;
        }

        report.requested += 1;
        let provider = provider.clone();
        let semaphore = semaphore.clone();
        let title = movie.title.clone();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (index, Outcome::Failed);
            };

            let outcome = match timeout(lookup_timeout, provider.lookup(&title)).await {
                Ok(Ok(Some(summary))) => Outcome::Found(summary),
                Ok(Ok(None)) => Outcome::Unknown,
                Ok(Err(e)) => {
                    tracing::warn!(
                        error = %e,
                        title = %title,
                        provider = provider.name(),
                        "Availability lookup failed"
                    );
                    Outcome::Failed
                }
                Err(_) => {
                    tracing::warn!(
                        title = %title,
                        provider = provider.name(),
                        timeout_ms = lookup_timeout.as_millis() as u64,
                        "Availability lookup timed out"
                    );
                    Outcome::TimedOut
                }
            };

            (index, outcome)
        });
    }

    loop {
        match timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok((index, outcome)))) => match outcome {
                Outcome::Found(summary) => {
                    movies[index].availability = Some(summary);
                    report.enriched += 1;
                }
                Outcome::Unknown => report.unknown += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::TimedOut => report.timed_out += 1,
            },
            Ok(Some(Err(e))) => {
                tracing::error!(error = %e, "Availability task join error");
                report.failed += 1;
            }
            Ok(None) => break,
            Err(_) => {
                report.abandoned = tasks.len();
                tasks.abort_all();
                tracing::warn!(
                    abandoned = report.abandoned,
                    deadline_ms = settings.deadline.as_millis() as u64,
                    "Availability enrichment deadline reached"
                );
                break;
            }
        }
    }

    tracing::debug!(
        provider = provider.name(),
        requested = report.requested,
        enriched = report.enriched,
        unknown = report.unknown,
        failed = report.failed,
        timed_out = report.timed_out,
        abandoned = report.abandoned,
        "Availability enrichment finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider whose behavior is chosen by title
    ///
    /// "slow*" titles sleep for a minute, "broken*" titles fail, "unknown*" titles are not
    /// found, everything else streams on "Netflix".
    #[derive(Default)]
    struct ScriptedProvider {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AvailabilityProvider for ScriptedProvider {
        async fn lookup(&self, title: &str) -> AppResult<Option<String>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;

            let result = if title.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Some("Too Late".to_string()))
            } else if title.starts_with("broken") {
                Err(AppError::ExternalApi("boom".to_string()))
            } else if title.starts_with("unknown") {
                Ok(None)
            } else {
                Ok(Some("Netflix".to_string()))
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn movies(titles: &[&str]) -> Vec<Movie> {
        titles
            .iter()
            .map(|t| {
                let mut movie = Movie::new(*t);
                movie.availability = Some("Seed".to_string());
                movie
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_lookups_overwrite_availability() {
        let mut list = movies(&["RRR", "Oldboy"]);
        let report = enrich_availability(
            Arc::new(ScriptedProvider::default()),
            &mut list,
            &EnrichmentSettings::default(),
        )
        .await;

        assert_eq!(report.enriched, 2);
        assert!(list.iter().all(|m| m.availability.as_deref() == Some("Netflix")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_keep_previous_availability() {
        let mut list = movies(&["broken one", "unknown two", "Akira"]);
        let report = enrich_availability(
            Arc::new(ScriptedProvider::default()),
            &mut list,
            &EnrichmentSettings::default(),
        )
        .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.unknown, 1);
        assert_eq!(list[0].availability.as_deref(), Some("Seed"));
        assert_eq!(list[1].availability.as_deref(), Some("Seed"));
        assert_eq!(list[2].availability.as_deref(), Some("Netflix"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out_alone() {
        let mut list = movies(&["slow movie", "Kantara"]);
        let report = enrich_availability(
            Arc::new(ScriptedProvider::default()),
            &mut list,
            &EnrichmentSettings {
                concurrency: 2,
                lookup_timeout: Duration::from_secs(1),
                deadline: Duration::from_secs(5),
            },
        )
        .await;

        assert_eq!(report.timed_out, 1);
        assert_eq!(list[0].availability.as_deref(), Some("Seed"));
        assert_eq!(list[1].availability.as_deref(), Some("Netflix"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_abandons_pending_lookups() {
        let mut list = movies(&["slow a", "slow b", "Mother"]);
        let started = Instant::now();
        let report = enrich_availability(
            Arc::new(ScriptedProvider::default()),
            &mut list,
            &EnrichmentSettings {
                concurrency: 3,
                lookup_timeout: Duration::from_secs(30),
                deadline: Duration::from_secs(2),
            },
        )
        .await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(report.abandoned, 2);
        assert_eq!(report.enriched, 1);
        assert_eq!(list[0].availability.as_deref(), Some("Seed"));
        assert_eq!(list[2].availability.as_deref(), Some("Netflix"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let provider = Arc::new(ScriptedProvider::default());
        let titles: Vec<String> = (0..12).map(|i| format!("Movie {}", i)).collect();
        let mut list: Vec<Movie> = titles.iter().map(Movie::new).collect();

        let report = enrich_availability(
            provider.clone(),
            &mut list,
            &EnrichmentSettings {
                concurrency: 3,
                ..EnrichmentSettings::default()
            },
        )
        .await;

        assert_eq!(report.enriched, 12);
        assert!(provider.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_blank_titles_are_not_looked_up() {
        let mut provider = crate::services::providers::MockAvailabilityProvider::new();
        provider.expect_lookup().never();
        provider.expect_name().return_const("mock");

        let mut list = vec![Movie::new("  ")];
        let report = enrich_availability(
            Arc::new(provider),
            &mut list,
            &EnrichmentSettings::default(),
        )
        .await;

        assert_eq!(report.requested, 0);
        assert_eq!(list[0].availability, None);
    }
}
