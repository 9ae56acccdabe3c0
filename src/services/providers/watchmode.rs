/// Watchmode API provider
///
/// API Flow:
/// 1. Title Search: /v1/search/ by name, restricted to movies → first result's Watchmode ID
/// 2. Sources: /v1/title/{watchmode_id}/sources/ → every source carrying the title
///
/// Only subscription ("sub") sources count towards the summary.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{AvailabilityRecord, WatchmodeSearchResponse, WatchmodeSource},
    services::providers::{AvailabilityProvider, NOT_STREAMING},
};
use chrono::Utc;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

const ID_CACHE_TTL: u64 = 2_592_000; // 30 days
const AVAIL_CACHE_TTL: u64 = 604_800; // 1 week
const MAX_SERVICES: usize = 3;

#[derive(Clone)]
pub struct WatchmodeProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl WatchmodeProvider {
    pub fn new(cache: Option<Cache>, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Watchmode API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize Watchmode response"
            );
            AppError::ExternalApi(format!("Failed to parse Watchmode response: {}", e))
        })
    }

    /// Resolves a movie title to its Watchmode ID, `None` when the search has no results
    ///
    /// Only resolved IDs are cached; a title the search does not know is searched again on
    /// the next lookup.
    async fn find_title_id(&self, title: &str) -> AppResult<Option<u64>> {
        let key = CacheKey::WatchmodeId(title.to_string());

        if let Some(cache) = &self.cache {
            match cache.get_from_cache::<u64>(&key).await {
                Ok(Some(watchmode_id)) => return Ok(Some(watchmode_id)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                }
            }
        }

        let url = format!("{}/v1/search/", self.api_url);
        let search: WatchmodeSearchResponse = self
            .get_json(
                &url,
                &[
                    ("search_field", "name"),
                    ("search_value", title),
                    ("types", "movie"),
                ],
            )
            .await?;

        let watchmode_id = search.title_results.first().map(|r| r.id);
        if let (Some(cache), Some(watchmode_id)) = (&self.cache, watchmode_id) {
            cache.set_in_background(&key, &watchmode_id, ID_CACHE_TTL);
        }

        Ok(watchmode_id)
    }

    async fn fetch_sources(&self, watchmode_id: u64) -> AppResult<Vec<WatchmodeSource>> {
        let url = format!("{}/v1/title/{}/sources/", self.api_url, watchmode_id);
        self.get_json(&url, &[]).await
    }
}

/// Summarizes sources as up to three distinct subscription service names
///
/// Names keep the order the provider listed them in. A title with sources but no subscription
/// source is [`NOT_STREAMING`]; a title without any source has no summary.
pub fn summarize_sources(sources: &[WatchmodeSource]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }

    let mut seen = HashSet::new();
    let names: Vec<&str> = sources
        .iter()
        .filter(|s| s.source_type == "sub")
        .map(|s| s.name.as_str())
        .filter(|name| seen.insert(*name))
        .take(MAX_SERVICES)
        .collect();

    if names.is_empty() {
        Some(NOT_STREAMING.to_string())
    } else {
        Some(names.join(", "))
    }
}

#[async_trait::async_trait]
impl AvailabilityProvider for WatchmodeProvider {
    async fn lookup(&self, title: &str) -> AppResult<Option<String>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput(
                "Title cannot be empty".to_string(),
            ));
        }

        let record: AvailabilityRecord = cached!(
            self.cache.as_ref(),
            CacheKey::Availability(title.to_string()),
            AVAIL_CACHE_TTL,
            async move {
                let summary = match self.find_title_id(title).await? {
                    Some(watchmode_id) => {
                        let sources = self.fetch_sources(watchmode_id).await?;
                        let summary = summarize_sources(&sources);
                        tracing::info!(
                            title = %title,
                            watchmode_id = watchmode_id,
                            sources = sources.len(),
                            summary = ?summary,
                            provider = "watchmode",
                            "Availability fetched"
                        );
                        summary
                    }
                    None => {
                        tracing::debug!(title = %title, provider = "watchmode", "Title not found");
                        None
                    }
                };

                Ok::<_, AppError>(AvailabilityRecord {
                    summary,
                    cached_at: Utc::now(),
                })
            }
        )?;

        Ok(record.summary)
    }

    fn name(&self) -> &'static str {
        "watchmode"
    }
}
