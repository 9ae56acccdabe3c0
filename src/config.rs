use serde::Deserialize;
use std::time::Duration;

use crate::services::{enrichment::EnrichmentSettings, ranking::ScoringWeights};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory catalog is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// JSON seed file for the in-memory catalog
    #[serde(default = "default_seed_path")]
    pub seed_path: String,

    /// Redis connection URL; availability lookups are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Groq API key; mood interpretation and on-demand generation are disabled when unset
    #[serde(default)]
    pub groq_api_key: Option<String>,

    /// Groq OpenAI-compatible API base URL
    #[serde(default = "default_groq_api_url")]
    pub groq_api_url: String,

    /// Groq chat model
    #[serde(default = "default_groq_model")]
    pub groq_model: String,

    /// Watchmode API key; availability enrichment is disabled when unset
    #[serde(default)]
    pub watchmode_api_key: Option<String>,

    /// Watchmode API base URL
    #[serde(default = "default_watchmode_api_url")]
    pub watchmode_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Size of the ranked list before display truncation
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Number of movies returned to the client
    #[serde(default = "default_display_count")]
    pub display_count: usize,

    /// Maximum number of availability lookups in flight
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,

    /// Timeout for a single availability lookup
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Deadline for the whole enrichment step
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,
}

fn default_seed_path() -> String {
    "data/movies.json".to_string()
}

fn default_groq_api_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_watchmode_api_url() -> String {
    "https://api.watchmode.com".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_results() -> usize {
    10
}

fn default_display_count() -> usize {
    6
}

fn default_enrichment_concurrency() -> usize {
    6
}

fn default_lookup_timeout_ms() -> u64 {
    3000
}

fn default_enrichment_timeout_ms() -> u64 {
    5000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load scoring weights from `SCORE_*` environment variables
    pub fn scoring_weights() -> anyhow::Result<ScoringWeights> {
        envy::prefixed("SCORE_")
            .from_env::<ScoringWeights>()
            .map_err(|e| anyhow::anyhow!("Failed to load scoring weights: {}", e))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }

    pub fn enrichment_settings(&self) -> EnrichmentSettings {
        EnrichmentSettings {
            concurrency: self.enrichment_concurrency,
            lookup_timeout: self.lookup_timeout(),
            deadline: self.enrichment_timeout(),
        }
    }
}
