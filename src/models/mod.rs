use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod movie;
mod signals;

pub use movie::Movie;
pub use signals::{RawSignals, Signals, Term, ANY_LANGUAGE, GENERAL_GENRE};

/// Coarse classification of result quality, derived from the top candidate's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Related,
    None,
}

impl Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::Related => write!(f, "related"),
            MatchType::None => write!(f, "none"),
        }
    }
}

/// Request body for the recommendation endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub mood: String,
}

/// Response body for the recommendation endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub movies: Vec<Movie>,
    pub keywords_used: Vec<String>,
    pub match_type: MatchType,
    pub generated_new: bool,
    pub target_genre: String,
    pub target_language: String,
    /// True when no movie scored above zero and best-effort results were returned
    pub fallback_used: bool,
}

// ============================================================================
// Chat Completion API Types (Groq, OpenAI-compatible)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

// ============================================================================
// Watchmode API Types
// ============================================================================

/// Watchmode search response
#[derive(Debug, Deserialize)]
pub struct WatchmodeSearchResponse {
    #[serde(default)]
    pub title_results: Vec<WatchmodeTitle>,
}

/// Watchmode search result
#[derive(Debug, Clone, Deserialize)]
pub struct WatchmodeTitle {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub title_type: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
}

/// Watchmode streaming source
#[derive(Debug, Deserialize)]
pub struct WatchmodeSource {
    pub source_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Availability summary for one title, as stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    /// Comma-separated subscription services, "Not Streaming", or `None` when unknown
    pub summary: Option<String>,
    pub cached_at: DateTime<Utc>,
}
