use crate::{
    error::AppResult,
    models::{ChatMessage, RawSignals},
    services::llm::GroqClient,
};

const SYSTEM_PROMPT: &str = "You are a movie expert. Return strictly JSON.";

/// Turns a free-text mood into best-effort signals
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MoodInterpreter: Send + Sync {
    async fn interpret(&self, mood: &str) -> AppResult<RawSignals>;

    /// Interpreter name for logging
    fn name(&self) -> &'static str;
}

/// Mood interpreter backed by a Groq-hosted model
#[derive(Clone)]
pub struct GroqInterpreter {
    client: GroqClient,
}

impl GroqInterpreter {
    pub fn new(client: GroqClient) -> Self {
        Self { client }
    }

    fn prompt(mood: &str) -> String {
        format!(
            r#"Analyze the user mood: "{mood}".
Return a JSON object with:
1. "target_genre": The single most dominant movie genre needed (e.g. Horror, Comedy, Sci-Fi, Romance). If ambiguous or mixed, use "General".
2. "keywords": list of 3-5 specific adjective keywords.
3. "target_language": The language the user asked for (e.g. English, Hindi, Telugu, Korean). If none was mentioned, use "Any".
4. "search_term": A single best 1-2 word search phrase.

Example output: {{ "target_genre": "Horror", "keywords": ["scary", "dark"], "target_language": "Any", "search_term": "horror" }}"#
        )
    }
}

#[async_trait::async_trait]
impl MoodInterpreter for GroqInterpreter {
    async fn interpret(&self, mood: &str) -> AppResult<RawSignals> {
        let value = self
            .client
            .complete_json(vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(Self::prompt(mood)),
            ])
            .await?;

        let signals = RawSignals::from_value(&value);
        tracing::info!(
            target_genre = ?signals.target_genre,
            keywords = ?signals.keywords,
            target_language = ?signals.target_language,
            "Mood interpreted"
        );

        Ok(signals)
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

/// Interprets a mood, degrading to the raw query tokens when the interpreter is missing,
/// fails, or returns no usable keywords
///
/// A failed interpretation yields no genre or language preference. A successful one without
/// keywords keeps its genre and language.
pub async fn interpret_mood(interpreter: Option<&dyn MoodInterpreter>, mood: &str) -> RawSignals {
    let Some(interpreter) = interpreter else {
        return RawSignals::from_query(mood);
    };

    match interpreter.interpret(mood).await {
        Ok(signals) if signals.has_keywords() => signals,
        Ok(signals) => {
            tracing::debug!(interpreter = interpreter.name(), "No keywords interpreted, using query tokens");
            RawSignals {
                keywords: RawSignals::from_query(mood).keywords,
                ..signals
            }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                interpreter = interpreter.name(),
                "Mood interpretation failed, using query tokens"
            );
            RawSignals::from_query(mood)
        }
    }
}
