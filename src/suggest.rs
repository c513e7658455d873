// Topic-based word list suggestions.
//
// The Gemini backend asks for a JSON array of Dutch words. Without an API
// key the built-in fallback list is used instead.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GeminiConfig;
use crate::error::SuggestError;
use crate::runtime::FlitsEvent;

pub const FALLBACK_WORDS: [&str; 5] = ["vis", "aap", "noot", "mies", "vuur"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub trait WordSuggester: Send + Sync {
    fn suggest(&self, topic: &str, count: usize) -> Result<Vec<String>, SuggestError>;
}

/// Used when no API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSuggester;

impl WordSuggester for FallbackSuggester {
    fn suggest(&self, topic: &str, _count: usize) -> Result<Vec<String>, SuggestError> {
        tracing::warn!(topic, "no API key configured, returning fallback words");
        Ok(FALLBACK_WORDS.iter().map(|w| w.to_string()).collect())
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSuggester {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiSuggester {
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, SuggestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl WordSuggester for GeminiSuggester {
    fn suggest(&self, topic: &str, count: usize) -> Result<Vec<String>, SuggestError> {
        tracing::info!(topic, count, model = %self.model, "requesting word suggestions");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(topic, count))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json()?;
        parse_response(body)
    }
}

/// Pick the backend from config: Gemini when a key resolves, fallback otherwise
pub fn suggester_from_config(config: &GeminiConfig) -> Arc<dyn WordSuggester> {
    match config.resolve_api_key() {
        Some(key) => match GeminiSuggester::new(config, key) {
            Ok(gemini) => Arc::new(gemini),
            Err(err) => {
                tracing::error!("unable to build suggestion client: {err}");
                Arc::new(FallbackSuggester)
            }
        },
        None => Arc::new(FallbackSuggester),
    }
}

/// Run one request on a worker thread; the result comes back as an event
pub fn spawn_suggestion(
    suggester: Arc<dyn WordSuggester>,
    topic: String,
    count: usize,
    tx: Sender<FlitsEvent>,
) {
    thread::spawn(move || {
        let result = suggester.suggest(&topic, count);
        if let Err(err) = &result {
            tracing::error!(topic = %topic, "word suggestion failed: {err}");
        }
        let _ = tx.send(FlitsEvent::Suggestions(result));
    });
}

pub fn prompt_for(topic: &str, count: usize) -> String {
    format!(
        "Genereer een lijst van {count} Nederlandse woorden die te maken hebben met het thema \"{topic}\". \
         De woorden moeten geschikt zijn voor basisschoolleerlingen (groep 3-8)."
    )
}

fn request_body(topic: &str, count: usize) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt_for(topic, count) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
        }
    })
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

fn parse_response(body: GenerateResponse) -> Result<Vec<String>, SuggestError> {
    let text = body
        .candidates
        .into_iter()
        .flat_map(|c| c.content.parts)
        .find_map(|p| p.text)
        .ok_or_else(|| SuggestError::Malformed("response has no text part".into()))?;

    let words: Vec<String> = serde_json::from_str(&text)
        .map_err(|err| SuggestError::Malformed(format!("expected a JSON array of strings: {err}")))?;

    Ok(words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect())
}
