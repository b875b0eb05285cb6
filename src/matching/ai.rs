use crate::config::AiSettings;
use crate::constants::{
    AI_MAX_MATCHES, AI_MIN_CONFIDENCE, AI_PROMPT_MAX_ARTISTS, AI_PROMPT_MAX_EVENTS, OPENAI_API,
};
use crate::error::{Result, ScoutError};
use crate::types::{ArtistProfile, Event, Recommendation, RecommendationKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Model-assisted ranking capability. When the credential is absent the no-op
/// implementation is injected instead of branching on "is AI enabled"
/// throughout the core.
#[async_trait]
pub trait ConcertRanker: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Never fails: transport errors, malformed output and missing content all
    /// degrade to an empty tier.
    async fn rank(&self, top_artists: &[ArtistProfile], events: &[Arc<Event>]) -> Vec<Recommendation>;
}

pub struct NoopRanker;

#[async_trait]
impl ConcertRanker for NoopRanker {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn rank(&self, _: &[ArtistProfile], _: &[Arc<Event>]) -> Vec<Recommendation> {
        Vec::new()
    }
}

/// One entry of the constrained JSON array the model is asked for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiMatch {
    concert_name: String,
    reason: String,
    confidence: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Chat-completions backed ranker.
pub struct OpenAiRanker {
    client: reqwest::Client,
    api_key: String,
    settings: AiSettings,
    base_url: String,
}

impl OpenAiRanker {
    pub fn new(api_key: impl Into<String>, settings: AiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            settings,
            base_url: OPENAI_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a music expert. Return only valid JSON, no other text."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScoutError::Api { message: "empty completion".to_string() })
    }
}

/// Bounded prompt: at most 10 artist names and 20 candidate events.
fn build_prompt(top_artists: &[ArtistProfile], events: &[Arc<Event>]) -> String {
    let artist_names = top_artists
        .iter()
        .take(AI_PROMPT_MAX_ARTISTS)
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let concert_list = events
        .iter()
        .take(AI_PROMPT_MAX_EVENTS)
        .map(|event| {
            format!(
                "{} ({}) - {}, {}",
                event.name,
                event.artists.join(", "),
                event.venue,
                event.date
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "User's favorite artists: {artist_names}\n\n\
         Available concerts:\n{concert_list}\n\n\
         Find the top {AI_MAX_MATCHES} concerts this user would most likely enjoy based on:\n\
         - Musical genre similarity\n\
         - Artist influences and connections\n\
         - Similar fanbase overlap\n\
         - Musical style compatibility\n\n\
         Return ONLY a JSON array with this exact format:\n\
         [\n  {{\n    \"concertName\": \"exact concert name from list\",\n    \
         \"reason\": \"brief explanation why they'd like it\",\n    \
         \"confidence\": 0.85\n  }}\n]"
    )
}

/// Strict parse; anything that is not the requested JSON array fails the tier.
fn parse_matches(raw: &str) -> Result<Vec<AiMatch>> {
    Ok(serde_json::from_str(raw)?)
}

/// Drop low-confidence entries and resolve the model's concert names against
/// the aggregated list. Names that resolve to nothing (the model paraphrased
/// or hallucinated) are dropped silently.
fn resolve(matches: Vec<AiMatch>, events: &[Arc<Event>]) -> Vec<Recommendation> {
    matches
        .into_iter()
        .filter(|candidate| candidate.confidence > AI_MIN_CONFIDENCE)
        .filter_map(|candidate| {
            let event = events.iter().find(|event| event.name == candidate.concert_name)?;
            Some(Recommendation {
                kind: RecommendationKind::AiMatch,
                event: Arc::clone(event),
                reason: candidate.reason,
                confidence: candidate.confidence,
                match_artist: None,
                based_on: None,
            })
        })
        .take(AI_MAX_MATCHES)
        .collect()
}

#[async_trait]
impl ConcertRanker for OpenAiRanker {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn rank(&self, top_artists: &[ArtistProfile], events: &[Arc<Event>]) -> Vec<Recommendation> {
        if top_artists.is_empty() || events.is_empty() {
            return Vec::new();
        }

        let raw = match self.complete(build_prompt(top_artists, events)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("AI ranking unavailable: {}", e);
                return Vec::new();
            }
        };

        let matches = match parse_matches(&raw) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("AI response was not the requested JSON array: {}", e);
                return Vec::new();
            }
        };

        let recommendations = resolve(matches, events);
        debug!("AI tier produced {} matches", recommendations.len());
        recommendations
    }
}
