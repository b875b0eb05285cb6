use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Canonical, provider-agnostic concert record all matching logic operates on.
/// `name`, `date` and `venue` are non-empty after normalization; adapters skip
/// records that cannot satisfy this even with defaults applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub date: NaiveDate,
    pub venue: String,
    pub city: String,
    /// Performers/lineup; falls back to `[name]` when a provider cannot
    /// separate performers from the event title.
    pub artists: Vec<String>,
    /// Provider identifier this record came from.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Default,
    Electronic,
    Independent,
    Radio,
}

/// Listener profile entry from the taste-profile provider. Read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarArtist {
    pub name: String,
    #[serde(default)]
    pub popularity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    DirectMatch,
    AiMatch,
    SimilarityMatch,
}

/// One ranked suggestion. The event is shared with the aggregated list, not
/// copied; `confidence` is used only for ordering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    #[serde(rename = "concert")]
    pub event: Arc<Event>,
    pub reason: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
}

/// Per-provider outcome of one aggregation run. Diagnostic only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRunResult {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderRunResult {
    pub fn ok(count: usize) -> Self {
        Self { success: true, count, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, count: 0, error: Some(error.into()) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Core trait that all event providers implement. Adapters map their source's
/// native response shape into canonical events; the aggregator isolates their
/// failures and enforces `timeout`.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Identifier used in `Event.source` and diagnostics keys.
    fn provider_name(&self) -> &'static str;

    /// Upper bound for one fetch, shorter than the enclosing request deadline.
    fn timeout(&self) -> Duration;

    /// Whether the credential this provider requires is present. Unconfigured
    /// adapters are short-circuited to a failure without a network call.
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Event>>;
}

/// Taste-profile collaborator, injected already authenticated. Top-artist
/// resolution failing is the one hard failure of a recommendation request;
/// similar-artist lookups degrade per seed.
#[async_trait::async_trait]
pub trait TasteProvider: Send + Sync {
    async fn top_artists(&self, user_id: &str) -> Result<Vec<ArtistProfile>>;

    async fn similar_artists(&self, user_id: &str, seed_artist: &str)
        -> Result<Vec<SimilarArtist>>;
}
