use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use concert_scout::aggregator::Aggregator;
use concert_scout::matching::{ConcertRanker, NoopRanker};
use concert_scout::recommend::{RecommendRequest, RecommendationEngine};
use concert_scout::types::{
    ArtistProfile, Event, ProviderAdapter, Recommendation, RecommendationKind, SearchQuery,
    SimilarArtist, TasteProvider,
};

fn event(name: &str, date: &str, venue: &str, artists: &[&str]) -> Event {
    Event {
        name: name.to_string(),
        date: date.parse().unwrap(),
        venue: venue.to_string(),
        city: "Copenhagen".to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        source: "static".to_string(),
        url: None,
        category: None,
    }
}

struct StaticProvider {
    name: &'static str,
    events: Vec<Event>,
}

#[async_trait]
impl ProviderAdapter for StaticProvider {
    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn fetch(&self, _query: &SearchQuery) -> concert_scout::error::Result<Vec<Event>> {
        Ok(self.events.clone())
    }
}

struct FakeTaste {
    top: Vec<ArtistProfile>,
    similar: HashMap<String, Vec<SimilarArtist>>,
}

impl FakeTaste {
    fn with_top(names: &[&str]) -> Self {
        Self {
            top: names
                .iter()
                .map(|name| ArtistProfile {
                    name: name.to_string(),
                    genres: vec!["indie".to_string()],
                    popularity: 60,
                })
                .collect(),
            similar: HashMap::new(),
        }
    }

    fn similar_for(mut self, seed: &str, names: &[&str]) -> Self {
        self.similar.insert(
            seed.to_string(),
            names
                .iter()
                .map(|name| SimilarArtist { name: name.to_string(), popularity: 40 })
                .collect(),
        );
        self
    }
}

#[async_trait]
impl TasteProvider for FakeTaste {
    async fn top_artists(&self, user_id: &str) -> concert_scout::error::Result<Vec<ArtistProfile>> {
        if self.top.is_empty() {
            return Err(concert_scout::error::ScoutError::Unauthenticated(user_id.to_string()));
        }
        Ok(self.top.clone())
    }

    async fn similar_artists(
        &self,
        _user_id: &str,
        seed_artist: &str,
    ) -> concert_scout::error::Result<Vec<SimilarArtist>> {
        Ok(self.similar.get(seed_artist).cloned().unwrap_or_default())
    }
}

/// Ranker that always claims the named event with the given confidence.
struct FixedRanker {
    concert_name: String,
    confidence: f64,
}

#[async_trait]
impl ConcertRanker for FixedRanker {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn rank(
        &self,
        _top_artists: &[ArtistProfile],
        events: &[Arc<Event>],
    ) -> Vec<Recommendation> {
        events
            .iter()
            .filter(|event| event.name == self.concert_name)
            .map(|event| Recommendation {
                kind: RecommendationKind::AiMatch,
                event: Arc::clone(event),
                reason: "model pick".to_string(),
                confidence: self.confidence,
                match_artist: None,
                based_on: None,
            })
            .collect()
    }
}

fn request() -> RecommendRequest {
    RecommendRequest {
        user_id: "listener".to_string(),
        location: "Copenhagen".to_string(),
        start_date: "2024-05-01".parse().unwrap(),
        end_date: "2024-05-07".parse().unwrap(),
    }
}

#[tokio::test]
async fn full_flow_produces_tiered_recommendations() -> Result<()> {
    let aggregator = Aggregator::new(vec![Box::new(StaticProvider {
        name: "static",
        events: vec![
            event("Caribou", "2024-05-02", "Vega", &["Caribou"]),
            event("Four Tet All Night", "2024-05-03", "Culture Box", &["Four Tet"]),
            event("Schlager Party", "2024-05-04", "Tivoli", &["Schlagerband"]),
        ],
    })]);
    let taste = Arc::new(FakeTaste::with_top(&["Caribou"]).similar_for("Caribou", &["Four Tet"]));
    let engine = RecommendationEngine::new(aggregator, taste, Arc::new(NoopRanker));

    let response = engine.recommend(&request()).await?;

    assert_eq!(response.total_concerts_found, 3);
    assert!(!response.ai_enabled);
    assert_eq!(response.user_top_artists.len(), 1);
    assert_eq!(response.recommendations.len(), 2);

    // Direct match outranks the similarity match
    assert_eq!(response.recommendations[0].kind, RecommendationKind::DirectMatch);
    assert_eq!(response.recommendations[0].event.name, "Caribou");
    assert_eq!(response.recommendations[1].kind, RecommendationKind::SimilarityMatch);
    assert_eq!(response.recommendations[1].event.name, "Four Tet All Night");
    assert_eq!(response.recommendations[1].based_on.as_deref(), Some("Caribou"));

    let diagnostics = response.debug.expect("diagnostics attached");
    assert!(diagnostics.providers["static"].success);
    assert_eq!(diagnostics.providers["static"].count, 3);
    Ok(())
}

#[tokio::test]
async fn direct_match_beats_ai_claim_on_same_event() -> Result<()> {
    let aggregator = Aggregator::new(vec![Box::new(StaticProvider {
        name: "static",
        events: vec![event("Caribou", "2024-05-02", "Vega", &["Caribou"])],
    })]);
    let taste = Arc::new(FakeTaste::with_top(&["Caribou"]));
    let ranker = Arc::new(FixedRanker { concert_name: "Caribou".to_string(), confidence: 0.88 });
    let engine = RecommendationEngine::new(aggregator, taste, ranker);

    let response = engine.recommend(&request()).await?;

    assert!(response.ai_enabled);
    assert_eq!(response.recommendations.len(), 1);
    assert_eq!(response.recommendations[0].kind, RecommendationKind::DirectMatch);
    assert!((response.recommendations[0].confidence - 0.95).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn zero_matches_is_a_valid_response() -> Result<()> {
    let aggregator = Aggregator::new(vec![Box::new(StaticProvider {
        name: "static",
        events: vec![event("Schlager Party", "2024-05-04", "Tivoli", &["Schlagerband"])],
    })]);
    let taste = Arc::new(FakeTaste::with_top(&["Mingus Tribute Ensemble"]));
    let engine = RecommendationEngine::new(aggregator, taste, Arc::new(NoopRanker));

    let response = engine.recommend(&request()).await?;

    // Events found but none matched taste: not an error
    assert_eq!(response.total_concerts_found, 1);
    assert!(response.recommendations.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_taste_profile_fails_the_request() {
    let aggregator = Aggregator::new(Vec::new());
    let taste = Arc::new(FakeTaste { top: Vec::new(), similar: HashMap::new() });
    let engine = RecommendationEngine::new(aggregator, taste, Arc::new(NoopRanker));

    let err = engine.recommend(&request()).await.unwrap_err();
    assert!(matches!(err, concert_scout::error::ScoutError::Unauthenticated(_)));
}

#[tokio::test]
async fn top_artists_echoed_back_are_capped_at_five() -> Result<()> {
    let aggregator = Aggregator::new(Vec::new());
    let taste = Arc::new(FakeTaste::with_top(&[
        "One", "Two", "Three", "Four", "Five", "Six", "Seven",
    ]));
    let engine = RecommendationEngine::new(aggregator, taste, Arc::new(NoopRanker));

    let response = engine.recommend(&request()).await?;

    assert_eq!(response.user_top_artists.len(), 5);
    assert_eq!(response.total_concerts_found, 0);
    Ok(())
}

#[tokio::test]
async fn response_serializes_with_caller_facing_field_names() -> Result<()> {
    let aggregator = Aggregator::new(vec![Box::new(StaticProvider {
        name: "static",
        events: vec![event("Caribou", "2024-05-02", "Vega", &["Caribou"])],
    })]);
    let taste = Arc::new(FakeTaste::with_top(&["Caribou"]));
    let engine = RecommendationEngine::new(aggregator, taste, Arc::new(NoopRanker));

    let response = engine.recommend(&request()).await?;
    let json = serde_json::to_value(&response)?;

    assert_eq!(json["totalConcertsFound"], 1);
    assert_eq!(json["aiEnabled"], false);
    assert!(json["userTopArtists"].is_array());
    let first = &json["recommendations"][0];
    assert_eq!(first["type"], "direct_match");
    assert_eq!(first["concert"]["name"], "Caribou");
    assert_eq!(first["matchArtist"], "Caribou");
    assert_eq!(first["concert"]["date"], "2024-05-02");
    Ok(())
}

#[tokio::test]
async fn similarity_tier_skips_events_claimed_by_direct_tier() -> Result<()> {
    // The direct tier claims the Caribou show; similarity must not re-claim it
    let aggregator = Aggregator::new(vec![Box::new(StaticProvider {
        name: "static",
        events: vec![event("Caribou", "2024-05-02", "Vega", &["Caribou"])],
    })]);
    let taste = Arc::new(FakeTaste::with_top(&["Caribou"]).similar_for("Caribou", &["Caribou"]));
    let engine = RecommendationEngine::new(aggregator, taste, Arc::new(NoopRanker));

    let response = engine.recommend(&request()).await?;

    let kinds: HashSet<RecommendationKind> =
        response.recommendations.iter().map(|r| r.kind).collect();
    assert_eq!(response.recommendations.len(), 1);
    assert!(kinds.contains(&RecommendationKind::DirectMatch));
    Ok(())
}
