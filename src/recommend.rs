use crate::aggregator::{Aggregator, SearchDiagnostics};
use crate::constants::TOP_ARTISTS_DISPLAYED;
use crate::error::{Result, ScoutError};
use crate::matching::{self, ConcertRanker};
use crate::types::{ArtistProfile, Recommendation, SearchQuery, TasteProvider};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub user_id: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub location: String,
    pub date_range: DateRange,
    pub user_top_artists: Vec<ArtistProfile>,
    pub total_concerts_found: usize,
    pub recommendations: Vec<Recommendation>,
    pub ai_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<SearchDiagnostics>,
}

/// Orchestrates one recommendation request: taste profile, aggregation, the
/// three matching tiers, and the merged response. All state is request-scoped.
pub struct RecommendationEngine {
    aggregator: Aggregator,
    taste: Arc<dyn TasteProvider>,
    ranker: Arc<dyn ConcertRanker>,
}

impl RecommendationEngine {
    pub fn new(
        aggregator: Aggregator,
        taste: Arc<dyn TasteProvider>,
        ranker: Arc<dyn ConcertRanker>,
    ) -> Self {
        Self { aggregator, taste, ranker }
    }

    #[instrument(skip(self, request), fields(user = %request.user_id, location = %request.location))]
    pub async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse> {
        validate(request)?;

        // Without a usable taste profile no meaningful recommendation exists;
        // this is the one failure that surfaces to the caller.
        let top_artists = self.taste.top_artists(&request.user_id).await?;

        let query = SearchQuery {
            location: request.location.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
        };
        let outcome = self.aggregator.search(&query).await;

        let direct = matching::direct_matches(&top_artists, &outcome.events);
        let matched_names: HashSet<String> =
            direct.iter().map(|r| r.event.name.clone()).collect();

        // Both remaining tiers only read the finalized event list, so they run
        // concurrently; the similarity tier additionally needs the direct
        // tier's exclusion set.
        let (ai, similarity) = tokio::join!(
            self.ranker.rank(&top_artists, &outcome.events),
            matching::similarity_matches(
                self.taste.as_ref(),
                &request.user_id,
                &top_artists,
                &outcome.events,
                &matched_names,
            ),
        );

        let recommendations = matching::merge(direct, ai, similarity);
        info!(
            "Returning {} recommendations from {} aggregated events",
            recommendations.len(),
            outcome.events.len()
        );

        let mut user_top_artists = top_artists;
        user_top_artists.truncate(TOP_ARTISTS_DISPLAYED);

        Ok(RecommendResponse {
            location: request.location.clone(),
            date_range: DateRange { start: request.start_date, end: request.end_date },
            user_top_artists,
            total_concerts_found: outcome.events.len(),
            recommendations,
            ai_enabled: self.ranker.is_enabled(),
            debug: Some(outcome.diagnostics),
        })
    }
}

/// Reject bad caller input before any provider is contacted.
fn validate(request: &RecommendRequest) -> Result<()> {
    if request.user_id.trim().is_empty() {
        return Err(ScoutError::InvalidRequest("userId is required".to_string()));
    }
    if request.location.trim().is_empty() {
        return Err(ScoutError::InvalidRequest("location is required".to_string()));
    }
    if request.start_date > request.end_date {
        return Err(ScoutError::InvalidRequest(
            "startDate must not be after endDate".to_string(),
        ));
    }
    Ok(())
}
