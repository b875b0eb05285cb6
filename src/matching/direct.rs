use super::names_overlap;
use crate::constants::DIRECT_MATCH_CONFIDENCE;
use crate::types::{ArtistProfile, Event, Recommendation, RecommendationKind};
use std::sync::Arc;
use tracing::debug;

/// Exact-overlap tier: one recommendation per (event, listened artist) pair
/// whose names overlap. The merger later collapses multiple matches for the
/// same event.
pub fn direct_matches(top_artists: &[ArtistProfile], events: &[Arc<Event>]) -> Vec<Recommendation> {
    let mut matches = Vec::new();

    for event in events {
        for artist in top_artists {
            let hit = event
                .artists
                .iter()
                .any(|performer| names_overlap(performer, &artist.name));
            if hit {
                matches.push(Recommendation {
                    kind: RecommendationKind::DirectMatch,
                    event: Arc::clone(event),
                    reason: format!(
                        "Because you listen to {}, you might like this concert!",
                        artist.name
                    ),
                    confidence: DIRECT_MATCH_CONFIDENCE,
                    match_artist: Some(artist.name.clone()),
                    based_on: None,
                });
            }
        }
    }

    debug!("Direct tier produced {} matches", matches.len());
    matches
}
