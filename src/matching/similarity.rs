use super::names_overlap;
use crate::constants::{
    SIMILARITY_MATCH_CONFIDENCE, SIMILARITY_PER_SEED_LIMIT, SIMILARITY_SEED_LIMIT,
};
use crate::types::{ArtistProfile, Event, Recommendation, RecommendationKind, TasteProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Similar-artist fallback tier. `already_matched` carries the event names
/// earlier tiers claimed; the working copy grows as this tier claims more, so
/// an event takes at most one similarity match across all seed artists.
pub async fn similarity_matches(
    taste: &dyn TasteProvider,
    user_id: &str,
    top_artists: &[ArtistProfile],
    events: &[Arc<Event>],
    already_matched: &HashSet<String>,
) -> Vec<Recommendation> {
    let mut claimed = already_matched.clone();
    let mut matches = Vec::new();

    for seed in top_artists.iter().take(SIMILARITY_SEED_LIMIT) {
        let similar = match taste.similar_artists(user_id, &seed.name).await {
            Ok(similar) => similar,
            Err(e) => {
                // This seed contributes nothing; the tier keeps going
                warn!("Similar-artist lookup failed for '{}': {}", seed.name, e);
                continue;
            }
        };

        for event in events {
            if claimed.contains(&event.name) {
                continue;
            }

            let hit = similar.iter().take(SIMILARITY_PER_SEED_LIMIT).find(|candidate| {
                event
                    .artists
                    .iter()
                    .any(|performer| names_overlap(performer, &candidate.name))
            });

            if let Some(candidate) = hit {
                claimed.insert(event.name.clone());
                matches.push(Recommendation {
                    kind: RecommendationKind::SimilarityMatch,
                    event: Arc::clone(event),
                    reason: format!(
                        "Because you listen to {}, you might like {} playing in {}!",
                        seed.name, candidate.name, event.city
                    ),
                    confidence: SIMILARITY_MATCH_CONFIDENCE,
                    match_artist: Some(candidate.name.clone()),
                    based_on: Some(seed.name.clone()),
                });
            }
        }
    }

    debug!("Similarity tier produced {} matches", matches.len());
    matches
}
