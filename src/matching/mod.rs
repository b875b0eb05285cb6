//! Three matching strategies with uniform confidence semantics, merged into
//! one ranked list. The merger is strategy-agnostic: tiers only differ in the
//! `RecommendationKind` tag and confidence they assign.

pub mod ai;
pub mod direct;
pub mod similarity;

pub use ai::{ConcertRanker, NoopRanker, OpenAiRanker};
pub use direct::direct_matches;
pub use similarity::similarity_matches;

use crate::constants::MAX_RECOMMENDATIONS;
use crate::types::Recommendation;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Bidirectional case-insensitive substring containment, so "The Artist"
/// still matches "Artist". Intentionally permissive; short generic names can
/// over-match. Diacritics are significant.
pub(crate) fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Union the tiers in priority order, keep the first recommendation per event,
/// then order by confidence. Direct matches come first in the concatenation,
/// so they win the dedup for an event every other tier also claimed.
pub fn merge(
    direct: Vec<Recommendation>,
    ai: Vec<Recommendation>,
    similarity: Vec<Recommendation>,
) -> Vec<Recommendation> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Recommendation> = Vec::new();

    for recommendation in direct.into_iter().chain(ai).chain(similarity) {
        if seen.insert(recommendation.event.name.clone()) {
            merged.push(recommendation);
        }
    }

    // Stable sort: ties keep the post-dedup (priority) order
    merged.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));
    merged.truncate(MAX_RECOMMENDATIONS);
    merged
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{Event, Recommendation, RecommendationKind};
    use std::sync::Arc;

    pub fn event(name: &str, artists: &[&str]) -> Arc<Event> {
        Arc::new(Event {
            name: name.to_string(),
            date: "2024-05-01".parse().unwrap(),
            venue: "Vega".to_string(),
            city: "Copenhagen".to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            source: "ticketmaster".to_string(),
            url: None,
            category: None,
        })
    }

    pub fn recommendation(kind: RecommendationKind, event: Arc<Event>, confidence: f64) -> Recommendation {
        Recommendation {
            kind,
            event,
            reason: "test".to_string(),
            confidence,
            match_artist: None,
            based_on: None,
        }
    }
}
