use crate::metrics::ProviderMetrics;
use crate::types::{Event, ProviderAdapter, ProviderRunResult, SearchQuery};
use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Per-run observability summary. Exposed to callers as an optional debug
/// payload, never consulted by matching logic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDiagnostics {
    pub run_id: Uuid,
    pub query: SearchQuery,
    pub providers: BTreeMap<String, ProviderRunResult>,
    pub total_found: usize,
    pub after_dedup: usize,
}

pub struct SearchOutcome {
    pub events: Vec<Arc<Event>>,
    pub diagnostics: SearchDiagnostics,
}

/// Fans out one search to every configured provider, tolerating any subset of
/// them failing, and owns the canonical event list for the request.
pub struct Aggregator {
    providers: Vec<Box<dyn ProviderAdapter>>,
}

impl Aggregator {
    pub fn new(providers: Vec<Box<dyn ProviderAdapter>>) -> Self {
        Self { providers }
    }

    #[instrument(skip(self, query), fields(location = %query.location))]
    pub async fn search(&self, query: &SearchQuery) -> SearchOutcome {
        let run_id = Uuid::new_v4();
        info!(
            "Searching {} providers for events in {} from {} to {}",
            self.providers.len(),
            query.location,
            query.start_date,
            query.end_date
        );

        // Wait for all, fail none: every adapter settles (success, failure or
        // timeout) before merging. join_all keeps provider-invocation order,
        // which first-wins dedup below depends on.
        let settled = join_all(
            self.providers
                .iter()
                .map(|provider| run_provider(provider.as_ref(), query)),
        )
        .await;

        let mut all_events: Vec<Event> = Vec::new();
        let mut providers = BTreeMap::new();
        for (name, events, result) in settled {
            all_events.extend(events);
            providers.insert(name.to_string(), result);
        }

        let total_found = all_events.len();
        let mut events = dedup_events(all_events);
        events.sort_by_key(|event| event.date);
        let after_dedup = events.len();
        info!("{} unique events after deduplication ({} fetched)", after_dedup, total_found);

        SearchOutcome {
            events: events.into_iter().map(Arc::new).collect(),
            diagnostics: SearchDiagnostics {
                run_id,
                query: query.clone(),
                providers,
                total_found,
                after_dedup,
            },
        }
    }
}

async fn run_provider(
    provider: &dyn ProviderAdapter,
    query: &SearchQuery,
) -> (&'static str, Vec<Event>, ProviderRunResult) {
    let name = provider.provider_name();

    if !provider.is_configured() {
        warn!("{}: credential not configured, skipping", name);
        return (name, Vec::new(), ProviderRunResult::failed("credential not configured"));
    }

    let started = Instant::now();
    match tokio::time::timeout(provider.timeout(), provider.fetch(query)).await {
        Ok(Ok(events)) => {
            ProviderMetrics::record_fetch_success(name, started.elapsed().as_secs_f64(), events.len());
            info!("{}: found {} events", name, events.len());
            let result = ProviderRunResult::ok(events.len());
            (name, events, result)
        }
        Ok(Err(e)) => {
            ProviderMetrics::record_fetch_error(name);
            warn!("{}: fetch failed: {}", name, e);
            (name, Vec::new(), ProviderRunResult::failed(e.to_string()))
        }
        Err(_) => {
            ProviderMetrics::record_fetch_error(name);
            warn!("{}: timed out after {}s", name, provider.timeout().as_secs());
            (
                name,
                Vec::new(),
                ProviderRunResult::failed(format!("timed out after {}s", provider.timeout().as_secs())),
            )
        }
    }
}

/// Two events share identity iff name and venue match case-insensitively and
/// the date matches exactly. First occurrence wins.
pub fn dedup_events(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<(String, NaiveDate, String)> = HashSet::new();
    let mut unique = Vec::with_capacity(events.len());
    for event in events {
        let key = (event.name.to_lowercase(), event.date, event.venue.to_lowercase());
        if seen.insert(key) {
            unique.push(event);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScoutError};
    use std::time::Duration;

    fn event(name: &str, date: &str, venue: &str, source: &str) -> Event {
        Event {
            name: name.to_string(),
            date: date.parse().unwrap(),
            venue: venue.to_string(),
            city: "Oslo".to_string(),
            artists: vec![name.to_string()],
            source: source.to_string(),
            url: None,
            category: None,
        }
    }

    fn query() -> SearchQuery {
        SearchQuery {
            location: "Oslo".to_string(),
            start_date: "2024-05-01".parse().unwrap(),
            end_date: "2024-05-07".parse().unwrap(),
        }
    }

    struct StaticProvider {
        name: &'static str,
        events: Vec<Event>,
    }

    #[async_trait::async_trait]
    impl ProviderAdapter for StaticProvider {
        fn provider_name(&self) -> &'static str {
            self.name
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Event>> {
            Ok(self.events.clone())
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl ProviderAdapter for FailingProvider {
        fn provider_name(&self) -> &'static str {
            "failing"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Event>> {
            Err(ScoutError::Api { message: "upstream 503".to_string() })
        }
    }

    struct HangingProvider;

    #[async_trait::async_trait]
    impl ProviderAdapter for HangingProvider {
        fn provider_name(&self) -> &'static str {
            "hanging"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(20)
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Event>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    struct UnconfiguredProvider;

    #[async_trait::async_trait]
    impl ProviderAdapter for UnconfiguredProvider {
        fn provider_name(&self) -> &'static str {
            "unconfigured"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn is_configured(&self) -> bool {
            false
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Event>> {
            unreachable!("unconfigured adapters must not be fetched")
        }
    }

    #[tokio::test]
    async fn partial_failure_keeps_successful_provider_events() {
        let aggregator = Aggregator::new(vec![
            Box::new(StaticProvider {
                name: "good",
                events: vec![
                    event("Show A", "2024-05-02", "Club X", "good"),
                    event("Show B", "2024-05-03", "Club Y", "good"),
                ],
            }),
            Box::new(FailingProvider),
            Box::new(HangingProvider),
        ]);

        let outcome = aggregator.search(&query()).await;

        assert_eq!(outcome.events.len(), 2);
        let diag = &outcome.diagnostics.providers;
        assert!(diag["good"].success);
        assert_eq!(diag["good"].count, 2);
        assert!(!diag["failing"].success);
        assert!(diag["failing"].error.as_deref().unwrap().contains("upstream 503"));
        assert!(!diag["hanging"].success);
        assert!(diag["hanging"].error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn unconfigured_provider_short_circuits_without_fetch() {
        let aggregator = Aggregator::new(vec![Box::new(UnconfiguredProvider)]);
        let outcome = aggregator.search(&query()).await;

        assert!(outcome.events.is_empty());
        let result = &outcome.diagnostics.providers["unconfigured"];
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("credential not configured"));
    }

    #[tokio::test]
    async fn zero_providers_yield_empty_result() {
        let aggregator = Aggregator::new(Vec::new());
        let outcome = aggregator.search(&query()).await;
        assert!(outcome.events.is_empty());
        assert!(outcome.diagnostics.providers.is_empty());
        assert_eq!(outcome.diagnostics.total_found, 0);
    }

    #[tokio::test]
    async fn duplicates_collapse_case_insensitively_keeping_first_seen() {
        let aggregator = Aggregator::new(vec![
            Box::new(StaticProvider {
                name: "first",
                events: vec![event("Show A", "2024-05-01", "Club X", "first")],
            }),
            Box::new(StaticProvider {
                name: "second",
                events: vec![event("show a", "2024-05-01", "CLUB X", "second")],
            }),
        ]);

        let outcome = aggregator.search(&query()).await;

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].source, "first");
        assert_eq!(outcome.diagnostics.total_found, 2);
        assert_eq!(outcome.diagnostics.after_dedup, 1);
    }

    #[tokio::test]
    async fn chronological_sort_is_stable_for_equal_dates() {
        let aggregator = Aggregator::new(vec![
            Box::new(StaticProvider {
                name: "first",
                events: vec![
                    event("Late Show", "2024-05-06", "Venue A", "first"),
                    event("Early Same Day 1", "2024-05-02", "Venue B", "first"),
                ],
            }),
            Box::new(StaticProvider {
                name: "second",
                events: vec![event("Early Same Day 2", "2024-05-02", "Venue C", "second")],
            }),
        ]);

        let outcome = aggregator.search(&query()).await;
        let names: Vec<&str> = outcome.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Early Same Day 1", "Early Same Day 2", "Late Show"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let events = vec![
            event("Show A", "2024-05-01", "Club X", "a"),
            event("SHOW A", "2024-05-01", "club x", "b"),
            event("Show B", "2024-05-01", "Club X", "a"),
        ];

        let once = dedup_events(events);
        let names: Vec<String> = once.iter().map(|e| e.name.clone()).collect();
        let twice = dedup_events(once);
        let names_after: Vec<String> = twice.iter().map(|e| e.name.clone()).collect();

        assert_eq!(names, vec!["Show A", "Show B"]);
        assert_eq!(names, names_after);
    }
}
