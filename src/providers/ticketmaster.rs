use crate::constants::{FALLBACK_VENUE, PROVIDER_RESULT_CAP, TICKETMASTER, TICKETMASTER_API};
use crate::error::{Result, ScoutError};
use crate::types::{Event, ProviderAdapter, SearchQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Ticketmaster Discovery v2. Events arrive under `_embedded.events` with the
/// lineup in `_embedded.attractions`.
pub struct TicketmasterProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl TicketmasterProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            timeout,
        }
    }
}

fn map_event(item: &Value, query: &SearchQuery) -> Option<Event> {
    let name = item["name"].as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let date_str = item.pointer("/dates/start/localDate")?.as_str()?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;

    let venue_node = item.pointer("/_embedded/venues/0");
    let venue = venue_node
        .and_then(|v| v["name"].as_str())
        .unwrap_or(FALLBACK_VENUE)
        .to_string();
    let city = venue_node
        .and_then(|v| v.pointer("/city/name"))
        .and_then(Value::as_str)
        .unwrap_or(&query.location)
        .to_string();

    let artists = item
        .pointer("/_embedded/attractions")
        .and_then(Value::as_array)
        .map(|attractions| {
            attractions
                .iter()
                .filter_map(|a| a["name"].as_str())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| vec![name.to_string()]);

    Some(Event {
        name: name.to_string(),
        date,
        venue,
        city,
        artists,
        source: TICKETMASTER.to_string(),
        url: item["url"].as_str().map(str::to_string),
        category: None,
    })
}

pub(crate) fn map_events(body: &Value, query: &SearchQuery) -> Vec<Event> {
    body.pointer("/_embedded/events")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| map_event(item, query)).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ProviderAdapter for TicketmasterProvider {
    fn provider_name(&self) -> &'static str {
        TICKETMASTER
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, query))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Event>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScoutError::Config("TICKETMASTER_API_KEY not configured".into()))?;

        let params: Vec<(&str, String)> = vec![
            ("apikey", api_key.to_string()),
            ("city", query.location.clone()),
            ("startDateTime", format!("{}T00:00:00Z", query.start_date)),
            ("endDateTime", format!("{}T23:59:59Z", query.end_date)),
            ("classificationName", "music".to_string()),
            ("size", PROVIDER_RESULT_CAP.to_string()),
        ];

        let body: Value = self
            .client
            .get(format!("{}/events.json", TICKETMASTER_API))
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = map_events(&body, query);
        debug!("Ticketmaster returned {} events", events.len());
        Ok(events)
    }
}
