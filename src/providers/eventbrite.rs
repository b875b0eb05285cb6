use crate::constants::{EVENTBRITE, EVENTBRITE_API, FALLBACK_VENUE};
use crate::error::{Result, ScoutError};
use crate::types::{Event, ProviderAdapter, SearchQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Eventbrite events/search. General-event listings rarely separate the
/// lineup, so the event title doubles as the performer list.
pub struct EventbriteProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl EventbriteProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            timeout,
        }
    }
}

fn map_event(item: &Value, query: &SearchQuery) -> Option<Event> {
    let name = item.pointer("/name/text")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let date = item
        .pointer("/start/local")?
        .as_str()?
        .split('T')
        .next()
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())?;

    let venue_node = &item["venue"];
    let venue = venue_node["name"].as_str().unwrap_or(FALLBACK_VENUE).to_string();
    let city = venue_node
        .pointer("/address/city")
        .and_then(Value::as_str)
        .unwrap_or(&query.location)
        .to_string();

    Some(Event {
        name: name.to_string(),
        date,
        venue,
        city,
        artists: vec![name.to_string()],
        source: EVENTBRITE.to_string(),
        url: item["url"].as_str().map(str::to_string),
        category: None,
    })
}

pub(crate) fn map_events(body: &Value, query: &SearchQuery) -> Vec<Event> {
    body["events"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| map_event(item, query)).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ProviderAdapter for EventbriteProvider {
    fn provider_name(&self) -> &'static str {
        EVENTBRITE
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
            .ok_or_else(|| ScoutError::Config("EVENTBRITE_API_KEY not configured".into()))?;

        let params: Vec<(&str, String)> = vec![
            ("token", api_key.to_string()),
            ("location.address", query.location.clone()),
            ("start_date.range_start", format!("{}T00:00:00Z", query.start_date)),
            ("start_date.range_end", format!("{}T23:59:59Z", query.end_date)),
            // Eventbrite category 103 is Music
            ("categories", "103".to_string()),
            ("expand", "venue".to_string()),
        ];

        let body: Value = self
            .client
            .get(format!("{}/events/search/", EVENTBRITE_API))
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = map_events(&body, query);
        debug!("Eventbrite returned {} events", events.len());
        Ok(events)
    }
}
