use crate::constants::{FALLBACK_VENUE, NTS, NTS_API};
use crate::error::Result;
use crate::types::{Event, EventCategory, ProviderAdapter, SearchQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// NTS Radio live events. Public API, results under `results`; events are
/// tagged `radio`.
pub struct NtsProvider {
    client: reqwest::Client,
    timeout: Duration,
}

impl NtsProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

fn map_event(item: &Value, query: &SearchQuery) -> Option<Event> {
    let name = item["title"].as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let date = item["start_timestamp"]
        .as_str()
        .and_then(|dt| dt.split('T').next())
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())?;

    let venue = item
        .pointer("/location/name")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_VENUE)
        .to_string();
    let city = item
        .pointer("/location/city")
        .and_then(Value::as_str)
        .unwrap_or(&query.location)
        .to_string();

    let artists = item["artists"]
        .as_array()
        .map(|lineup| {
            lineup
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
        source: NTS.to_string(),
        url: item["url"].as_str().map(str::to_string),
        category: Some(EventCategory::Radio),
    })
}

pub(crate) fn map_events(body: &Value, query: &SearchQuery) -> Vec<Event> {
    body["results"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| map_event(item, query)).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ProviderAdapter for NtsProvider {
    fn provider_name(&self) -> &'static str {
        NTS
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, query))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Event>> {
        let params: Vec<(&str, String)> = vec![
            ("location", query.location.clone()),
            ("from", query.start_date.to_string()),
            ("to", query.end_date.to_string()),
        ];

        let body: Value = self
            .client
            .get(format!("{}/events", NTS_API))
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = map_events(&body, query);
        debug!("NTS returned {} events", events.len());
        Ok(events)
    }
}
