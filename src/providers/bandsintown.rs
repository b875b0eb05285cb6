use crate::constants::{BANDSINTOWN, BANDSINTOWN_API, FALLBACK_VENUE};
use crate::error::Result;
use crate::types::{Event, ProviderAdapter, SearchQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bandsintown public events endpoint. Responds with a bare JSON array; the
/// lineup lives in `lineup`, with a single `artist` object as fallback.
pub struct BandsintownProvider {
    client: reqwest::Client,
    app_id: String,
    timeout: Duration,
}

impl BandsintownProvider {
    pub fn new(app_id: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            app_id,
            timeout,
        }
    }
}

fn map_event(item: &Value, query: &SearchQuery) -> Option<Event> {
    let name = item["title"]
        .as_str()
        .filter(|title| !title.trim().is_empty())
        .or_else(|| item["description"].as_str().filter(|d| !d.trim().is_empty()))
        .unwrap_or("Concert Event")
        .trim()
        .to_string();

    // Bandsintown sends a full datetime; the calendar day is everything
    // before the 'T'. Records without one default to the window start.
    let date = item["datetime"]
        .as_str()
        .and_then(|dt| dt.split('T').next())
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .unwrap_or(query.start_date);

    let venue_node = &item["venue"];
    let venue = venue_node["name"].as_str().unwrap_or(FALLBACK_VENUE).to_string();
    let city = venue_node["city"].as_str().unwrap_or(&query.location).to_string();

    let artists = item["lineup"]
        .as_array()
        .map(|lineup| {
            lineup
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| {
            vec![item
                .pointer("/artist/name")
                .and_then(Value::as_str)
                .unwrap_or("Various Artists")
                .to_string()]
        });

    let url = item["url"]
        .as_str()
        .or_else(|| item["facebook_rsvp_url"].as_str())
        .map(str::to_string);

    Some(Event {
        name,
        date,
        venue,
        city,
        artists,
        source: BANDSINTOWN.to_string(),
        url,
        category: None,
    })
}

pub(crate) fn map_events(body: &Value, query: &SearchQuery) -> Vec<Event> {
    body.as_array()
        .map(|items| items.iter().filter_map(|item| map_event(item, query)).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ProviderAdapter for BandsintownProvider {
    fn provider_name(&self) -> &'static str {
        BANDSINTOWN
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, query))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Event>> {
        let params: Vec<(&str, String)> = vec![
            ("app_id", self.app_id.clone()),
            ("location", query.location.clone()),
            ("date", format!("{},{}", query.start_date, query.end_date)),
        ];

        let body: Value = self
            .client
            .get(format!("{}/events", BANDSINTOWN_API))
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = map_events(&body, query);
        debug!("Bandsintown returned {} events", events.len());
        Ok(events)
    }
}
