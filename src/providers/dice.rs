use crate::constants::{DICE, DICE_API, FALLBACK_VENUE, PROVIDER_RESULT_CAP};
use crate::error::{Result, ScoutError};
use crate::types::{Event, EventCategory, ProviderAdapter, SearchQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// DICE partner API for independent-promoter shows. Authenticates with an
/// `x-api-key` header; events are tagged `independent`.
pub struct DiceProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl DiceProvider {
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

    let date = item
        .pointer("/dates/event_start_date")?
        .as_str()?
        .split('T')
        .next()
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())?;

    let venue_node = item.pointer("/venues/0");
    let venue = venue_node
        .and_then(|v| v["name"].as_str())
        .unwrap_or(FALLBACK_VENUE)
        .to_string();
    let city = venue_node
        .and_then(|v| v.pointer("/city/name"))
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
        source: DICE.to_string(),
        url: item["url"].as_str().map(str::to_string),
        category: Some(EventCategory::Independent),
    })
}

pub(crate) fn map_events(body: &Value, query: &SearchQuery) -> Vec<Event> {
    body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| map_event(item, query)).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ProviderAdapter for DiceProvider {
    fn provider_name(&self) -> &'static str {
        DICE
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
            .ok_or_else(|| ScoutError::Config("DICE_API_KEY not configured".into()))?;

        let params: Vec<(&str, String)> = vec![
            ("filter[city]", query.location.clone()),
            ("filter[date_from]", query.start_date.to_string()),
            ("filter[date_to]", query.end_date.to_string()),
            ("page[size]", PROVIDER_RESULT_CAP.to_string()),
        ];

        let body: Value = self
            .client
            .get(format!("{}/events", DICE_API))
            .header("x-api-key", api_key)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = map_events(&body, query);
        debug!("DICE returned {} events", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> SearchQuery {
        SearchQuery {
            location: "London".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 11, 8).unwrap(),
        }
    }

    #[test]
    fn maps_data_array() {
        let body = json!({
            "data": [{
                "name": "black midi",
                "dates": { "event_start_date": "2024-11-02T19:30:00Z" },
                "venues": [{ "name": "EartH", "city": { "name": "London" } }],
                "artists": [{ "name": "black midi" }],
                "url": "https://dice.example/black-midi"
            }]
        });

        let events = map_events(&body, &query());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, Some(EventCategory::Independent));
        assert_eq!(events[0].venue, "EartH");
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
    }

    #[test]
    fn missing_start_date_skips_record() {
        let body = json!({ "data": [{ "name": "Undated Show" }] });
        assert!(map_events(&body, &query()).is_empty());
    }
}
