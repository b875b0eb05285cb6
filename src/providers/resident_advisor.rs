use crate::constants::{FALLBACK_VENUE, PROVIDER_RESULT_CAP, RESIDENT_ADVISOR, RESIDENT_ADVISOR_API};
use crate::error::Result;
use crate::types::{Event, EventCategory, ProviderAdapter, SearchQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Resident Advisor electronic-music listings. No credential required; events
/// are tagged `electronic` for the presentation layer.
pub struct ResidentAdvisorProvider {
    client: reqwest::Client,
    timeout: Duration,
}

impl ResidentAdvisorProvider {
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

    let date = item["date"]
        .as_str()
        .and_then(|dt| dt.split('T').next())
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())?;

    let venue = item
        .pointer("/venue/name")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_VENUE)
        .to_string();
    let city = item
        .pointer("/venue/area")
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

    let url = item["contentUrl"]
        .as_str()
        .map(|path| format!("https://ra.co{}", path));

    Some(Event {
        name: name.to_string(),
        date,
        venue,
        city,
        artists,
        source: RESIDENT_ADVISOR.to_string(),
        url,
        category: Some(EventCategory::Electronic),
    })
}

pub(crate) fn map_events(body: &Value, query: &SearchQuery) -> Vec<Event> {
    body["events"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| map_event(item, query)).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ProviderAdapter for ResidentAdvisorProvider {
    fn provider_name(&self) -> &'static str {
        RESIDENT_ADVISOR
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, query))]
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Event>> {
        let params: Vec<(&str, String)> = vec![
            ("area", query.location.clone()),
            ("startDate", query.start_date.to_string()),
            ("endDate", query.end_date.to_string()),
            ("limit", PROVIDER_RESULT_CAP.to_string()),
        ];

        let body: Value = self
            .client
            .get(format!("{}/events", RESIDENT_ADVISOR_API))
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = map_events(&body, query);
        debug!("Resident Advisor returned {} events", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> SearchQuery {
        SearchQuery {
            location: "Amsterdam".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 6).unwrap(),
        }
    }

    #[test]
    fn maps_and_tags_electronic() {
        let body = json!({
            "events": [{
                "title": "Awakenings x Shelter",
                "date": "2024-10-05T23:00:00",
                "venue": { "name": "Shelter", "area": "Amsterdam" },
                "artists": [{ "name": "Colin Benders" }, { "name": "Speedy J" }],
                "contentUrl": "/events/1892299"
            }]
        });

        let events = map_events(&body, &query());
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.category, Some(EventCategory::Electronic));
        assert_eq!(event.artists, vec!["Colin Benders", "Speedy J"]);
        assert_eq!(event.url.as_deref(), Some("https://ra.co/events/1892299"));
    }

    #[test]
    fn lineup_falls_back_to_title() {
        let body = json!({
            "events": [{ "title": "Open Air TBA", "date": "2024-10-06" }]
        });

        let events = map_events(&body, &query());
        assert_eq!(events[0].artists, vec!["Open Air TBA"]);
        assert_eq!(events[0].venue, FALLBACK_VENUE);
        assert_eq!(events[0].city, "Amsterdam");
    }
}
