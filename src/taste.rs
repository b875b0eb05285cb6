use crate::constants::SPOTIFY_API;
use crate::error::{Result, ScoutError};
use crate::types::{ArtistProfile, SimilarArtist, TasteProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

/// Resolved per-user bearer tokens. Acquiring them (the OAuth exchange) is a
/// collaborator's concern outside this crate.
pub trait AccessTokens: Send + Sync {
    fn access_token(&self, user_id: &str) -> Option<String>;
}

/// Process-local token store, one entry per authenticated user.
#[derive(Default)]
pub struct InMemoryTokens {
    tokens: RwLock<HashMap<String, String>>,
}

impl InMemoryTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: impl Into<String>, token: impl Into<String>) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(user_id.into(), token.into());
        }
    }
}

impl AccessTokens for InMemoryTokens {
    fn access_token(&self, user_id: &str) -> Option<String> {
        self.tokens.read().ok().and_then(|tokens| tokens.get(user_id).cloned())
    }
}

/// Spotify-backed taste profile: top artists for the listener, and similar
/// artists via an artist search followed by seeded recommendations.
pub struct SpotifyTaste {
    client: reqwest::Client,
    tokens: Arc<dyn AccessTokens>,
    base_url: String,
}

impl SpotifyTaste {
    pub fn new(tokens: Arc<dyn AccessTokens>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens,
            base_url: SPOTIFY_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn token_for(&self, user_id: &str) -> Result<String> {
        self.tokens
            .access_token(user_id)
            .ok_or_else(|| ScoutError::Unauthenticated(user_id.to_string()))
    }
}

fn map_top_artists(body: &Value) -> Vec<ArtistProfile> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|artist| {
                    let name = artist["name"].as_str()?;
                    Some(ArtistProfile {
                        name: name.to_string(),
                        genres: artist["genres"]
                            .as_array()
                            .map(|genres| {
                                genres
                                    .iter()
                                    .filter_map(Value::as_str)
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default(),
                        popularity: artist["popularity"].as_u64().unwrap_or(0) as u8,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The recommendations endpoint returns tracks; the lead artist of each track
/// is what the similarity tier matches against.
fn map_recommended_artists(body: &Value) -> Vec<SimilarArtist> {
    body["tracks"]
        .as_array()
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|track| {
                    let name = track.pointer("/artists/0/name")?.as_str()?;
                    Some(SimilarArtist {
                        name: name.to_string(),
                        popularity: track["popularity"].as_u64().unwrap_or(0) as u8,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TasteProvider for SpotifyTaste {
    #[instrument(skip(self))]
    async fn top_artists(&self, user_id: &str) -> Result<Vec<ArtistProfile>> {
        let token = self.token_for(user_id)?;

        let body: Value = self
            .client
            .get(format!("{}/me/top/artists", self.base_url))
            .query(&[("limit", "20")])
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let artists = map_top_artists(&body);
        debug!("Resolved {} top artists", artists.len());
        Ok(artists)
    }

    #[instrument(skip(self))]
    async fn similar_artists(&self, user_id: &str, seed_artist: &str) -> Result<Vec<SimilarArtist>> {
        let token = self.token_for(user_id)?;

        let search: Value = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", seed_artist), ("type", "artist"), ("limit", "1")])
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let artist_id = match search.pointer("/artists/items/0/id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                debug!("No artist found for seed '{}'", seed_artist);
                return Ok(Vec::new());
            }
        };

        let recommendations: Value = self
            .client
            .get(format!("{}/recommendations", self.base_url))
            .query(&[("seed_artists", artist_id.as_str()), ("limit", "10")])
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(map_recommended_artists(&recommendations))
    }
}
