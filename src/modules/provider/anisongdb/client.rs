//! AniSongDB HTTP client.
//!
//! All endpoints are POST with a JSON filter body and return a flat
//! `Vec<SongEntry>`.

use async_trait::async_trait;
use serde_json::json;

use super::dto::SongEntry;
use crate::modules::provider::http_client::RateLimitClient;
use crate::modules::provider::SongFeedSource;
use crate::shared::errors::AppResult;

pub struct AniSongDbClient {
    http: RateLimitClient,
    base_url: String,
}

impl AniSongDbClient {
    /// `base_url` points at the deployment's API root without a trailing
    /// slash, e.g. `https://host/api`.
    pub fn new(base_url: String, requests_per_second: f64) -> Self {
        Self {
            http: RateLimitClient::for_anisongdb(requests_per_second),
            base_url,
        }
    }
}

#[async_trait]
impl SongFeedSource for AniSongDbClient {
    /// All song usages for the given MyAnimeList ids.
    async fn fetch_by_mal_ids(&self, mal_ids: &[i64]) -> AppResult<Vec<SongEntry>> {
        let url = format!("{}/mal_ids_request", self.base_url);
        self.http.post_json(&url, &json!({ "mal_ids": mal_ids })).await
    }

    /// Title search. Opening/ending/insert filters are left at the server
    /// defaults (all enabled); callers must verify hits belong to their
    /// anime before trusting them.
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<SongEntry>> {
        let url = format!("{}/search_request", self.base_url);
        let body = json!({
            "anime_search_filter": { "search": title },
        });
        self.http.post_json(&url, &body).await
    }

    /// All song usages credited to the given AniSongDB artist ids.
    async fn fetch_by_artist_ids(&self, artist_ids: &[i64]) -> AppResult<Vec<SongEntry>> {
        let url = format!("{}/artist_ids_request", self.base_url);
        self.http
            .post_json(&url, &json!({ "artist_ids": artist_ids }))
            .await
    }

    /// Song usages for specific AMQ song ids; used by the master-list sync.
    async fn fetch_by_amq_song_ids(&self, amq_song_ids: &[i64]) -> AppResult<Vec<SongEntry>> {
        let url = format!("{}/amq_song_ids_request", self.base_url);
        self.http
            .post_json(&url, &json!({ "amq_song_ids": amq_song_ids }))
            .await
    }
}
