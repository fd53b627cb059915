pub mod amq;
pub mod anilist;
pub mod anisongdb;
pub mod http_client;

pub use amq::{AmqClient, MasterListFetch};
pub use anilist::AniListClient;
pub use anisongdb::AniSongDbClient;

use async_trait::async_trait;

use crate::shared::errors::AppResult;
use anilist::Media;
use anisongdb::SongEntry;

/// Anime metadata port. Backed by `AniListClient` in production; mocked
/// in tests.
#[async_trait]
pub trait AnimeMetadataSource: Send + Sync {
    /// `Ok(None)` means the provider has no media with that id.
    async fn fetch_anime_by_id(&self, anilist_id: i64) -> AppResult<Option<Media>>;
}

/// Song usage feed port. Backed by `AniSongDbClient` in production;
/// mocked in tests.
#[async_trait]
pub trait SongFeedSource: Send + Sync {
    async fn fetch_by_mal_ids(&self, mal_ids: &[i64]) -> AppResult<Vec<SongEntry>>;

    /// Title search. Hits are unverified; callers must check they belong
    /// to their anime before trusting them.
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<SongEntry>>;

    async fn fetch_by_artist_ids(&self, artist_ids: &[i64]) -> AppResult<Vec<SongEntry>>;

    async fn fetch_by_amq_song_ids(&self, amq_song_ids: &[i64]) -> AppResult<Vec<SongEntry>>;
}
