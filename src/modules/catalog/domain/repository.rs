use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::errors::AppResult;

use super::entities::{
    Anime, AnimeFields, LinkUsage, NewPerson, People, PersonPatch, Song, SongAnimeLink,
};
use super::value_objects::CreditRole;

/// Storage port for the catalog. Implemented with Diesel/Postgres in
/// infrastructure; mocked in tests.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // -- anime ---------------------------------------------------------------

    async fn find_anime(&self, id: Uuid) -> AppResult<Option<Anime>>;

    /// Lookup by an external id stored in `linked_ids` (e.g. "anilist",
    /// "myanimelist"), tolerant of number-or-string storage.
    async fn find_anime_by_linked_id(&self, provider: &str, id: i64) -> AppResult<Option<Anime>>;

    /// Case-insensitive exact match against any of the stored titles
    /// (english, japanese, romaji).
    async fn find_anime_by_title(&self, title: &str) -> AppResult<Option<Anime>>;

    async fn insert_anime(&self, fields: AnimeFields) -> AppResult<Anime>;

    /// Full-field update. Callers are responsible for merging `linked_ids`
    /// before handing the fields over; the row value is replaced as given.
    async fn update_anime(&self, id: Uuid, fields: AnimeFields) -> AppResult<Anime>;

    // -- songs ---------------------------------------------------------------

    async fn find_song(&self, id: Uuid) -> AppResult<Option<Song>>;

    async fn find_song_by_name(&self, name: &str) -> AppResult<Option<Song>>;

    async fn find_song_by_amq_id(&self, amq_song_id: i32) -> AppResult<Option<Song>>;

    async fn insert_song(
        &self,
        name: &str,
        audio: &str,
        amq_song_id: Option<i32>,
    ) -> AppResult<Song>;

    async fn set_song_audio(&self, song_id: Uuid, audio: &str) -> AppResult<()>;

    async fn set_song_amq_id(&self, song_id: Uuid, amq_song_id: i32) -> AppResult<()>;

    /// Distinct songs linked to the anime, newest first.
    async fn songs_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<Song>>;

    async fn anime_has_songs(&self, anime_id: Uuid) -> AppResult<bool>;

    /// Appearance links for an anime ordered by sequence (nulls last), then
    /// use type.
    async fn links_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<SongAnimeLink>>;

    // -- people --------------------------------------------------------------

    async fn find_person_by_name(&self, primary_name: &str) -> AppResult<Option<People>>;

    async fn find_person_by_anisongdb_id(&self, anisongdb_id: i32) -> AppResult<Option<People>>;

    async fn insert_person(&self, person: NewPerson) -> AppResult<People>;

    async fn update_person(&self, id: Uuid, patch: PersonPatch) -> AppResult<People>;

    /// Insert a group membership edge; duplicates are ignored.
    async fn add_membership(&self, group_id: Uuid, member_id: Uuid) -> AppResult<()>;

    /// People credited on any of the given songs.
    async fn credited_people_for_songs(&self, song_ids: &[Uuid]) -> AppResult<Vec<People>>;

    // -- credits & links -----------------------------------------------------

    /// Insert a (song, person, role) credit; duplicates are ignored.
    async fn ensure_credit(&self, song_id: Uuid, people_id: Uuid, role: CreditRole)
        -> AppResult<()>;

    /// Insert or merge a song↔anime appearance link.
    ///
    /// On conflict with the (song, anime, use_type, sequence) usage key:
    /// booleans accumulate truth (OR), notes keep the first non-null value.
    async fn upsert_link(&self, usage: LinkUsage) -> AppResult<()>;
}
