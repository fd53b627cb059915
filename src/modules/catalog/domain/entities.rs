use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::value_objects::{PeopleKind, SongUseType};

/// A catalogued anime. `linked_ids` carries external identifiers
/// (`anilist`, `myanimelist`) plus free-form extras such as synonyms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anime {
    pub id: Uuid,
    pub title_en: Option<String>,
    pub title_jp: Option<String>,
    pub title_romaji: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub anime_type: Option<String>,
    pub cover_image_url: Option<String>,
    pub linked_ids: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Anime {
    /// External id under `key`, tolerating values stored as number or string.
    pub fn linked_id(&self, key: &str) -> Option<i64> {
        linked_id_as_i64(self.linked_ids.get(key))
    }
}

/// Converts a jsonb linked-id value to i64 regardless of how it was stored.
pub fn linked_id_as_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        _ => None,
    }
}

/// Field set for creating or updating an anime row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeFields {
    pub title_en: Option<String>,
    pub title_jp: Option<String>,
    pub title_romaji: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub anime_type: Option<String>,
    pub cover_image_url: Option<String>,
    pub linked_ids: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub name: String,
    pub audio: String,
    pub amq_song_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct People {
    pub id: Uuid,
    pub kind: PeopleKind,
    pub primary_name: String,
    pub alt_names: Vec<String>,
    pub image_url: Option<String>,
    pub external_links: Map<String, Value>,
    pub anisongdb_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set for creating a people row.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub kind: PeopleKind,
    pub primary_name: String,
    pub alt_names: Vec<String>,
    pub image_url: Option<String>,
    pub external_links: Map<String, Value>,
    pub anisongdb_id: Option<i32>,
}

impl NewPerson {
    pub fn person(primary_name: impl Into<String>) -> Self {
        Self {
            kind: PeopleKind::Person,
            primary_name: primary_name.into(),
            alt_names: Vec::new(),
            image_url: None,
            external_links: Map::new(),
            anisongdb_id: None,
        }
    }
}

/// Partial update for a people row; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
    pub kind: Option<PeopleKind>,
    pub primary_name: Option<String>,
    pub alt_names: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub anisongdb_id: Option<i32>,
}

/// A song↔anime appearance link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongAnimeLink {
    pub id: Uuid,
    pub song_id: Uuid,
    pub anime_id: Uuid,
    pub use_type: SongUseType,
    pub sequence: Option<i32>,
    pub notes: Option<String>,
    pub is_dub: bool,
    pub is_rebroadcast: bool,
}

/// Values for reconciling a song↔anime link (insert or merge on conflict).
#[derive(Debug, Clone, PartialEq)]
pub struct LinkUsage {
    pub song_id: Uuid,
    pub anime_id: Uuid,
    pub use_type: SongUseType,
    pub sequence: Option<i32>,
    pub notes: Option<String>,
    pub is_dub: bool,
    pub is_rebroadcast: bool,
}
