use crate::schema::{anime, people, song, song_anime};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::modules::catalog::domain::{
    Anime, People, PeopleKind, Song, SongAnimeLink, SongUseType,
};
use crate::shared::errors::{AppError, AppResult};

// ============= ANIME =============

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = anime)]
pub struct AnimeModel {
    pub id: Uuid,
    pub title_en: Option<String>,
    pub title_jp: Option<String>,
    pub title_romaji: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub anime_type: Option<String>,
    pub cover_image_url: Option<String>,
    pub linked_ids: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimeModel {
    pub fn into_entity(self) -> Anime {
        Anime {
            id: self.id,
            title_en: self.title_en,
            title_jp: self.title_jp,
            title_romaji: self.title_romaji,
            season: self.season,
            year: self.year,
            anime_type: self.anime_type,
            cover_image_url: self.cover_image_url,
            linked_ids: json_object(self.linked_ids),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ============= SONG =============

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = song)]
pub struct SongModel {
    pub id: Uuid,
    pub name: String,
    pub audio: String,
    pub amq_song_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SongModel {
    pub fn into_entity(self) -> Song {
        Song {
            id: self.id,
            name: self.name,
            audio: self.audio,
            amq_song_id: self.amq_song_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ============= PEOPLE =============

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = people)]
pub struct PeopleModel {
    pub id: Uuid,
    pub kind: String,
    pub primary_name: String,
    pub alt_names: Vec<String>,
    pub image_url: Option<String>,
    pub external_links: Value,
    pub anisongdb_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PeopleModel {
    pub fn into_entity(self) -> AppResult<People> {
        let kind = PeopleKind::parse(&self.kind).ok_or_else(|| {
            AppError::DatabaseError(format!("Unknown people kind '{}'", self.kind))
        })?;
        Ok(People {
            id: self.id,
            kind,
            primary_name: self.primary_name,
            alt_names: self.alt_names,
            image_url: self.image_url,
            external_links: json_object(self.external_links),
            anisongdb_id: self.anisongdb_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ============= SONG-ANIME LINK =============

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = song_anime)]
pub struct SongAnimeModel {
    pub id: Uuid,
    pub song_id: Uuid,
    pub anime_id: Uuid,
    pub use_type: SongUseType,
    pub sequence: Option<i32>,
    pub notes: Option<String>,
    pub is_dub: bool,
    pub is_rebroadcast: bool,
}

impl SongAnimeModel {
    pub fn into_entity(self) -> SongAnimeLink {
        SongAnimeLink {
            id: self.id,
            song_id: self.song_id,
            anime_id: self.anime_id,
            use_type: self.use_type,
            sequence: self.sequence,
            notes: self.notes,
            is_dub: self.is_dub,
            is_rebroadcast: self.is_rebroadcast,
        }
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
