use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::modules::library::domain::{rating_id, Rating};
use crate::schema::library_entry;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = library_entry, primary_key(user_id, song_id))]
pub struct LibraryEntryModel {
    pub user_id: Uuid,
    pub song_id: Uuid,
    pub amq_song_id: Option<i32>,
    pub score: i16,
    pub is_favorite: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LibraryEntryModel {
    pub fn into_entity(self) -> Rating {
        Rating {
            id: rating_id(self.user_id, self.song_id),
            user_id: self.user_id,
            song_id: self.song_id,
            amq_song_id: self.amq_song_id,
            score: self.score,
            is_favorite: self.is_favorite,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
