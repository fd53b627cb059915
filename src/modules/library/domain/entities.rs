use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's rating of a song. The `id` is deterministic (UUIDv5 over the
/// user/song pair) so callers can address ratings without a surrogate key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub song_id: Uuid,
    pub amq_song_id: Option<i32>,
    pub score: i16,
    pub is_favorite: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stable rating id derived from the owning pair.
pub fn rating_id(user_id: Uuid, song_id: Uuid) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("library:{}:{}", user_id, song_id).as_bytes(),
    )
}

/// Values written by an upsert; timestamps and id are derived.
#[derive(Debug, Clone)]
pub struct RatingInput {
    pub score: i16,
    pub is_favorite: bool,
    pub note: Option<String>,
    pub amq_song_id: Option<i32>,
}

/// Filters for listing a user's library.
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    pub min_score: Option<i16>,
    pub is_favorite: Option<bool>,
    pub offset: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_id_is_deterministic_and_pair_sensitive() {
        let user = Uuid::new_v4();
        let song_a = Uuid::new_v4();
        let song_b = Uuid::new_v4();

        assert_eq!(rating_id(user, song_a), rating_id(user, song_a));
        assert_ne!(rating_id(user, song_a), rating_id(user, song_b));
        assert_ne!(rating_id(user, song_a), rating_id(song_a, user));
    }
}
