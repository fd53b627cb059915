use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::errors::AppResult;

use super::entities::{LibraryFilter, Rating, RatingInput};

/// Storage port for per-user song ratings.
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    /// Insert or update the rating for a user/song pair.
    async fn upsert(&self, user_id: Uuid, song_id: Uuid, input: RatingInput) -> AppResult<Rating>;

    async fn find(&self, user_id: Uuid, song_id: Uuid) -> AppResult<Option<Rating>>;

    /// The user's ratings, most recently updated first.
    async fn list(&self, user_id: Uuid, filter: LibraryFilter) -> AppResult<Vec<Rating>>;

    /// Remove a rating; `Ok(false)` when there was nothing to remove.
    async fn remove(&self, user_id: Uuid, song_id: Uuid) -> AppResult<bool>;
}
