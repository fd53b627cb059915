//! Library use cases: rating songs and browsing the result.

use std::sync::Arc;

use uuid::Uuid;

use crate::log_debug;
use crate::modules::catalog::domain::CatalogRepository;
use crate::modules::library::domain::{LibraryFilter, LibraryRepository, Rating, RatingInput};
use crate::shared::errors::{AppError, AppResult};

pub const MIN_SCORE: i16 = 0;
pub const MAX_SCORE: i16 = 100;

pub struct LibraryService {
    library: Arc<dyn LibraryRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl LibraryService {
    pub fn new(library: Arc<dyn LibraryRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { library, catalog }
    }

    /// Rate a song for a user, creating or replacing the rating. The
    /// song's AMQ id is denormalized onto the entry so library rows stay
    /// useful without a catalog join.
    pub async fn upsert_rating(
        &self,
        user_id: Uuid,
        song_id: Uuid,
        score: i16,
        is_favorite: bool,
        note: Option<String>,
    ) -> AppResult<Rating> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(AppError::ValidationError(format!(
                "score must be between {} and {}, got {}",
                MIN_SCORE, MAX_SCORE, score
            )));
        }

        let song = self
            .catalog
            .find_song(song_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("song {} not found", song_id)))?;

        let rating = self
            .library
            .upsert(
                user_id,
                song_id,
                RatingInput {
                    score,
                    is_favorite,
                    note,
                    amq_song_id: song.amq_song_id,
                },
            )
            .await?;

        log_debug!("Stored rating {} for song {}", rating.score, song_id);
        Ok(rating)
    }

    pub async fn get_rating(&self, user_id: Uuid, song_id: Uuid) -> AppResult<Rating> {
        self.library
            .find(user_id, song_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no rating for song {}", song_id)))
    }

    /// The user's library, newest updates first, with optional score and
    /// favorite filters.
    pub async fn list_library(
        &self,
        user_id: Uuid,
        filter: LibraryFilter,
    ) -> AppResult<Vec<Rating>> {
        if let Some(min_score) = filter.min_score {
            if !(MIN_SCORE..=MAX_SCORE).contains(&min_score) {
                return Err(AppError::ValidationError(format!(
                    "min_score must be between {} and {}, got {}",
                    MIN_SCORE, MAX_SCORE, min_score
                )));
            }
        }
        self.library.list(user_id, filter).await
    }

    pub async fn remove_rating(&self, user_id: Uuid, song_id: Uuid) -> AppResult<()> {
        if self.library.remove(user_id, song_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("no rating for song {}", song_id)))
        }
    }
}
