use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

use crate::modules::library::domain::{LibraryFilter, LibraryRepository, Rating, RatingInput};
use crate::schema::library_entry;
use crate::shared::errors::AppResult;
use crate::shared::Database;

use super::models::LibraryEntryModel;

pub struct LibraryRepositoryImpl {
    db: Arc<Database>,
}

impl LibraryRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LibraryRepository for LibraryRepositoryImpl {
    async fn upsert(&self, user_id: Uuid, song_id: Uuid, input: RatingInput) -> AppResult<Rating> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<LibraryEntryModel> {
            let mut conn = db.get_connection()?;
            let now = Utc::now();
            let m = diesel::insert_into(library_entry::table)
                .values((
                    library_entry::user_id.eq(user_id),
                    library_entry::song_id.eq(song_id),
                    library_entry::amq_song_id.eq(input.amq_song_id),
                    library_entry::score.eq(input.score),
                    library_entry::is_favorite.eq(input.is_favorite),
                    library_entry::note.eq(input.note.clone()),
                ))
                .on_conflict((library_entry::user_id, library_entry::song_id))
                .do_update()
                .set((
                    library_entry::amq_song_id.eq(input.amq_song_id),
                    library_entry::score.eq(input.score),
                    library_entry::is_favorite.eq(input.is_favorite),
                    library_entry::note.eq(input.note),
                    library_entry::updated_at.eq(now),
                ))
                .get_result::<LibraryEntryModel>(&mut conn)?;
            Ok(m)
        })
        .await??;

        Ok(model.into_entity())
    }

    async fn find(&self, user_id: Uuid, song_id: Uuid) -> AppResult<Option<Rating>> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<Option<LibraryEntryModel>> {
            let mut conn = db.get_connection()?;
            let m = library_entry::table
                .find((user_id, song_id))
                .first::<LibraryEntryModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(LibraryEntryModel::into_entity))
    }

    async fn list(&self, user_id: Uuid, filter: LibraryFilter) -> AppResult<Vec<Rating>> {
        let db = Arc::clone(&self.db);

        let models = task::spawn_blocking(move || -> AppResult<Vec<LibraryEntryModel>> {
            let mut conn = db.get_connection()?;

            let mut query = library_entry::table
                .filter(library_entry::user_id.eq(user_id))
                .into_boxed();

            if let Some(min_score) = filter.min_score {
                query = query.filter(library_entry::score.ge(min_score));
            }
            if let Some(is_favorite) = filter.is_favorite {
                query = query.filter(library_entry::is_favorite.eq(is_favorite));
            }

            let rows = query
                .order(library_entry::updated_at.desc())
                .offset(filter.offset.max(0))
                .limit(filter.limit.clamp(1, 200))
                .load::<LibraryEntryModel>(&mut conn)?;
            Ok(rows)
        })
        .await??;

        Ok(models.into_iter().map(LibraryEntryModel::into_entity).collect())
    }

    async fn remove(&self, user_id: Uuid, song_id: Uuid) -> AppResult<bool> {
        let db = Arc::clone(&self.db);

        let deleted = task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = db.get_connection()?;
            let n = diesel::delete(library_entry::table.find((user_id, song_id)))
                .execute(&mut conn)?;
            Ok(n)
        })
        .await??;

        Ok(deleted > 0)
    }
}
