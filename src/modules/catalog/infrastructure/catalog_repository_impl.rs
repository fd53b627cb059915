use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Jsonb, Nullable, Text};
use diesel::upsert::on_constraint;
use serde_json::{json, Value};
use tokio::task;
use uuid::Uuid;

use crate::modules::catalog::domain::{
    Anime, AnimeFields, CatalogRepository, CreditRole, LinkUsage, NewPerson, People, PersonPatch,
    Song, SongAnimeLink,
};
use crate::schema::{anime, people, people_membership, song, song_anime, song_artist};
use crate::shared::errors::AppResult;
use crate::shared::Database;

use super::models::{AnimeModel, PeopleModel, SongAnimeModel, SongModel};

pub struct CatalogRepositoryImpl {
    db: Arc<Database>,
}

impl CatalogRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    // -------------------------------------------------------------------------
    // Anime
    // -------------------------------------------------------------------------

    async fn find_anime(&self, id: Uuid) -> AppResult<Option<Anime>> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<Option<AnimeModel>> {
            let mut conn = db.get_connection()?;
            let m = anime::table
                .filter(anime::id.eq(id))
                .first::<AnimeModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(AnimeModel::into_entity))
    }

    async fn find_anime_by_linked_id(&self, provider: &str, id: i64) -> AppResult<Option<Anime>> {
        let db = Arc::clone(&self.db);
        let provider = provider.to_string();

        let model = task::spawn_blocking(move || -> AppResult<Option<AnimeModel>> {
            let mut conn = db.get_connection()?;

            // The id may have been stored as a number or a string; match both
            // with jsonb containment (GIN-indexed).
            let mut as_number = serde_json::Map::new();
            as_number.insert(provider.clone(), json!(id));
            let mut as_string = serde_json::Map::new();
            as_string.insert(provider, json!(id.to_string()));

            let pred = sql::<Bool>("linked_ids @> ")
                .bind::<Jsonb, _>(Value::Object(as_number))
                .sql(" OR linked_ids @> ")
                .bind::<Jsonb, _>(Value::Object(as_string));

            let m = anime::table
                .filter(pred)
                .first::<AnimeModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(AnimeModel::into_entity))
    }

    async fn find_anime_by_title(&self, title: &str) -> AppResult<Option<Anime>> {
        let db = Arc::clone(&self.db);
        let title = title.to_string();

        let model = task::spawn_blocking(move || -> AppResult<Option<AnimeModel>> {
            let mut conn = db.get_connection()?;

            let pred = sql::<Bool>("lower(title_en) = lower(")
                .bind::<Text, _>(title.clone())
                .sql(") OR lower(title_jp) = lower(")
                .bind::<Text, _>(title.clone())
                .sql(") OR lower(title_romaji) = lower(")
                .bind::<Text, _>(title)
                .sql(")");

            let m = anime::table
                .filter(pred)
                .first::<AnimeModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(AnimeModel::into_entity))
    }

    async fn insert_anime(&self, fields: AnimeFields) -> AppResult<Anime> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<AnimeModel> {
            let mut conn = db.get_connection()?;
            let m = diesel::insert_into(anime::table)
                .values((
                    anime::id.eq(Uuid::new_v4()),
                    anime::title_en.eq(fields.title_en),
                    anime::title_jp.eq(fields.title_jp),
                    anime::title_romaji.eq(fields.title_romaji),
                    anime::season.eq(fields.season),
                    anime::year.eq(fields.year),
                    anime::anime_type.eq(fields.anime_type),
                    anime::cover_image_url.eq(fields.cover_image_url),
                    anime::linked_ids.eq(Value::Object(fields.linked_ids)),
                ))
                .get_result::<AnimeModel>(&mut conn)?;
            Ok(m)
        })
        .await??;

        Ok(model.into_entity())
    }

    async fn update_anime(&self, id: Uuid, fields: AnimeFields) -> AppResult<Anime> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<AnimeModel> {
            let mut conn = db.get_connection()?;
            // Full replace; the caller merges linked_ids beforehand.
            let m = diesel::update(anime::table.filter(anime::id.eq(id)))
                .set((
                    anime::title_en.eq(fields.title_en),
                    anime::title_jp.eq(fields.title_jp),
                    anime::title_romaji.eq(fields.title_romaji),
                    anime::season.eq(fields.season),
                    anime::year.eq(fields.year),
                    anime::anime_type.eq(fields.anime_type),
                    anime::cover_image_url.eq(fields.cover_image_url),
                    anime::linked_ids.eq(Value::Object(fields.linked_ids)),
                    anime::updated_at.eq(diesel::dsl::now),
                ))
                .get_result::<AnimeModel>(&mut conn)?;
            Ok(m)
        })
        .await??;

        Ok(model.into_entity())
    }

    // -------------------------------------------------------------------------
    // Songs
    // -------------------------------------------------------------------------

    async fn find_song(&self, id: Uuid) -> AppResult<Option<Song>> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<Option<SongModel>> {
            let mut conn = db.get_connection()?;
            let m = song::table
                .filter(song::id.eq(id))
                .first::<SongModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(SongModel::into_entity))
    }

    async fn find_song_by_name(&self, name: &str) -> AppResult<Option<Song>> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();

        let model = task::spawn_blocking(move || -> AppResult<Option<SongModel>> {
            let mut conn = db.get_connection()?;
            let m = song::table
                .filter(song::name.eq(name))
                .first::<SongModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(SongModel::into_entity))
    }

    async fn find_song_by_amq_id(&self, amq_song_id: i32) -> AppResult<Option<Song>> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<Option<SongModel>> {
            let mut conn = db.get_connection()?;
            let m = song::table
                .filter(song::amq_song_id.eq(amq_song_id))
                .first::<SongModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(model.map(SongModel::into_entity))
    }

    async fn insert_song(
        &self,
        name: &str,
        audio: &str,
        amq_song_id: Option<i32>,
    ) -> AppResult<Song> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();
        let audio = audio.to_string();

        let model = task::spawn_blocking(move || -> AppResult<SongModel> {
            let mut conn = db.get_connection()?;
            let m = diesel::insert_into(song::table)
                .values((
                    song::id.eq(Uuid::new_v4()),
                    song::name.eq(name),
                    song::audio.eq(audio),
                    song::amq_song_id.eq(amq_song_id),
                ))
                .get_result::<SongModel>(&mut conn)?;
            Ok(m)
        })
        .await??;

        Ok(model.into_entity())
    }

    async fn set_song_audio(&self, song_id: Uuid, audio: &str) -> AppResult<()> {
        let db = Arc::clone(&self.db);
        let audio = audio.to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            diesel::update(song::table.filter(song::id.eq(song_id)))
                .set((
                    song::audio.eq(audio),
                    song::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await??;

        Ok(())
    }

    async fn set_song_amq_id(&self, song_id: Uuid, amq_song_id: i32) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            diesel::update(song::table.filter(song::id.eq(song_id)))
                .set((
                    song::amq_song_id.eq(amq_song_id),
                    song::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await??;

        Ok(())
    }

    async fn songs_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<Song>> {
        let db = Arc::clone(&self.db);

        let models = task::spawn_blocking(move || -> AppResult<Vec<SongModel>> {
            let mut conn = db.get_connection()?;
            let rows = song::table
                .inner_join(song_anime::table)
                .filter(song_anime::anime_id.eq(anime_id))
                .select(song::all_columns)
                .distinct()
                .order(song::created_at.desc())
                .load::<SongModel>(&mut conn)?;
            Ok(rows)
        })
        .await??;

        Ok(models.into_iter().map(SongModel::into_entity).collect())
    }

    async fn anime_has_songs(&self, anime_id: Uuid) -> AppResult<bool> {
        let db = Arc::clone(&self.db);

        let exists = task::spawn_blocking(move || -> AppResult<bool> {
            let mut conn = db.get_connection()?;
            let found = diesel::select(diesel::dsl::exists(
                song_anime::table.filter(song_anime::anime_id.eq(anime_id)),
            ))
            .get_result::<bool>(&mut conn)?;
            Ok(found)
        })
        .await??;

        Ok(exists)
    }

    async fn links_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<SongAnimeLink>> {
        let db = Arc::clone(&self.db);

        let models = task::spawn_blocking(move || -> AppResult<Vec<SongAnimeModel>> {
            let mut conn = db.get_connection()?;
            let rows = song_anime::table
                .filter(song_anime::anime_id.eq(anime_id))
                .order((
                    song_anime::sequence.asc().nulls_last(),
                    song_anime::use_type.asc(),
                ))
                .load::<SongAnimeModel>(&mut conn)?;
            Ok(rows)
        })
        .await??;

        Ok(models.into_iter().map(SongAnimeModel::into_entity).collect())
    }

    // -------------------------------------------------------------------------
    // People
    // -------------------------------------------------------------------------

    async fn find_person_by_name(&self, primary_name: &str) -> AppResult<Option<People>> {
        let db = Arc::clone(&self.db);
        let primary_name = primary_name.to_string();

        let model = task::spawn_blocking(move || -> AppResult<Option<PeopleModel>> {
            let mut conn = db.get_connection()?;
            let m = people::table
                .filter(people::primary_name.eq(primary_name))
                .first::<PeopleModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        model.map(PeopleModel::into_entity).transpose()
    }

    async fn find_person_by_anisongdb_id(&self, anisongdb_id: i32) -> AppResult<Option<People>> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<Option<PeopleModel>> {
            let mut conn = db.get_connection()?;
            let m = people::table
                .filter(people::anisongdb_id.eq(anisongdb_id))
                .first::<PeopleModel>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        model.map(PeopleModel::into_entity).transpose()
    }

    async fn insert_person(&self, person: NewPerson) -> AppResult<People> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<PeopleModel> {
            let mut conn = db.get_connection()?;
            let m = diesel::insert_into(people::table)
                .values((
                    people::id.eq(Uuid::new_v4()),
                    people::kind.eq(person.kind.as_str()),
                    people::primary_name.eq(person.primary_name),
                    people::alt_names.eq(person.alt_names),
                    people::image_url.eq(person.image_url),
                    people::external_links.eq(Value::Object(person.external_links)),
                    people::anisongdb_id.eq(person.anisongdb_id),
                ))
                .get_result::<PeopleModel>(&mut conn)?;
            Ok(m)
        })
        .await??;

        model.into_entity()
    }

    async fn update_person(&self, id: Uuid, patch: PersonPatch) -> AppResult<People> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<PeopleModel> {
            let mut conn = db.get_connection()?;
            let m = diesel::update(people::table.filter(people::id.eq(id)))
                .set((
                    patch.kind.map(|k| people::kind.eq(k.as_str())),
                    patch.primary_name.map(|n| people::primary_name.eq(n)),
                    patch.alt_names.map(|n| people::alt_names.eq(n)),
                    patch.image_url.map(|u| people::image_url.eq(u)),
                    patch.anisongdb_id.map(|i| people::anisongdb_id.eq(i)),
                    people::updated_at.eq(diesel::dsl::now),
                ))
                .get_result::<PeopleModel>(&mut conn)?;
            Ok(m)
        })
        .await??;

        model.into_entity()
    }

    async fn add_membership(&self, group_id: Uuid, member_id: Uuid) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            diesel::insert_into(people_membership::table)
                .values((
                    people_membership::group_id.eq(group_id),
                    people_membership::member_id.eq(member_id),
                ))
                .on_conflict_do_nothing()
                .execute(&mut conn)?;
            Ok(())
        })
        .await??;

        Ok(())
    }

    async fn credited_people_for_songs(&self, song_ids: &[Uuid]) -> AppResult<Vec<People>> {
        let db = Arc::clone(&self.db);
        let song_ids = song_ids.to_vec();

        let models = task::spawn_blocking(move || -> AppResult<Vec<PeopleModel>> {
            let mut conn = db.get_connection()?;
            let rows = people::table
                .inner_join(song_artist::table)
                .filter(song_artist::song_id.eq_any(song_ids))
                .select(people::all_columns)
                .distinct()
                .load::<PeopleModel>(&mut conn)?;
            Ok(rows)
        })
        .await??;

        models.into_iter().map(PeopleModel::into_entity).collect()
    }

    // -------------------------------------------------------------------------
    // Credits & links
    // -------------------------------------------------------------------------

    async fn ensure_credit(
        &self,
        song_id: Uuid,
        people_id: Uuid,
        role: CreditRole,
    ) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            // PK is (song_id, people_id, role) -> ignore duplicates safely
            diesel::insert_into(song_artist::table)
                .values((
                    song_artist::song_id.eq(song_id),
                    song_artist::people_id.eq(people_id),
                    song_artist::role.eq(role),
                ))
                .on_conflict_do_nothing()
                .execute(&mut conn)?;
            Ok(())
        })
        .await??;

        Ok(())
    }

    async fn upsert_link(&self, usage: LinkUsage) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            // On first insert all values are written. On conflict with the
            // usage key the booleans accumulate truth (never true -> false)
            // and the first non-null notes value sticks.
            diesel::insert_into(song_anime::table)
                .values((
                    song_anime::id.eq(Uuid::new_v4()),
                    song_anime::song_id.eq(usage.song_id),
                    song_anime::anime_id.eq(usage.anime_id),
                    song_anime::use_type.eq(usage.use_type),
                    song_anime::sequence.eq(usage.sequence),
                    song_anime::notes.eq(usage.notes),
                    song_anime::is_dub.eq(usage.is_dub),
                    song_anime::is_rebroadcast.eq(usage.is_rebroadcast),
                ))
                .on_conflict(on_constraint("uq_song_anime_usage"))
                .do_update()
                .set((
                    song_anime::is_dub
                        .eq(sql::<Bool>("song_anime.is_dub OR EXCLUDED.is_dub")),
                    song_anime::is_rebroadcast.eq(sql::<Bool>(
                        "song_anime.is_rebroadcast OR EXCLUDED.is_rebroadcast",
                    )),
                    song_anime::notes.eq(sql::<Nullable<Text>>(
                        "COALESCE(song_anime.notes, EXCLUDED.notes)",
                    )),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await??;

        Ok(())
    }
}
