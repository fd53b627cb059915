//! Import orchestration across AniList, AniSongDB, and the catalog store.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::modules::catalog::domain::{
    Anime, CatalogRepository, CreditRole, LinkUsage, People, Song, SongAnimeLink,
};
use crate::modules::provider::anilist::map_media_to_anime_fields;
use crate::modules::provider::anisongdb::SongEntry;
use crate::modules::provider::{AnimeMetadataSource, SongFeedSource};
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_info, log_warn};

use super::reconciler::{credit_names, dedupe_rows, prepare_row, row_matches_anime};
use super::resolver::EntityResolver;

pub struct ImportService {
    repo: Arc<dyn CatalogRepository>,
    resolver: EntityResolver,
    anilist: Arc<dyn AnimeMetadataSource>,
    anisongdb: Arc<dyn SongFeedSource>,
}

impl ImportService {
    pub fn new(
        repo: Arc<dyn CatalogRepository>,
        anilist: Arc<dyn AnimeMetadataSource>,
        anisongdb: Arc<dyn SongFeedSource>,
    ) -> Self {
        Self {
            resolver: EntityResolver::new(repo.clone()),
            repo,
            anilist,
            anisongdb,
        }
    }

    /// Fetches an anime from AniList and upserts it. Idempotent: a row
    /// already holding this AniList id is refreshed, with `linked_ids`
    /// merged rather than replaced.
    pub async fn import_anime_from_anilist(&self, anilist_id: i64) -> AppResult<Anime> {
        let media = self
            .anilist
            .fetch_anime_by_id(anilist_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("AniList has no media with id {}", anilist_id))
            })?;

        let fields = map_media_to_anime_fields(&media);
        let anime = self
            .resolver
            .upsert_anime_by_anilist_id(anilist_id, fields)
            .await?;

        log_info!(
            "Imported anime {} from AniList id {}",
            anime.title_romaji.as_deref().unwrap_or("(untitled)"),
            anilist_id
        );
        Ok(anime)
    }

    /// Pulls every song usage AniSongDB knows for an anime and reconciles
    /// songs, appearance links, and credits. Returns the distinct songs
    /// linked to the anime after the import.
    pub async fn import_songs_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<Song>> {
        let anime = self
            .repo
            .find_anime(anime_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("anime {} not found", anime_id)))?;

        let rows = self.fetch_rows_for_anime(&anime).await?;
        if rows.is_empty() {
            log_debug!("AniSongDB returned no usable rows for anime {}", anime_id);
            return Ok(Vec::new());
        }

        let mut imported = 0usize;
        for row in dedupe_rows(rows) {
            if self.ingest_row_for_anime(&row, &anime).await?.is_some() {
                imported += 1;
            }
        }
        log_info!("Reconciled {} song usages for anime {}", imported, anime_id);

        self.repo.songs_for_anime(anime_id).await
    }

    /// Songs linked to an anime, importing them first if the catalog has
    /// none yet and `import_if_missing` is set.
    pub async fn songs_for_anime(
        &self,
        anime_id: Uuid,
        import_if_missing: bool,
    ) -> AppResult<Vec<Song>> {
        if import_if_missing && !self.repo.anime_has_songs(anime_id).await? {
            return self.import_songs_for_anime(anime_id).await;
        }
        self.repo.songs_for_anime(anime_id).await
    }

    /// Appearance links for an anime, ordered by sequence then use type.
    pub async fn song_links(&self, anime_id: Uuid) -> AppResult<Vec<SongAnimeLink>> {
        self.repo.links_for_anime(anime_id).await
    }

    /// Imports one AMQ song: creates the song (recording its AMQ id),
    /// upserts every anime it appears in, and links and credits them all.
    /// Returns the song and the distinct anime touched.
    pub async fn import_by_amq_song_id(&self, amq_song_id: i64) -> AppResult<(Song, Vec<Anime>)> {
        let rows = self.anisongdb.fetch_by_amq_song_ids(&[amq_song_id]).await?;
        let rows = dedupe_rows(rows);

        let mut song: Option<Song> = None;
        let mut animes: Vec<Anime> = Vec::new();
        let mut seen_anime: HashSet<Uuid> = HashSet::new();

        for row in &rows {
            let anime = self.resolver.resolve_anime_for_row(row).await?;
            match self.ingest_row_for_anime(row, &anime).await? {
                Some(row_song) => {
                    if song.is_none() {
                        song = Some(row_song);
                    }
                    if seen_anime.insert(anime.id) {
                        animes.push(anime);
                    }
                }
                None => continue,
            }
        }

        let song = song.ok_or_else(|| {
            AppError::NotFound(format!("AMQ song {} not found in AniSongDB", amq_song_id))
        })?;

        log_info!(
            "Imported AMQ song {} ({}) across {} anime",
            amq_song_id,
            song.name,
            animes.len()
        );
        Ok((song, animes))
    }

    /// Deep person import: upserts the person (and group members) from
    /// their AniSongDB id, optionally pulling in every song they are
    /// credited on together with the anime those songs appear in.
    pub async fn import_person_deep(
        &self,
        anisongdb_id: i64,
        import_songs: bool,
    ) -> AppResult<People> {
        let rows = self.anisongdb.fetch_by_artist_ids(&[anisongdb_id]).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "AniSongDB has no artist with id {}",
                anisongdb_id
            )));
        }

        // Find the credit object carrying this artist's metadata.
        let artist = rows
            .iter()
            .flat_map(|r| r.artists.iter().chain(&r.composers).chain(&r.arrangers))
            .find(|a| a.id == Some(anisongdb_id))
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "AniSongDB rows for artist {} carry no matching credit",
                    anisongdb_id
                ))
            })?;

        let person = self
            .resolver
            .upsert_person_from_artist_entry(&artist)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput(format!("AniSongDB artist {} has no name", anisongdb_id))
            })?;

        if import_songs {
            let mut imported = 0usize;
            for row in dedupe_rows(rows) {
                let anime = self.resolver.resolve_anime_for_row(&row).await?;
                if self.ingest_row_for_anime(&row, &anime).await?.is_some() {
                    imported += 1;
                }
            }
            log_info!(
                "Imported {} song usages while importing person {}",
                imported,
                person.primary_name
            );
        }

        Ok(person)
    }

    /// AniSongDB rows for an anime: by MAL id when one is linked,
    /// otherwise by title search filtered to verified hits.
    async fn fetch_rows_for_anime(&self, anime: &Anime) -> AppResult<Vec<SongEntry>> {
        if let Some(mal_id) = anime.linked_id("myanimelist") {
            return self.anisongdb.fetch_by_mal_ids(&[mal_id]).await;
        }

        let mut results = Vec::new();
        for title in [&anime.title_en, &anime.title_romaji, &anime.title_jp]
            .into_iter()
            .flatten()
        {
            let hits = self.anisongdb.search_by_title(title).await?;
            results.extend(hits.into_iter().filter(|r| row_matches_anime(r, anime)));
        }
        Ok(results)
    }

    /// Reconciles one feed row against a known anime: song, credits, and
    /// the appearance link. Returns the song, or `None` when the row is
    /// not representable (missing title, unknown use type).
    async fn ingest_row_for_anime(
        &self,
        row: &SongEntry,
        anime: &Anime,
    ) -> AppResult<Option<Song>> {
        let Some(prepared) = prepare_row(row) else {
            log_debug!(
                "Skipping feed row without usable title/type (annSongId {:?})",
                row.ann_song_id
            );
            return Ok(None);
        };

        let song = self
            .resolver
            .get_or_create_song(&prepared.title, &prepared.audio, prepared.amq_song_id)
            .await?;

        self.ingest_credits(row, song.id).await?;

        self.repo
            .upsert_link(LinkUsage {
                song_id: song.id,
                anime_id: anime.id,
                use_type: prepared.use_type,
                sequence: prepared.sequence,
                notes: Some(prepared.notes),
                is_dub: prepared.is_dub,
                is_rebroadcast: prepared.is_rebroadcast,
            })
            .await?;

        Ok(Some(song))
    }

    /// Records artist/composer/arranger credits for a song. Structured
    /// credit objects keep their AniSongDB identity; string fallbacks only
    /// carry names.
    async fn ingest_credits(&self, row: &SongEntry, song_id: Uuid) -> AppResult<()> {
        let roles = [
            (CreditRole::Artist, &row.artists, row.song_artist.as_deref()),
            (CreditRole::Composer, &row.composers, row.song_composer.as_deref()),
            (CreditRole::Arranger, &row.arrangers, row.song_arranger.as_deref()),
        ];

        for (role, structured, combined) in roles {
            if !structured.is_empty() {
                for artist in structured.iter() {
                    match self.resolver.upsert_person_from_artist_entry(artist).await? {
                        Some(person) => {
                            self.repo.ensure_credit(song_id, person.id, role).await?;
                        }
                        None => {
                            log_warn!("Skipping unnamed {} credit on song {}", role, song_id)
                        }
                    }
                }
            } else {
                for name in credit_names(structured, combined) {
                    let person = self.resolver.get_or_create_person(&name).await?;
                    self.repo.ensure_credit(song_id, person.id, role).await?;
                }
            }
        }
        Ok(())
    }
}
