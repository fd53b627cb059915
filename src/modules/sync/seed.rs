//! Seeds the catalog from the top of the AniList popularity ranking.
//!
//! Two phases: import the anime (with their songs), then deep-import
//! every person credited on those songs.

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::log_info;
use crate::modules::catalog::domain::CatalogRepository;
use crate::modules::importer::ImportService;
use crate::modules::provider::anilist::AniListClient;
use crate::shared::errors::{AppError, AppResult};

use super::progress::ProgressCounts;

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// How many ranking entries to walk.
    pub limit: usize,
    /// Concurrent import workers per phase.
    pub concurrency: usize,
    /// Also re-import each person's full song list (slow; off by default).
    pub deep_person_songs: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            limit: 5000,
            concurrency: 8,
            deep_person_songs: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub anime_imported: usize,
    pub anime_errors: usize,
    pub people_imported: usize,
    pub people_errors: usize,
}

pub struct SeedDriver<'a> {
    anilist: &'a AniListClient,
    importer: &'a ImportService,
    repo: Arc<dyn CatalogRepository>,
    options: SeedOptions,
}

impl<'a> SeedDriver<'a> {
    pub fn new(
        anilist: &'a AniListClient,
        importer: &'a ImportService,
        repo: Arc<dyn CatalogRepository>,
        options: SeedOptions,
    ) -> Self {
        Self {
            anilist,
            importer,
            repo,
            options,
        }
    }

    pub async fn run(&self) -> AppResult<SeedSummary> {
        let top_ids = self.anilist.fetch_top_ids(self.options.limit).await?;
        if top_ids.is_empty() {
            log_info!("AniList ranking returned no ids; nothing to seed");
            return Ok(SeedSummary::default());
        }
        log_info!("Seeding from {} ranked anime", top_ids.len());

        // Phase 1: anime and their songs, collecting credited people.
        let total_anime = top_ids.len();
        let anime_counts = ProgressCounts::new(total_anime);
        let people_ids: Mutex<BTreeSet<i64>> = Mutex::new(BTreeSet::new());

        stream::iter(top_ids.iter().copied())
            .for_each_concurrent(self.options.concurrency.max(1), |anilist_id| {
                let counts = &anime_counts;
                let people_ids = &people_ids;
                async move {
                    match self.seed_one_anime(anilist_id).await {
                        Ok(found) => {
                            counts.ok.fetch_add(1, Ordering::Relaxed);
                            if !found.is_empty() {
                                people_ids.lock().await.extend(found);
                            }
                        }
                        Err(AppError::NotFound(_)) => {
                            counts.skipped.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            log::warn!("Seeding AniList id {} failed: {}", anilist_id, e);
                            counts.errors.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    if counts.done() % 25 == 0 || counts.done() == total_anime {
                        counts.log_heartbeat();
                    }
                }
            })
            .await;

        let people_ids = people_ids.into_inner();
        log_info!(
            "Anime phase done; {} unique credited people found",
            people_ids.len()
        );

        // Phase 2: deep-import the credited people.
        let people_counts = ProgressCounts::new(people_ids.len());
        stream::iter(people_ids.iter().copied())
            .for_each_concurrent(self.options.concurrency.max(1), |anisongdb_id| {
                let counts = &people_counts;
                let total = people_ids.len();
                async move {
                    match self
                        .importer
                        .import_person_deep(anisongdb_id, self.options.deep_person_songs)
                        .await
                    {
                        Ok(_) => counts.ok.fetch_add(1, Ordering::Relaxed),
                        Err(AppError::NotFound(_)) => {
                            counts.skipped.fetch_add(1, Ordering::Relaxed)
                        }
                        Err(e) => {
                            log::warn!("Importing person {} failed: {}", anisongdb_id, e);
                            counts.errors.fetch_add(1, Ordering::Relaxed)
                        }
                    };
                    if counts.done() % 25 == 0 || counts.done() == total {
                        counts.log_heartbeat();
                    }
                }
            })
            .await;

        let summary = SeedSummary {
            anime_imported: anime_counts.ok.load(Ordering::Relaxed),
            anime_errors: anime_counts.errors.load(Ordering::Relaxed),
            people_imported: people_counts.ok.load(Ordering::Relaxed),
            people_errors: people_counts.errors.load(Ordering::Relaxed),
        };
        log_info!(
            "Seeding finished: anime {}/{} (errors {}), people {}/{} (errors {})",
            summary.anime_imported,
            top_ids.len(),
            summary.anime_errors,
            summary.people_imported,
            people_ids.len(),
            summary.people_errors
        );
        Ok(summary)
    }

    /// Imports one ranked anime with its songs and returns the AniSongDB
    /// ids of the people credited on them.
    async fn seed_one_anime(&self, anilist_id: i64) -> AppResult<BTreeSet<i64>> {
        let anime = self.importer.import_anime_from_anilist(anilist_id).await?;
        let songs = self.importer.songs_for_anime(anime.id, true).await?;
        if songs.is_empty() {
            return Ok(BTreeSet::new());
        }

        let song_ids: Vec<Uuid> = songs.iter().map(|s| s.id).collect();
        let people = self.repo.credited_people_for_songs(&song_ids).await?;
        Ok(people
            .into_iter()
            .filter_map(|p| p.anisongdb_id.map(i64::from))
            .collect())
    }
}
