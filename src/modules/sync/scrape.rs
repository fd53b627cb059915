//! Full scrape of a saved AMQ master list file into the catalog.
//!
//! Unlike the delta sync this walks every song id, resuming from a state
//! file so interrupted runs don't repeat finished work.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::log_info;
use crate::modules::importer::ImportService;
use crate::modules::provider::amq::MasterList;
use crate::shared::errors::{AppError, AppResult};

use super::progress::ProgressCounts;
use super::state::ScrapeState;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Concurrent import workers; keep small to stay polite.
    pub concurrency: usize,
    /// Base delay before each import, per worker.
    pub base_sleep: Duration,
    /// Fractional jitter around the base delay (0.0..=1.0).
    pub jitter: f64,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            concurrency: 2,
            base_sleep: Duration::from_secs(1),
            jitter: 0.4,
        }
    }
}

pub struct MasterListScrape<'a> {
    importer: &'a ImportService,
    options: ScrapeOptions,
}

struct ScrapeShared {
    counts: ProgressCounts,
    state: Mutex<ScrapeState>,
    state_path: PathBuf,
}

impl<'a> MasterListScrape<'a> {
    pub fn new(importer: &'a ImportService, options: ScrapeOptions) -> Self {
        Self { importer, options }
    }

    /// Scrapes every song id in the master list file, skipping ids already
    /// recorded in the resume state. Returns the number imported this run.
    pub async fn run(
        &self,
        master_list_file: &Path,
        resume_state: &Path,
        cancel: CancellationToken,
    ) -> AppResult<usize> {
        let text = std::fs::read_to_string(master_list_file)?;
        let master: MasterList = serde_json::from_str(&text).map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to parse master list file {}: {}",
                master_list_file.display(),
                e
            ))
        })?;

        let all_ids = master.unique_song_ids();
        let state = ScrapeState::load(resume_state);
        let remaining: Vec<i64> = all_ids
            .iter()
            .copied()
            .filter(|id| !state.done.contains(id))
            .collect();

        log_info!(
            "Found {} unique AMQ song ids; {} done, {} to go",
            all_ids.len(),
            state.done.len(),
            remaining.len()
        );

        let shared = Arc::new(ScrapeShared {
            counts: ProgressCounts::new(remaining.len()),
            state: Mutex::new(state),
            state_path: resume_state.to_path_buf(),
        });

        let heartbeat = {
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(Duration::from_secs(5));
                tick.tick().await;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tick.tick() => shared.counts.log_heartbeat(),
                    }
                }
            })
        };

        stream::iter(remaining)
            .for_each_concurrent(self.options.concurrency.max(1), |amq_id| {
                let shared = Arc::clone(&shared);
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return;
                    }
                    self.polite_sleep().await;
                    if cancel.is_cancelled() {
                        return;
                    }

                    match self.importer.import_by_amq_song_id(amq_id).await {
                        Ok(_) => {
                            shared.counts.ok.fetch_add(1, Ordering::Relaxed);
                            shared.flush_done(amq_id).await;
                        }
                        Err(AppError::NotFound(_)) => {
                            // The feed no longer knows the song; don't retry
                            // on future runs.
                            shared.counts.skipped.fetch_add(1, Ordering::Relaxed);
                            shared.flush_done(amq_id).await;
                        }
                        Err(e) => {
                            log::warn!("Import of AMQ song {} failed: {}", amq_id, e);
                            shared.counts.errors.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
            .await;

        heartbeat.abort();
        shared.counts.log_heartbeat();

        if cancel.is_cancelled() {
            log_info!("Scrape interrupted; progress saved for resume");
        } else {
            log_info!("Scrape complete");
        }

        Ok(shared.counts.ok.load(Ordering::Relaxed))
    }

    async fn polite_sleep(&self) {
        let base = self.options.base_sleep.as_secs_f64();
        if base <= 0.0 {
            return;
        }
        let delta = base * self.options.jitter.clamp(0.0, 1.0);
        let secs = rand::thread_rng().gen_range((base - delta).max(0.0)..=base + delta);
        sleep(Duration::from_secs_f64(secs)).await;
    }
}

impl ScrapeShared {
    /// Records an id as finished and flushes the state file so a crash
    /// between items never loses progress.
    async fn flush_done(&self, amq_id: i64) {
        let mut state = self.state.lock().await;
        state.mark_done(amq_id);
        if let Err(e) = state.save(&self.state_path) {
            log::warn!("Failed to persist scrape state: {}", e);
        }
    }
}
