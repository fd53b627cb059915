//! Delta sync of the AMQ master list into the catalog.
//!
//! Fetches the list with HTTP validators, diffs the song ids against the
//! previous run, and imports only the additions at a polite pace.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::log_info;
use crate::modules::importer::ImportService;
use crate::modules::provider::amq::{AmqClient, MasterListFetch};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::RateLimiter;

use super::progress::ProgressCounts;
use super::state::MasterListState;

pub struct MasterListSync<'a> {
    amq: &'a AmqClient,
    importer: &'a ImportService,
    /// Import requests per second against the providers.
    target_rps: f64,
}

impl<'a> MasterListSync<'a> {
    pub fn new(amq: &'a AmqClient, importer: &'a ImportService, target_rps: f64) -> Self {
        Self {
            amq,
            importer,
            target_rps: target_rps.max(0.1),
        }
    }

    /// Runs one sync cycle. Returns the number of songs imported (0 when
    /// the list was unchanged).
    pub async fn run(&self, state_path: &Path) -> AppResult<usize> {
        let state = MasterListState::load(state_path)?;

        let fetch = self
            .amq
            .fetch_master_list(state.etag.as_deref(), state.last_modified.as_deref())
            .await?;

        let (master, etag, last_modified) = match fetch {
            MasterListFetch::NotModified => {
                log_info!("Master list unchanged (304 Not Modified)");
                return Ok(0);
            }
            MasterListFetch::Fetched {
                master,
                etag,
                last_modified,
            } => (master, etag, last_modified),
        };

        let old_ids: HashSet<i64> = state.amq_ids.iter().copied().collect();
        let new_ids = master.unique_song_ids();
        let to_add: Vec<i64> = new_ids
            .iter()
            .copied()
            .filter(|id| !old_ids.contains(id))
            .collect();

        let old_version = if state.master_list_id.is_empty() {
            "(none)".to_string()
        } else {
            state.master_list_id.clone()
        };
        log_info!(
            "Master {} -> {}. New songs: +{}",
            old_version,
            master.version(),
            to_add.len()
        );

        let new_state = MasterListState {
            master_list_id: master.version(),
            amq_ids: new_ids,
            etag,
            last_modified,
            updated_at: chrono::Utc::now().timestamp(),
        };

        if to_add.is_empty() {
            new_state.save(state_path)?;
            log_info!("Nothing to import. Sync complete.");
            return Ok(0);
        }

        let counts = ProgressCounts::new(to_add.len());
        let pacer = RateLimiter::new(self.target_rps);
        let mut last_heartbeat = std::time::Instant::now();

        for amq_id in &to_add {
            pacer.wait().await;

            match self.importer.import_by_amq_song_id(*amq_id).await {
                Ok(_) => counts.ok.fetch_add(1, Ordering::Relaxed),
                Err(AppError::NotFound(_)) => counts.skipped.fetch_add(1, Ordering::Relaxed),
                Err(e) => {
                    log::warn!("Import of AMQ song {} failed: {}", amq_id, e);
                    counts.errors.fetch_add(1, Ordering::Relaxed)
                }
            };

            if last_heartbeat.elapsed() >= Duration::from_secs(2)
                || counts.done() == to_add.len()
            {
                counts.log_heartbeat();
                last_heartbeat = std::time::Instant::now();
            }

            // Small jitter keeps the cadence from being strictly periodic.
            let jitter =
                rand::thread_rng().gen_range(0.0..pacer.min_interval().as_secs_f64() * 0.2);
            sleep(Duration::from_secs_f64(jitter)).await;
        }

        new_state.save(state_path)?;
        let imported = counts.ok.load(Ordering::Relaxed);
        log_info!("Sync complete: {} imported of {} new", imported, to_add.len());
        Ok(imported)
    }
}
