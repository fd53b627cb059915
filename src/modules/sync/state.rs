//! Resume state for the sync drivers, persisted as small JSON files so
//! interrupted runs pick up where they stopped.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::errors::{AppError, AppResult};

/// Snapshot of the last master list sync, including the HTTP validators
/// needed for conditional refetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterListState {
    #[serde(rename = "masterListId")]
    pub master_list_id: String,
    pub amq_ids: Vec<i64>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub updated_at: i64,
}

impl MasterListState {
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            AppError::SerializationError(format!(
                "Corrupt sync state at {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        write_json(path, self)
    }
}

/// Scrape progress: the set of AMQ song ids already imported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeState {
    pub done: BTreeSet<i64>,
}

impl ScrapeState {
    /// A missing or unreadable file starts a fresh scrape instead of
    /// failing the run.
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn mark_done(&mut self, amq_id: i64) {
        self.done.insert(amq_id);
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        write_json(path, self)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}
