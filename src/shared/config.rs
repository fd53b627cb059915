use crate::shared::errors::{AppError, AppResult};
use std::env;

/// Runtime settings sourced from the environment (.env supported via dotenvy).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    /// Base URL of the AniSongDB API, e.g. "https://anisongdb.com/api".
    /// Optional: importers that need it fail with a ConfigError when unset.
    pub anisongdb_base_url: Option<String>,
    /// Pacing for AniList calls (requests per second).
    pub anilist_rps: f64,
    /// Pacing for AniSongDB calls, intentionally slower than AniList.
    pub anisongdb_rps: f64,
}

impl Settings {
    pub fn from_env() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL").map_err(|_| {
            AppError::ConfigError("DATABASE_URL environment variable not found".to_string())
        })?;

        let anisongdb_base_url = env::var("ANISONGDB_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let anilist_rps = Self::env_f64("ANILIST_RPS", 0.45)?;
        let anisongdb_rps = Self::env_f64("ANISONGDB_RPS", 0.20)?;

        Ok(Self {
            database_url,
            anisongdb_base_url,
            anilist_rps,
            anisongdb_rps,
        })
    }

    pub fn require_anisongdb_base(&self) -> AppResult<&str> {
        self.anisongdb_base_url.as_deref().ok_or_else(|| {
            AppError::ConfigError(
                "Set ANISONGDB_BASE_URL (e.g. https://host/api)".to_string(),
            )
        })
    }

    fn env_f64(key: &str, default: f64) -> AppResult<f64> {
        match env::var(key) {
            Ok(raw) => raw.parse::<f64>().map_err(|_| {
                AppError::ConfigError(format!("{} must be a number, got '{}'", key, raw))
            }),
            Err(_) => Ok(default),
        }
    }
}
