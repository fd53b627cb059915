//! Client for the AMQ library master list feed.

use super::dto::MasterList;
use crate::modules::provider::http_client::RateLimitClient;
use crate::shared::errors::{AppError, AppResult};

pub const MASTER_LIST_URL: &str = "https://animemusicquiz.com/libraryMasterList";

/// Outcome of a conditional master list fetch.
pub enum MasterListFetch {
    /// The cached copy is still current.
    NotModified,
    /// A fresh document, with the validators to send next time.
    Fetched {
        master: MasterList,
        etag: Option<String>,
        last_modified: Option<String>,
    },
}

pub struct AmqClient {
    http: RateLimitClient,
    url: String,
}

impl AmqClient {
    pub fn new() -> Self {
        Self {
            http: RateLimitClient::for_amq(),
            url: MASTER_LIST_URL.to_string(),
        }
    }

    /// Fetch the master list, honoring HTTP caching. Pass the validators
    /// saved from the previous fetch; a 304 comes back as `NotModified`.
    pub async fn fetch_master_list(
        &self,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> AppResult<MasterListFetch> {
        let mut headers = Vec::new();
        if let Some(etag) = etag {
            headers.push(("If-None-Match", etag.to_string()));
        }
        if let Some(last_modified) = last_modified {
            headers.push(("If-Modified-Since", last_modified.to_string()));
        }

        let response = self.http.get_raw(&self.url, &headers).await?;

        if response.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(MasterListFetch::NotModified);
        }

        let etag = header_value(&response, "etag");
        let last_modified = header_value(&response, "last-modified");

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ApiError(format!("Failed to read AMQ master list: {}", e)))?;
        let master: MasterList = serde_json::from_str(&body).map_err(|e| {
            AppError::SerializationError(format!("Failed to parse AMQ master list: {}", e))
        })?;

        Ok(MasterListFetch::Fetched {
            master,
            etag,
            last_modified,
        })
    }
}

impl Default for AmqClient {
    fn default() -> Self {
        Self::new()
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
