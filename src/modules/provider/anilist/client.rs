//! AniList GraphQL client.

use async_trait::async_trait;
use serde_json::json;

use super::dto::{GraphQlResponse, Media, MediaData, PageData};
use super::queries::{ANILIST_URL, ANIME_QUERY, TOP_IDS_PAGE_SIZE, TOP_IDS_QUERY};
use crate::modules::provider::http_client::RateLimitClient;
use crate::modules::provider::AnimeMetadataSource;
use crate::shared::errors::{AppError, AppResult};

pub struct AniListClient {
    http: RateLimitClient,
}

impl AniListClient {
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            http: RateLimitClient::for_anilist(requests_per_second),
        }
    }

    /// Fetch the top `limit` AniList ids by popularity, paging until
    /// exhausted.
    pub async fn fetch_top_ids(&self, limit: usize) -> AppResult<Vec<i64>> {
        let mut ids = Vec::with_capacity(limit);
        let mut page = 1;

        while ids.len() < limit {
            let body = json!({
                "query": TOP_IDS_QUERY,
                "variables": { "page": page, "perPage": TOP_IDS_PAGE_SIZE },
            });

            let response: GraphQlResponse<PageData> =
                self.http.post_json(ANILIST_URL, &body).await?;
            if let Some(err) = response.errors.first() {
                return Err(AppError::ApiError(format!(
                    "AniList ranking page {} failed: {}",
                    page, err.message
                )));
            }

            let data = response.data.ok_or_else(|| {
                AppError::ApiError(format!("AniList ranking page {} returned no data", page))
            })?;

            ids.extend(data.page.media.iter().map(|m| m.id));
            log::debug!("AniList ranking page {} fetched ({} ids total)", page, ids.len());

            if !data.page.page_info.has_next_page {
                break;
            }
            page += 1;
        }

        ids.truncate(limit);
        Ok(ids)
    }

    fn check_errors(errors: &[super::dto::GraphQlError], anilist_id: i64) -> AppResult<()> {
        // AniList reports unknown ids as a GraphQL "Not Found" error with
        // a null data payload; callers see that as Ok(None) instead.
        match errors.first() {
            None => Ok(()),
            Some(e) if e.message.eq_ignore_ascii_case("not found.") => Ok(()),
            Some(e) => Err(AppError::ApiError(format!(
                "AniList query for media {} failed: {}",
                anilist_id, e.message
            ))),
        }
    }
}

#[async_trait]
impl AnimeMetadataSource for AniListClient {
    /// Fetch a single anime by AniList id. `Ok(None)` means AniList has no
    /// media with that id.
    async fn fetch_anime_by_id(&self, anilist_id: i64) -> AppResult<Option<Media>> {
        let body = json!({
            "query": ANIME_QUERY,
            "variables": { "id": anilist_id },
        });

        let response: GraphQlResponse<MediaData> =
            self.http.post_json(ANILIST_URL, &body).await?;
        Self::check_errors(&response.errors, anilist_id)?;

        Ok(response.data.and_then(|d| d.media))
    }
}
