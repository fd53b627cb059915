//! HTTP client with automatic rate limiting and retry logic
//!
//! All three upstream providers go through this client so throttling,
//! backoff, and 429 handling live in one place.

use super::retry_policy::{is_retryable_error, RateLimitInfo, RetryPolicy};
use crate::shared::errors::{AppError, AppResult};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::sleep;

const USER_AGENT: &str = "utadex/1.0 (catalog import pipeline)";

type DirectRateLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// Rate-limited HTTP client shared by the provider clients
pub struct RateLimitClient {
    client: Client,
    rate_limiter: DirectRateLimiter,
    retry_policy: RetryPolicy,
    user_agent: String,
    provider_name: String,
}

impl RateLimitClient {
    /// Client for the AniList GraphQL API.
    ///
    /// AniList runs in a degraded state (30 req/min); `requests_per_second`
    /// lets sync drivers throttle further below that.
    pub fn for_anilist(requests_per_second: f64) -> Self {
        Self::new(
            "AniList",
            RetryPolicy::anilist(),
            Self::create_rate_limiter(requests_per_second.min(0.5), 2),
            USER_AGENT.to_string(),
        )
    }

    /// Client for AniSongDB. No published limits, so stay well under
    /// anything that could look like abuse.
    pub fn for_anisongdb(requests_per_second: f64) -> Self {
        Self::new(
            "AniSongDB",
            RetryPolicy::anisongdb(),
            Self::create_rate_limiter(requests_per_second.min(1.0), 1),
            USER_AGENT.to_string(),
        )
    }

    /// Client for the AMQ master list feed.
    pub fn for_amq() -> Self {
        Self::new(
            "AMQ",
            RetryPolicy::amq(),
            Self::create_rate_limiter(0.2, 1),
            USER_AGENT.to_string(),
        )
    }

    /// Create a rate limiter with specified requests per second and burst capacity
    fn create_rate_limiter(requests_per_second: f64, burst_size: u32) -> DirectRateLimiter {
        // Convert rate to duration between requests
        let duration = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::MAX // Effectively disable if rate is 0
        };

        let burst = NonZeroU32::new(burst_size.max(1)).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(duration)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        GovernorRateLimiter::direct(quota)
    }

    /// Create a custom client
    pub fn new(
        provider_name: &str,
        retry_policy: RetryPolicy,
        rate_limiter: DirectRateLimiter,
        user_agent: String,
    ) -> Self {
        Self {
            client: Client::new(),
            rate_limiter,
            retry_policy,
            user_agent,
            provider_name: provider_name.to_string(),
        }
    }

    /// Make a GET request with rate limiting and retries
    pub async fn get<T>(&self, url: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .request_with_retries(Method::GET, url, &None, &[])
            .await?;
        self.parse_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json<T>(&self, url: &str, body: &Value) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .request_with_retries(Method::POST, url, &Some(body.clone()), &[])
            .await?;
        self.parse_response(response).await
    }

    /// Make a GET request with extra headers and return the raw response.
    ///
    /// Used for conditional requests (If-None-Match / If-Modified-Since)
    /// where 304 Not Modified is a valid outcome the caller must see.
    pub async fn get_raw(&self, url: &str, headers: &[(&'static str, String)]) -> AppResult<Response> {
        self.request_with_retries(Method::GET, url, &None, headers)
            .await
    }

    /// Make a request with automatic retries and rate limiting
    async fn request_with_retries(
        &self,
        method: Method,
        url: &str,
        body: &Option<Value>,
        extra_headers: &[(&'static str, String)],
    ) -> AppResult<Response> {
        let mut last_error = None;

        for attempt in 0..=self.retry_policy.max_retries {
            // Wait for rate limiter before attempting request
            self.rate_limiter.until_ready().await;

            match self
                .build_and_send_request(&method, url, body, extra_headers)
                .await
            {
                Ok(response) => {
                    // Check for rate limiting
                    if response.status() == 429 {
                        let rate_limit_info = RateLimitInfo::from_headers(response.headers());

                        if attempt < self.retry_policy.max_retries {
                            let delay = self.calculate_retry_delay(attempt, &rate_limit_info);
                            log::warn!(
                                "{} API rate limited (attempt {}/{}). Waiting {:?} before retry.",
                                self.provider_name,
                                attempt + 1,
                                self.retry_policy.max_retries + 1,
                                delay
                            );
                            sleep(delay).await;
                            continue;
                        } else {
                            return Err(AppError::RateLimitError(format!(
                                "{} API rate limit exceeded after {} attempts",
                                self.provider_name,
                                self.retry_policy.max_retries + 1
                            )));
                        }
                    }

                    // 304 is a successful outcome for conditional requests
                    if response.status() == reqwest::StatusCode::NOT_MODIFIED {
                        return Ok(response);
                    }

                    // Handle other HTTP errors
                    if !response.status().is_success() {
                        let error_msg = format!(
                            "{} API returned error: {}",
                            self.provider_name,
                            response.status()
                        );

                        // Only retry server errors
                        if response.status().is_server_error()
                            && attempt < self.retry_policy.max_retries
                        {
                            let delay = self.retry_policy.calculate_delay(attempt, None);
                            log::warn!(
                                "{} (attempt {}/{}). Retrying in {:?}",
                                error_msg,
                                attempt + 1,
                                self.retry_policy.max_retries + 1,
                                delay
                            );
                            sleep(delay).await;
                            continue;
                        } else {
                            return Err(AppError::ApiError(error_msg));
                        }
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(AppError::ApiError(e.to_string()));

                    // Only retry if error is retryable and we haven't exceeded max attempts
                    if is_retryable_error(&e) && attempt < self.retry_policy.max_retries {
                        let delay = self.retry_policy.calculate_delay(attempt, None);
                        log::warn!(
                            "{} API request failed (attempt {}/{}): {}. Retrying in {:?}",
                            self.provider_name,
                            attempt + 1,
                            self.retry_policy.max_retries + 1,
                            e,
                            delay
                        );
                        sleep(delay).await;
                        continue;
                    } else {
                        return Err(AppError::ApiError(format!(
                            "{} API request failed: {}",
                            self.provider_name, e
                        )));
                    }
                }
            }
        }

        // If we get here, all retries were exhausted
        Err(AppError::ApiError(format!(
            "{} API request failed after {} attempts: {}",
            self.provider_name,
            self.retry_policy.max_retries + 1,
            last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string())
        )))
    }

    /// Build and send the actual HTTP request
    async fn build_and_send_request(
        &self,
        method: &Method,
        url: &str,
        body: &Option<Value>,
        extra_headers: &[(&'static str, String)],
    ) -> Result<Response, reqwest::Error> {
        let mut request_builder = self
            .client
            .request(method.clone(), url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        if body.is_some() {
            request_builder = request_builder.header("Content-Type", "application/json");
        }

        for (name, value) in extra_headers {
            request_builder = request_builder.header(*name, value);
        }

        if let Some(json_body) = body {
            request_builder = request_builder.json(json_body);
        }

        request_builder.send().await
    }

    /// Parse the response body as JSON
    async fn parse_response<T>(&self, response: Response) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response_text = response.text().await.map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to read {} response: {}",
                self.provider_name, e
            ))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            let mut preview: String = response_text.chars().take(200).collect();
            if preview.len() < response_text.len() {
                preview.push_str("...");
            }
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                self.provider_name, e, preview
            ))
        })
    }

    /// Calculate delay for retry based on rate limit info and policy
    fn calculate_retry_delay(&self, attempt: u32, rate_limit_info: &RateLimitInfo) -> Duration {
        // Use server-provided delay if available
        if let Some(server_delay) = rate_limit_info.recommended_delay() {
            return server_delay.min(self.retry_policy.max_delay);
        }

        self.retry_policy.calculate_delay(attempt, None)
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    /// Get provider name
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let anilist = RateLimitClient::for_anilist(0.45);
        assert_eq!(anilist.provider_name(), "AniList");

        let anisongdb = RateLimitClient::for_anisongdb(0.2);
        assert_eq!(anisongdb.provider_name(), "AniSongDB");
    }

    #[test]
    fn test_can_make_request() {
        let client = RateLimitClient::for_amq();
        assert!(client.can_make_request_now());
    }
}
