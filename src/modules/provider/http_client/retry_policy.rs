//! Retry policies for the upstream catalog providers.
//!
//! Handles provider-specific rate limiting with retry logic based on
//! HTTP headers and provider characteristics.

use std::time::Duration;

/// Configuration for HTTP retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries (will be adjusted based on headers)
    pub base_delay: Duration,
    /// Maximum delay to wait (prevents excessive waits)
    pub max_delay: Duration,
    /// Whether to use exponential backoff
    pub exponential_backoff: bool,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Policy for AniList (30 req/min in its degraded state)
    pub fn anilist() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(700),
            max_delay: Duration::from_secs(60),
            exponential_backoff: true,
            backoff_multiplier: 1.5,
        }
    }

    /// Conservative policy for AniSongDB, which has no published limits
    /// and deserves gentle treatment.
    pub fn anisongdb() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(1500),
            max_delay: Duration::from_secs(60),
            exponential_backoff: true,
            backoff_multiplier: 1.8,
        }
    }

    /// Policy for the AMQ master list feed (a single large GET).
    pub fn amq() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(120),
            exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    /// Calculate delay for next retry attempt
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        // If server provided Retry-After header, respect it
        if let Some(server_delay) = retry_after {
            return server_delay.min(self.max_delay);
        }

        let delay = if self.exponential_backoff {
            let multiplier = self.backoff_multiplier.powi(attempt as i32);
            Duration::from_millis((self.base_delay.as_millis() as f64 * multiplier) as u64)
        } else {
            self.base_delay
        };

        delay.min(self.max_delay)
    }
}

/// Information extracted from HTTP 429 responses
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// How long to wait before next request (from Retry-After header)
    pub retry_after: Option<Duration>,
    /// When the rate limit resets (from X-RateLimit-Reset header)
    pub reset_time: Option<Duration>,
    /// Number of requests remaining (from X-RateLimit-Remaining header)
    pub remaining: Option<u32>,
    /// Total rate limit (from X-RateLimit-Limit header)
    pub limit: Option<u32>,
}

impl RateLimitInfo {
    /// Parse rate limit information from HTTP response headers
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let retry_after = headers
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let reset_time = headers
            .get("x-ratelimit-reset")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(|timestamp| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                if timestamp > now {
                    Duration::from_secs(timestamp - now)
                } else {
                    Duration::from_secs(0)
                }
            });

        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        Self {
            retry_after,
            reset_time,
            remaining,
            limit,
        }
    }

    /// Get the best delay recommendation from available information
    pub fn recommended_delay(&self) -> Option<Duration> {
        // Prioritize Retry-After header
        if let Some(delay) = self.retry_after {
            return Some(delay);
        }

        // Fall back to reset time if available
        self.reset_time
    }
}

/// Determines if a transport-level error is retryable
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    if let Some(status) = error.status() {
        match status.as_u16() {
            429 => true,
            500..=599 => true,
            408 => true,
            425 => true,
            _ => false,
        }
    } else {
        // Network errors are potentially retryable
        error.is_timeout() || error.is_connect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_delay_with_retry_after() {
        let policy = RetryPolicy::anisongdb();
        let server_delay = Some(Duration::from_secs(30));
        let delay = policy.calculate_delay(1, server_delay);
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn test_calculate_delay_exponential_backoff() {
        let policy = RetryPolicy::anilist();
        let delay1 = policy.calculate_delay(1, None);
        let delay2 = policy.calculate_delay(2, None);
        assert!(delay2 > delay1);
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy::amq();
        let delay = policy.calculate_delay(30, None);
        assert_eq!(delay, policy.max_delay);
    }

    #[test]
    fn test_rate_limit_info_parsing() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("retry-after", "30".parse().unwrap());
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-limit", "90".parse().unwrap());

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.retry_after, Some(Duration::from_secs(30)));
        assert_eq!(info.remaining, Some(0));
        assert_eq!(info.limit, Some(90));
        assert_eq!(info.recommended_delay(), Some(Duration::from_secs(30)));
    }
}
