//! Rate limiting tests for the provider HTTP clients.

use std::time::{Duration, Instant};

use utadex::modules::provider::http_client::{RateLimitClient, RetryPolicy};
use utadex::shared::utils::RateLimiter;

#[tokio::test]
async fn test_provider_client_creation() {
    let anilist = RateLimitClient::for_anilist(0.45);
    assert_eq!(anilist.provider_name(), "AniList");

    let anisongdb = RateLimitClient::for_anisongdb(0.2);
    assert_eq!(anisongdb.provider_name(), "AniSongDB");

    let amq = RateLimitClient::for_amq();
    assert_eq!(amq.provider_name(), "AMQ");
}

#[tokio::test]
async fn test_first_request_is_immediate() {
    let client = RateLimitClient::for_anilist(0.45);
    assert!(client.can_make_request_now());
}

#[tokio::test]
async fn test_min_interval_gate_spaces_requests() {
    let limiter = RateLimiter::new(20.0); // 50ms interval

    let start = Instant::now();
    limiter.wait().await;
    limiter.wait().await;
    limiter.wait().await;

    // Three permits at 20 rps must span at least two intervals.
    assert!(start.elapsed() >= Duration::from_millis(90));
}

#[test]
fn test_retry_delay_grows_until_capped() {
    let policy = RetryPolicy::anisongdb();

    let d1 = policy.calculate_delay(0, None);
    let d2 = policy.calculate_delay(2, None);
    assert!(d2 > d1);

    let capped = policy.calculate_delay(50, None);
    assert_eq!(capped, policy.max_delay);
}

#[test]
fn test_server_retry_after_wins() {
    let policy = RetryPolicy::anilist();
    let delay = policy.calculate_delay(0, Some(Duration::from_secs(42)));
    assert_eq!(delay, Duration::from_secs(42));

    // But never beyond the policy ceiling.
    let delay = policy.calculate_delay(0, Some(Duration::from_secs(3600)));
    assert_eq!(delay, policy.max_delay);
}
