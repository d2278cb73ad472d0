use std::time::Duration;

use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topstats::rate_limit::{RateLimitConfig, WindowLimit};
use topstats::{TopStatsClient, TopStatsError};

fn build_client(server: &MockServer) -> TopStatsClient {
    TopStatsClient::builder()
        .token("test-token")
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn build_client_with_limits(server: &MockServer, config: RateLimitConfig) -> TopStatsClient {
    TopStatsClient::builder()
        .token("test-token")
        .base_url(server.uri())
        .rate_limit(config)
        .build()
        .unwrap()
}

fn recent_json() -> serde_json::Value {
    serde_json::json!({"hourlyData": [], "dailyData": []})
}

#[tokio::test]
async fn test_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let bot = client.get_bot(1).await.unwrap();

    assert!(bot.is_none());
}

#[tokio::test]
async fn test_short_rate_limit_is_retried_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({"expiresIn": 100})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recent_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let start = Instant::now();
    let recent = client.get_recent_bot_stats(1).await.unwrap();

    assert!(recent.is_some());
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_long_rate_limit_sets_cooldown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({"expiresIn": 60000})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);

    let start = Instant::now();
    let err = client.get_recent_bot_stats(1).await.unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
    assert_eq!(err.status(), Some(429));

    // Same endpoint key, so no request leaves the client.
    let err = client.get_recent_bot_stats(2).await.unwrap_err();
    assert!(err.is_rate_limited());
    assert!(err.retry_after().unwrap() <= Duration::from_secs(60));
}

#[tokio::test]
async fn test_cooldown_is_per_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({"expiresIn": 60000})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bots/1/historical"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);

    assert!(client.get_recent_bot_stats(1).await.is_err());
    let series = client
        .get_historical_bot_monthly_votes(1, topstats::Period::LastDay)
        .await
        .unwrap();
    assert_eq!(series.map(|s| s.len()), Some(0));
}

#[tokio::test]
async fn test_retry_after_header_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rankings/bots"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client
        .get_top_bots(&topstats::rest::TopBotsRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn test_short_rate_limit_retries_are_bounded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({"expiresIn": 10})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let config = RateLimitConfig {
        max_ratelimit_retries: 2,
        ..RateLimitConfig::default()
    };
    let client = build_client_with_limits(&server, config);

    let err = client.get_recent_bot_stats(1).await.unwrap_err();
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn test_server_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"message": "internal error"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client.get_bot(1).await.unwrap_err();

    match err {
        TopStatsError::Request { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message.as_deref(), Some("internal error"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_body_uses_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client.get_bot(1).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(matches!(
        err,
        TopStatsError::Request { message: Some(ref m), .. } if m == "Service Unavailable"
    ));
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client.get_bot(1).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn test_closed_client_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recent_json()))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.close();

    let err = client.get_recent_bot_stats(1).await.unwrap_err();
    assert!(matches!(err, TopStatsError::ClientClosed));
    let err = client.compare_bots(&[1, 2]).await.unwrap_err();
    assert!(matches!(err, TopStatsError::ClientClosed));
}

#[tokio::test]
async fn test_network_failure_is_request_error() {
    // Nothing listens on port 1.
    let client = TopStatsClient::builder()
        .token("test-token")
        .base_url("http://127.0.0.1:1")
        .max_retries(0)
        .build()
        .unwrap();

    let err = client.get_bot(1).await.unwrap_err();

    match err {
        TopStatsError::Request { status, message } => {
            assert!(status.is_none());
            assert!(message.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_local_window_delays_third_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recent_json()))
        .expect(3)
        .mount(&server)
        .await;

    let config = RateLimitConfig {
        per_endpoint: WindowLimit::new(2, Duration::from_millis(500)),
        ..RateLimitConfig::default()
    };
    let client = build_client_with_limits(&server, config);

    let start = Instant::now();
    for _ in 0..3 {
        client.get_recent_bot_stats(1).await.unwrap();
    }
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(400));
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_disabled_local_limits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recent_json()))
        .expect(3)
        .mount(&server)
        .await;

    let config = RateLimitConfig {
        enabled: false,
        per_endpoint: WindowLimit::new(1, Duration::from_secs(60)),
        ..RateLimitConfig::default()
    };
    let client = build_client_with_limits(&server, config);

    let start = Instant::now();
    for _ in 0..3 {
        client.get_recent_bot_stats(1).await.unwrap();
    }

    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(client.rate_limits().global().len().await, 0);
}

#[tokio::test]
async fn test_failed_requests_count_against_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = build_client(&server);
    assert!(client.get_bot(1).await.is_err());
    assert!(client.get_bot(1).await.is_err());

    assert_eq!(client.rate_limits().global().len().await, 2);
}

#[tokio::test]
async fn test_close_fails_call_waiting_on_limiter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recent_json()))
        .expect(1)
        .mount(&server)
        .await;

    let config = RateLimitConfig {
        per_endpoint: WindowLimit::new(1, Duration::from_millis(800)),
        ..RateLimitConfig::default()
    };
    let client = build_client_with_limits(&server, config);
    client.get_recent_bot_stats(1).await.unwrap();

    let waiting = client.clone();
    let handle = tokio::spawn(async move { waiting.get_recent_bot_stats(1).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.close();

    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, TopStatsError::ClientClosed));
}

#[tokio::test]
async fn test_close_fails_call_sleeping_on_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({"expiresIn": 500})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bots/1/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recent_json()))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let sleeping = client.clone();
    let handle = tokio::spawn(async move { sleeping.get_recent_bot_stats(1).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    client.close();

    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, TopStatsError::ClientClosed));
}
