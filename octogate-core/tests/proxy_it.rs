//! End-to-end tests for the proxy pipeline against a mock upstream.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use httpmock::prelude::*;

use octogate_core::request_handler::handle_request;
use octogate_core::{AppIdentity, RateLimitConfig, RateLimiter, UpstreamConfig};

const TEST_RSA_PRIVATE_KEY: &str = include_str!("fixtures/test_key.pem");

fn app_identity(installation_id: i64) -> AppIdentity {
    AppIdentity::new(
        "314159",
        TEST_RSA_PRIVATE_KEY.as_bytes().to_vec(),
        installation_id,
    )
}

fn open_limiter() -> RateLimiter {
    RateLimiter::new(&RateLimitConfig {
        max_requests: 10_000,
        window_duration: Duration::from_secs(1),
    })
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

async fn proxy(
    req: Request<Full<Bytes>>,
    limiter: RateLimiter,
    identity: AppIdentity,
    upstream: UpstreamConfig,
) -> Response<Full<Bytes>> {
    handle_request(
        req,
        limiter,
        Arc::new(identity),
        Arc::new(upstream),
        reqwest::Client::new(),
    )
    .await
    .unwrap()
}

async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// ===========================================
// Authorization flows
// ===========================================

#[tokio::test]
async fn pass_through_forwards_caller_credentials() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user")
                .header("authorization", "Bearer caller-pat");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"login":"someone"}"#);
        })
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/user")
        .header("authorization", "Bearer caller-pat")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_of(response).await, r#"{"login":"someone"}"#.as_bytes());
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthenticated_request_carries_no_authorization() {
    let server = MockServer::start_async().await;
    // Authenticated requests would match this mock first.
    let with_auth = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rate_limit")
                .header_exists("authorization");
            then.status(500).body("unexpected credentials");
        })
        .await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/rate_limit");
            then.status(200).body("{}");
        })
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/rate_limit")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    with_auth.assert_calls_async(0).await;
    mock.assert_async().await;
}

#[tokio::test]
async fn app_identity_mints_token_per_request() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/app/installations/99/access_tokens")
                .header("accept", "application/vnd.github.v3+json")
                .header_exists("authorization");
            then.status(201)
                .header("content-type", "application/json")
                .body(r#"{"token":"ghs_fresh"}"#);
        })
        .await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/installation/repositories")
                .header("authorization", "token ghs_fresh");
            then.status(200).body(r#"{"total_count":0}"#);
        })
        .await;

    let limiter = open_limiter();
    let upstream = UpstreamConfig::new(server.base_url());

    for _ in 0..2 {
        let req = Request::builder()
            .method("GET")
            .uri("/installation/repositories")
            .header("authorization", "Bearer ignored-inbound")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = proxy(req, limiter.clone(), app_identity(99), upstream.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // One exchange per proxied request; nothing is cached.
    token_mock.assert_calls_async(2).await;
    api_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn broken_app_key_yields_500_and_no_upstream_traffic() {
    let server = MockServer::start_async().await;
    let any_hit = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let identity = AppIdentity::new("314159", b"garbage".to_vec(), 99);
    let req = Request::builder()
        .method("GET")
        .uri("/user")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        identity,
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(response).await, "Failed to generate JWT");
    any_hit.assert_calls_async(0).await;
}

#[tokio::test]
async fn failed_exchange_yields_500_without_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/app/installations/99/access_tokens");
            then.status(404).body(r#"{"message":"Not Found"}"#);
        })
        .await;
    let api_hit = server
        .mock_async(|when, then| {
            when.method(GET).path("/user");
            then.status(200);
        })
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/user")
        .header("authorization", "Bearer caller-pat")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        app_identity(99),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    // No silent downgrade to the caller's own credentials.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(response).await, "Failed to get installation token");
    api_hit.assert_calls_async(0).await;
}

// ===========================================
// Admission gate
// ===========================================

#[tokio::test]
async fn exhausted_bucket_short_circuits_with_429() {
    let server = MockServer::start_async().await;
    let any_hit = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let limiter = RateLimiter::new(&RateLimitConfig {
        max_requests: 1,
        window_duration: Duration::from_secs(3600),
    })
    .with_wait_timeout(Duration::from_millis(50));
    limiter.acquire().await.unwrap();

    let req = Request::builder()
        .method("GET")
        .uri("/user")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        limiter,
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_of(response).await, "Rate limit exceeded");
    any_hit.assert_calls_async(0).await;
}

// ===========================================
// Rate-limit exhaustion backoff
// ===========================================

#[tokio::test]
async fn exhaustion_response_stalls_then_relays_original_bytes() {
    let server = MockServer::start_async().await;
    let body = format!(
        r#"{{"resources":{{"core":{{"limit":5000,"remaining":0,"reset":{}}}}}}}"#,
        unix_now() + 2
    );
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/r/issues");
            then.status(403)
                .header("content-type", "application/json")
                .body(&body);
        })
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/repos/o/r/issues")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let start = Instant::now();
    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(900), "elapsed: {elapsed:?}");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_of(response).await, body.as_bytes());
}

#[tokio::test]
async fn forbidden_with_budget_left_passes_straight_through() {
    let server = MockServer::start_async().await;
    let body = format!(
        r#"{{"resources":{{"core":{{"limit":5000,"remaining":17,"reset":{}}}}}}}"#,
        unix_now() + 3600
    );
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/r");
            then.status(403).body(&body);
        })
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/repos/o/r")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let start = Instant::now();
    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_of(response).await, body.as_bytes());
}

#[tokio::test]
async fn forbidden_without_envelope_becomes_bad_gateway() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/secret");
            then.status(403)
                .body(r#"{"message":"Resource not accessible by integration"}"#);
        })
        .await;

    let req = Request::builder()
        .method("GET")
        .uri("/repos/o/secret")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_of(response).await, "Bad gateway");
}

// ===========================================
// Forwarding fidelity
// ===========================================

#[tokio::test]
async fn post_body_query_and_headers_survive_the_hop() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/repos/o/r/issues")
                .query_param("labels", "bug")
                .header("content-type", "application/json")
                .header("x-correlation-id", "req-77")
                .body(r#"{"title":"panic on empty input"}"#);
            then.status(201)
                .header("location", "/repos/o/r/issues/42")
                .body(r#"{"number":42}"#);
        })
        .await;

    let req = Request::builder()
        .method("POST")
        .uri("/repos/o/r/issues?labels=bug")
        .header("content-type", "application/json")
        .header("x-correlation-id", "req-77")
        .body(Full::new(Bytes::from(r#"{"title":"panic on empty input"}"#)))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new(server.base_url()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/repos/o/r/issues/42"
    );
    assert_eq!(body_of(response).await, r#"{"number":42}"#.as_bytes());
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_upstream_maps_to_bad_gateway() {
    let req = Request::builder()
        .method("GET")
        .uri("/user")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = proxy(
        req,
        open_limiter(),
        AppIdentity::unconfigured(),
        UpstreamConfig::new("http://127.0.0.1:1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
