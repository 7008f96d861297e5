use std::collections::HashMap;
use std::sync::Arc;

use super::mocks::MockExecutor;
use crate::config::ClientConfig;
use crate::errors::{Error, ErrorCode};
use crate::transport::{backoff_delay, HttpMethod, Transport, IDEMPOTENCY_HEADER};

fn transport(executor: Arc<MockExecutor>) -> Transport<Arc<MockExecutor>> {
    transport_with(executor, ClientConfig::new("vw_test_key"))
}

fn transport_with(
    executor: Arc<MockExecutor>,
    config: ClientConfig,
) -> Transport<Arc<MockExecutor>> {
    Transport::new(executor, Arc::new(config))
}

#[tokio::test]
async fn single_request_unwraps_success_envelope() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_ok(serde_json::json!({"pong": true}));
    let transport = transport(executor.clone());

    let data: serde_json::Value = transport
        .request(HttpMethod::Get, "/health", None)
        .await
        .unwrap();
    assert_eq!(data["pong"], true);
    assert_eq!(executor.request_count(), 1);
}

#[tokio::test]
async fn identification_headers_are_always_present() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_ok(serde_json::json!({}));
    let transport = transport(executor.clone());

    let _: serde_json::Value = transport
        .request(HttpMethod::Get, "/health", None)
        .await
        .unwrap();

    let request = executor.request(0);
    assert_eq!(request.url, "https://api.veriway.com/v1/health");
    assert_eq!(request.header("X-API-Key"), Some("vw_test_key"));
    assert_eq!(request.header("X-SDK-Language"), Some("rust"));
    assert_eq!(request.header("X-SDK-Platform"), Some("server"));
    assert_eq!(
        request.header("X-SDK-Version"),
        Some(env!("CARGO_PKG_VERSION"))
    );
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn custom_headers_never_override_identification_headers() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_ok(serde_json::json!({}));
    let config = ClientConfig::new("vw_test_key")
        .with_header("X-Tenant", "acme")
        .with_header("x-sdk-language", "cobol");
    let transport = transport_with(executor.clone(), config);

    let _: serde_json::Value = transport
        .request(HttpMethod::Get, "/health", None)
        .await
        .unwrap();

    let request = executor.request(0);
    assert_eq!(request.header("X-Tenant"), Some("acme"));
    // Identification wins the collision, whatever the casing.
    assert_eq!(request.header("X-SDK-Language"), Some("rust"));
}

#[tokio::test(start_paused = true)]
async fn retryable_errors_are_retried_with_exponential_backoff() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error("SERVICE_UNAVAILABLE", 503);
    executor.push_api_error("SERVICE_UNAVAILABLE", 503);
    executor.push_ok(serde_json::json!({"requestId": "req_1"}));
    let transport = transport(executor.clone());

    let started = tokio::time::Instant::now();
    let data: serde_json::Value = transport
        .request_with_retry(HttpMethod::Post, "/otp/send", None, "1000-abc")
        .await
        .unwrap();

    assert_eq!(data["requestId"], "req_1");
    assert_eq!(executor.request_count(), 3);
    // 1 s after the first failure, 2 s after the second.
    assert_eq!(started.elapsed().as_secs(), 3);
}

#[tokio::test(start_paused = true)]
async fn idempotency_key_is_identical_across_attempts() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error("RATE_LIMIT_EXCEEDED", 429);
    executor.push_api_error("PROVIDER_UNAVAILABLE", 503);
    executor.push_ok(serde_json::json!({}));
    let transport = transport(executor.clone());

    let _: serde_json::Value = transport
        .request_with_retry(HttpMethod::Post, "/otp/send", None, "1000-samekey")
        .await
        .unwrap();

    for i in 0..3 {
        assert_eq!(
            executor.request(i).header(IDEMPOTENCY_HEADER),
            Some("1000-samekey")
        );
    }
}

#[tokio::test]
async fn non_retryable_errors_fail_on_first_attempt() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error("INVALID_PHONE_NUMBER", 400);
    let transport = transport(executor.clone());

    let err = transport
        .request_with_retry::<serde_json::Value>(HttpMethod::Post, "/otp/send", None, "1000-abc")
        .await
        .unwrap_err();

    assert_eq!(executor.request_count(), 1);
    match err {
        Error::Api(api) => assert_eq!(api.code, ErrorCode::InvalidPhoneNumber),
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_the_last_error_unchanged() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error("SERVICE_UNAVAILABLE", 503);
    executor.push_api_error("SERVICE_UNAVAILABLE", 503);
    executor.push_api_error("RATE_LIMIT_EXCEEDED", 429);
    let transport = transport(executor.clone());

    let err = transport
        .request_with_retry::<serde_json::Value>(HttpMethod::Post, "/otp/send", None, "1000-abc")
        .await
        .unwrap_err();

    assert_eq!(executor.request_count(), 3);
    match err {
        Error::Api(api) => {
            assert_eq!(api.code, ErrorCode::RateLimitExceeded);
            assert_eq!(api.request_id.as_deref(), Some("req_mock"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn wire_retryable_false_stops_the_retry_loop() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error_with_retryable("SERVICE_UNAVAILABLE", 503, false);
    let transport = transport(executor.clone());

    let err = transport
        .request_with_retry::<serde_json::Value>(HttpMethod::Post, "/otp/send", None, "1000-abc")
        .await
        .unwrap_err();

    assert_eq!(executor.request_count(), 1);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn connection_faults_propagate_without_retry() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_connection_fault();
    let transport = transport(executor.clone());

    let err = transport
        .request_with_retry::<serde_json::Value>(HttpMethod::Post, "/otp/send", None, "1000-abc")
        .await
        .unwrap_err();

    assert_eq!(executor.request_count(), 1);
    assert!(matches!(err, Error::Connection(_)));
}

#[tokio::test]
async fn reads_are_never_retried() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error("SERVICE_UNAVAILABLE", 503);
    let transport = transport(executor.clone());

    let err = transport
        .request::<serde_json::Value>(HttpMethod::Get, "/sdk/config", None)
        .await
        .unwrap_err();

    assert_eq!(executor.request_count(), 1);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn error_status_without_body_degrades_to_unknown() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_raw(502, None);
    let transport = transport(executor.clone());

    let err = transport
        .request::<serde_json::Value>(HttpMethod::Get, "/health", None)
        .await
        .unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.code, ErrorCode::Unknown);
            assert_eq!(api.http_status, 502);
            assert!(!api.retryable);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn garbled_success_body_is_a_connection_fault() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_raw(200, None);
    let transport = transport(executor.clone());

    let err = transport
        .request::<serde_json::Value>(HttpMethod::Get, "/health", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
}

#[tokio::test(start_paused = true)]
async fn max_retries_of_one_means_a_single_attempt() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_api_error("SERVICE_UNAVAILABLE", 503);
    let config = ClientConfig::new("vw_test_key").with_max_retries(1);
    let transport = transport_with(executor.clone(), config);

    let err = transport
        .request_with_retry::<serde_json::Value>(HttpMethod::Post, "/otp/send", None, "1000-abc")
        .await
        .unwrap_err();

    assert_eq!(executor.request_count(), 1);
    assert!(err.is_retryable());
}

#[test]
fn backoff_doubles_then_plateaus() {
    use std::time::Duration;

    assert_eq!(backoff_delay(1), Duration::from_secs(1));
    assert_eq!(backoff_delay(2), Duration::from_secs(2));
    assert_eq!(backoff_delay(3), Duration::from_secs(4));
    // Deep attempt counts plateau instead of overflowing the shift.
    assert_eq!(backoff_delay(17), Duration::from_secs(65536));
    assert_eq!(backoff_delay(65), Duration::from_secs(65536));
    assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(65536));
}

#[tokio::test]
async fn custom_header_map_is_deterministic_per_request() {
    let executor = Arc::new(MockExecutor::new());
    executor.push_ok(serde_json::json!({}));
    let mut headers = HashMap::new();
    headers.insert("X-Env".to_string(), "ci".to_string());
    let mut config = ClientConfig::new("vw_test_key");
    config.custom_headers = headers;
    let transport = transport_with(executor.clone(), config);

    let _: serde_json::Value = transport
        .request(HttpMethod::Get, "/health", None)
        .await
        .unwrap();
    assert_eq!(executor.request(0).header("X-Env"), Some("ci"));
}
