use std::time::Duration;

use rama::http::{BodyExtractExt as _, StatusCode, service::client::HttpClientExt as _};
use serde_json::Value;

use crate::{
    endpoint::{FAST_ACCEPT_PATH, SYNCHRONOUS_PATH},
    mock::MockConfig,
    order::generate_order,
    test::e2e::runtime,
};

#[tokio::test]
#[tracing_test::traced_test]
async fn test_mock_health() {
    let mock = runtime::spawn_mock(MockConfig::default()).await;
    let client = runtime::client();

    let resp = client.get(mock.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("server"));

    let payload = resp.try_into_string().await.unwrap();
    assert_eq!("OK", payload);
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_mock_rejects_invalid_payload() {
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: Duration::ZERO,
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    for path in [SYNCHRONOUS_PATH, FAST_ACCEPT_PATH] {
        let resp = client
            .post(mock.url(path))
            .header("content-type", "application/json")
            .body("{\"order_id\": ")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "path = {path}");
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_mock_sync_echoes_completed_order() {
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: Duration::from_millis(5),
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    let order = generate_order();
    let resp = client
        .post(mock.url(SYNCHRONOUS_PATH))
        .json(&order)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let payload: Value = resp.try_into_json().await.unwrap();
    assert_eq!(payload["status"], "completed");
    assert_eq!(payload["order_id"], order.order_id.to_string());
    assert_eq!(payload["customer_id"], order.customer_id);
    assert_eq!(payload["items"].as_array().map(Vec::len), Some(order.items.len()));
    assert!(
        humantime::parse_rfc3339(payload["created_at"].as_str().unwrap()).is_ok(),
        "created_at = {}",
        payload["created_at"]
    );
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_mock_payment_concurrency_serializes_sync_orders() {
    let delay = Duration::from_millis(100);
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: delay,
        payment_concurrency: 1,
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    let start = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        client.post(mock.url(SYNCHRONOUS_PATH)).json(&generate_order()).send(),
        client.post(mock.url(SYNCHRONOUS_PATH)).json(&generate_order()).send(),
    );
    let elapsed = start.elapsed();

    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
    assert!(elapsed >= delay * 2, "elapsed = {elapsed:?}");
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_mock_accepts_sparse_and_negative_orders() {
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: Duration::ZERO,
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    for body in [
        "{}",
        r#"{"order_id":"ord-1","customer_id":-1,"items":[{"product_id":"x","quantity":-3,"price":-9.99}]}"#,
    ] {
        let resp = client
            .post(mock.url(SYNCHRONOUS_PATH))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "body = {body}");
        let payload: Value = resp.try_into_json().await.unwrap();
        assert_eq!(payload["status"], "completed", "body = {body}");

        let resp = client
            .post(mock.url(FAST_ACCEPT_PATH))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED, "body = {body}");
    }
}
