use std::time::Duration;

use rama::http::StatusCode;
use rand::{SeedableRng as _, rngs::SmallRng};

use crate::{
    endpoint::EndpointProfile,
    mock::MockConfig,
    order::{OrderShape, Price, generate_order, generate_order_with},
    outcome::{FailureReason, Outcome},
    scenario::submit,
    test::e2e::runtime,
};

#[tokio::test]
#[tracing_test::traced_test]
async fn test_fast_accept_202_is_success() {
    let mock = runtime::spawn_mock(MockConfig::default()).await;
    let client = runtime::client();

    let submission = submit(
        &client,
        &mock.base_url(),
        &generate_order(),
        &EndpointProfile::fast_accept(),
    )
    .await;

    assert_eq!(submission.outcome, Outcome::Success);
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_fast_accept_200_is_unexpected_status() {
    let mock = runtime::spawn_mock(MockConfig {
        async_status: StatusCode::OK,
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    let submission = submit(
        &client,
        &mock.base_url(),
        &generate_order(),
        &EndpointProfile::fast_accept(),
    )
    .await;

    assert_eq!(
        submission.outcome,
        Outcome::Failure(FailureReason::UnexpectedStatus(200))
    );
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_sync_slower_than_timeout_is_timeout() {
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: Duration::from_secs(2),
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    let profile = EndpointProfile::synchronous().with_timeout(Duration::from_millis(100));
    let submission = submit(&client, &mock.base_url(), &generate_order(), &profile).await;

    assert_eq!(submission.outcome, Outcome::Failure(FailureReason::Timeout));
    assert!(submission.latency >= Duration::from_millis(100));
    assert!(submission.latency < Duration::from_secs(2));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_sync_within_timeout_is_success() {
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: Duration::from_millis(50),
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    let order = generate_order_with(&mut SmallRng::seed_from_u64(3), OrderShape::Random);
    let submission = submit(
        &client,
        &mock.base_url(),
        &order,
        &EndpointProfile::synchronous(),
    )
    .await;

    assert_eq!(submission.outcome, Outcome::Success);
    assert!(submission.latency >= Duration::from_millis(50));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_stalled_response_body_is_timeout() {
    let base = runtime::spawn_raw_responder(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"status\":",
        Duration::from_secs(5),
    )
    .await;
    let client = runtime::client();

    let profile = EndpointProfile::synchronous().with_timeout(Duration::from_millis(200));
    let submission = submit(&client, &base, &generate_order(), &profile).await;

    assert_eq!(submission.outcome, Outcome::Failure(FailureReason::Timeout));
    assert!(
        submission.latency >= Duration::from_millis(200),
        "latency: {:?}",
        submission.latency
    );
    assert!(
        submission.latency < Duration::from_secs(5),
        "latency: {:?}",
        submission.latency
    );
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_truncated_response_body_is_connection_error() {
    let base = runtime::spawn_raw_responder(
        "HTTP/1.1 202 Accepted\r\ncontent-length: 64\r\nconnection: close\r\n\r\n{\"status\":",
        Duration::ZERO,
    )
    .await;
    let client = runtime::client();

    let submission = submit(
        &client,
        &base,
        &generate_order(),
        &EndpointProfile::fast_accept(),
    )
    .await;

    assert_eq!(
        submission.outcome,
        Outcome::Failure(FailureReason::ConnectionError)
    );
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_pooled_client_submits_back_to_back() {
    let mock = runtime::spawn_mock(MockConfig {
        sync_delay: Duration::ZERO,
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    for i in 0..20 {
        let submission = submit(
            &client,
            &mock.base_url(),
            &generate_order(),
            &EndpointProfile::synchronous(),
        )
        .await;
        assert_eq!(submission.outcome, Outcome::Success, "submission #{i}");
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_nobody_listening_is_connection_error() {
    let client = runtime::client();

    let submission = submit(
        &client,
        &runtime::closed_port_base_url(),
        &generate_order(),
        &EndpointProfile::fast_accept(),
    )
    .await;

    assert_eq!(
        submission.outcome,
        Outcome::Failure(FailureReason::ConnectionError)
    );
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_seeded_order_accepted_in_about_ten_millis() {
    let seed = (0..1_000_000u64)
        .find(|seed| {
            generate_order_with(&mut SmallRng::seed_from_u64(*seed), OrderShape::Sample)
                .customer_id
                == 42
        })
        .expect("a seed producing customer 42");

    let order = generate_order_with(&mut SmallRng::seed_from_u64(seed), OrderShape::Sample);
    assert_eq!(order.customer_id, 42);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_id, "sku-1");
    assert_eq!(order.items[0].quantity, 1);
    assert_eq!(order.items[0].price, Price::from_cents(999));

    let mock = runtime::spawn_mock(MockConfig {
        async_delay: Duration::from_millis(10),
        ..Default::default()
    })
    .await;
    let client = runtime::client();

    let submission = submit(
        &client,
        &mock.base_url(),
        &order,
        &EndpointProfile::fast_accept(),
    )
    .await;

    assert_eq!(submission.outcome, Outcome::Success);
    assert!(
        submission.latency >= Duration::from_millis(10),
        "latency: {:?}",
        submission.latency
    );
    assert!(
        submission.latency < Duration::from_secs(2),
        "latency: {:?}",
        submission.latency
    );
}
