//! Mock of the order API under test.
//!
//! Serves the same routes as the real service, without any message bus:
//!
//! - `GET /health`: `200 OK`
//! - `POST /orders/sync`: waits for a payment processor slot,
//!   simulates processing and echoes the completed order back as JSON
//! - `POST /orders/async`: accepts the order right away (`202` by default)
//!
//! Malformed order payloads are rejected with `400 Bad Request`.

use std::{sync::Arc, time::Duration};

use rama::{
    Layer as _,
    error::{BoxError, ErrorContext as _},
    http::{
        BodyExtractExt as _, HeaderValue, Request, Response, StatusCode,
        layer::{required_header::AddRequiredResponseHeadersLayer, trace::TraceLayer},
        server::HttpServer,
        service::web::{
            Router,
            response::{IntoResponse, Json},
        },
    },
    net::{address::SocketAddress, socket::Interface},
    rt::Executor,
    tcp::server::TcpListener,
    telemetry::tracing,
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Semaphore, oneshot};

use crate::{
    endpoint::{FAST_ACCEPT_PATH, SYNCHRONOUS_PATH},
    utils::env::network_service_identifier,
};

/// Behavior of the mock order API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Simulated payment processing time of `/orders/sync`.
    pub sync_delay: Duration,
    /// Time `/orders/async` takes before accepting.
    pub async_delay: Duration,
    /// Amount of payments processed at the same time by `/orders/sync`.
    pub payment_concurrency: usize,
    /// Status `/orders/async` responds with.
    pub async_status: StatusCode,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            sync_delay: Duration::from_secs(3),
            async_delay: Duration::ZERO,
            payment_concurrency: 20,
            async_status: StatusCode::ACCEPTED,
        }
    }
}

/// Order as received by the API.
///
/// Decoding is lenient: missing fields take their zero value and
/// ids, quantities and prices are taken as is. Only malformed JSON
/// or mistyped fields are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct IncomingOrder {
    order_id: String,
    customer_id: i64,
    items: Vec<IncomingItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct IncomingItem {
    product_id: String,
    quantity: i64,
    price: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ProcessedOrder {
    order_id: String,
    customer_id: i64,
    status: &'static str,
    items: Vec<IncomingItem>,
    created_at: String,
}

#[derive(Debug)]
struct MockOrdersApi {
    cfg: MockConfig,
    payment_processor: Semaphore,
}

impl MockOrdersApi {
    fn new(cfg: MockConfig) -> Self {
        let payment_processor = Semaphore::new(cfg.payment_concurrency.max(1));
        Self {
            cfg,
            payment_processor,
        }
    }

    async fn decode_order(req: Request) -> Result<IncomingOrder, Response> {
        req.try_into_json::<IncomingOrder>().await.map_err(|err| {
            tracing::debug!("reject invalid order payload: {err}");
            (StatusCode::BAD_REQUEST, "Invalid request").into_response()
        })
    }

    async fn order_sync(&self, req: Request) -> Response {
        let order = match Self::decode_order(req).await {
            Ok(order) => order,
            Err(resp) => return resp,
        };

        let _permit = match self.payment_processor.acquire().await {
            Ok(permit) => permit,
            Err(err) => {
                tracing::error!("payment processor unavailable: {err}");
                return StatusCode::SERVICE_UNAVAILABLE.into_response();
            }
        };

        if !self.cfg.sync_delay.is_zero() {
            tokio::time::sleep(self.cfg.sync_delay).await;
        }

        tracing::debug!(order_id = %order.order_id, "order processed synchronously");

        (
            StatusCode::OK,
            Json(ProcessedOrder {
                order_id: order.order_id,
                customer_id: order.customer_id,
                status: "completed",
                items: order.items,
                created_at: humantime::format_rfc3339_seconds(std::time::SystemTime::now())
                    .to_string(),
            }),
        )
            .into_response()
    }

    async fn order_async(&self, req: Request) -> Response {
        let order = match Self::decode_order(req).await {
            Ok(order) => order,
            Err(resp) => return resp,
        };

        if !self.cfg.async_delay.is_zero() {
            tokio::time::sleep(self.cfg.async_delay).await;
        }

        tracing::debug!(order_id = %order.order_id, "order accepted for async processing");
        self.cfg.async_status.into_response()
    }
}

/// Bind the mock order API to `interface` and serve it until shutdown.
///
/// The bound address is sent over `addr_tx` as soon as the listener is ready.
pub async fn run_mock_server(
    exec: Executor,
    interface: Interface,
    cfg: MockConfig,
    addr_tx: oneshot::Sender<SocketAddress>,
) -> Result<(), BoxError> {
    tracing::info!(?cfg, "prepare mock order API");
    let api = Arc::new(MockOrdersApi::new(cfg));

    let http_router = Router::new()
        .with_get("/health", "OK")
        .with_post(SYNCHRONOUS_PATH, {
            let api = api.clone();
            move |req: Request| {
                let api = api.clone();
                async move { api.order_sync(req).await }
            }
        })
        .with_post(FAST_ACCEPT_PATH, move |req: Request| {
            let api = api.clone();
            async move { api.order_async(req).await }
        });

    let http_svc = (
        TraceLayer::new_for_http(),
        AddRequiredResponseHeadersLayer::new()
            .with_server_header_value(HeaderValue::from_static(network_service_identifier())),
    )
        .into_layer(http_router);

    let http_server = HttpServer::auto(exec.clone()).service(Arc::new(http_svc));

    let tcp_listener = TcpListener::bind(interface, exec)
        .await
        .context("bind mock order API http server")?;

    let addr = tcp_listener
        .local_addr()
        .context("get bound address for mock order API http server")?;
    tracing::info!("mock order API bound to: {addr}");

    if addr_tx.send(addr.into()).is_err() {
        tracing::debug!("mock order API address receiver dropped");
    }

    tcp_listener.serve(http_server).await;

    Ok(())
}
