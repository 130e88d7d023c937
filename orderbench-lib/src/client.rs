//! centralized (web) client creation
//!
//! All order submissions go through the client created here,
//! so the connector stack (pooling, TLS, HTTP version) is configured once
//! and shared by every simulated user.

use rama::{
    Service,
    error::{BoxError, ErrorContext as _},
    http::{Request, Response, client::EasyHttpWebClient},
    rt::Executor,
};

/// Create a new web client that can be cloned and shared between simulated users.
pub fn new_web_client(
    exec: Executor,
) -> Result<impl Service<Request, Output = Response, Error = BoxError> + Clone, BoxError> {
    Ok(EasyHttpWebClient::connector_builder()
        .with_default_transport_connector()
        .without_tls_proxy_support()
        .without_proxy_support()
        .with_tls_support_using_boringssl(None)
        .with_default_http_connector(exec)
        .try_with_default_connection_pool()
        .context("create connection pool for order web client")?
        .build_client())
}
