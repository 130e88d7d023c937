use std::path::PathBuf;

use rama::{
    error::{BoxError, ErrorContext as _},
    graceful::ShutdownGuard,
    http::StatusCode,
    net::socket::Interface,
    rt::Executor,
    telemetry::tracing,
};

use clap::Args;
use orderbench_lib::{
    mock::{MockConfig, run_mock_server},
    utils::fs::write_server_socket_address_as_file,
};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Args)]
/// run the mock order API
pub struct MockCommand {
    /// network interface to bind to
    #[arg(
        long,
        short = 'b',
        value_name = "INTERFACE",
        default_value = "127.0.0.1:0"
    )]
    pub bind: Interface,

    /// simulated payment processing time of the synchronous endpoint
    #[arg(long, value_name = "DURATION", default_value = "3s")]
    pub sync_delay: humantime::Duration,

    /// time the fast-accept endpoint takes before accepting an order
    #[arg(long, value_name = "DURATION", default_value = "0s")]
    pub async_delay: humantime::Duration,

    /// amount of payments processed at the same time
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub payment_concurrency: usize,

    /// status code the fast-accept endpoint responds with
    #[arg(long, value_name = "CODE", default_value_t = 202, value_parser = clap::value_parser!(u16).range(100..=599))]
    pub async_status: u16,
}

impl MockCommand {
    fn mock_config(&self) -> Result<MockConfig, BoxError> {
        let async_status = StatusCode::from_u16(self.async_status)
            .context("parse async status code")
            .context_field("code", self.async_status)?;
        Ok(MockConfig {
            sync_delay: self.sync_delay.into(),
            async_delay: self.async_delay.into(),
            payment_concurrency: self.payment_concurrency.max(1),
            async_status,
        })
    }
}

pub async fn exec(data: PathBuf, guard: ShutdownGuard, args: MockCommand) -> Result<(), BoxError> {
    tokio::fs::create_dir_all(&data)
        .await
        .context("create data directory")
        .with_context_debug_field("path", || data.clone())?;

    let cfg = args.mock_config()?;
    let (addr_tx, addr_rx) = oneshot::channel();

    let server = run_mock_server(Executor::graceful(guard.clone()), args.bind, cfg, addr_tx);
    let mut server = std::pin::pin!(server);

    let addr = tokio::select! {
        result = server.as_mut() => {
            result?;
            return Err(BoxError::from("mock order API stopped before it was bound"));
        }
        addr = addr_rx => addr.context("receive mock order API bound address")?,
    };

    write_server_socket_address_as_file(&data, "mock", addr).await?;
    tracing::info!(path = ?data.join("mock.addr.txt"), "mock order API address written");

    tokio::select! {
        result = server => result,
        _ = guard.cancelled() => {
            tracing::debug!("exit mock order API: guard shutdown");
            Ok(())
        }
    }
}
