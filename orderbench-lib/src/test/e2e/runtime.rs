use std::time::Duration;

use rama::{
    Service,
    error::BoxError,
    http::{Request, Response},
    net::address::SocketAddress,
    rt::Executor,
};
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    net::TcpListener,
    sync::oneshot,
};

use crate::{
    client::new_web_client,
    mock::{MockConfig, run_mock_server},
};

/// Mock order API running in the background of the current test runtime.
pub(super) struct MockRuntime {
    addr: SocketAddress,
}

impl MockRuntime {
    pub(super) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

pub(super) async fn spawn_mock(cfg: MockConfig) -> MockRuntime {
    let (addr_tx, addr_rx) = oneshot::channel();

    tokio::spawn(async move {
        run_mock_server(
            Executor::default(),
            "127.0.0.1:0".parse().unwrap(),
            cfg,
            addr_tx,
        )
        .await
        .expect("serve mock order API without errors");
    });

    let addr = tokio::time::timeout(Duration::from_secs(30), addr_rx)
        .await
        .unwrap()
        .unwrap();
    assert!(addr.ip_addr.is_loopback());

    MockRuntime { addr }
}

pub(super) fn client() -> impl Service<Request, Output = Response, Error = BoxError> + Clone {
    new_web_client(Executor::default()).unwrap()
}

/// Base url of a local port nobody listens on.
pub(super) fn closed_port_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Base url of a raw HTTP/1.1 server that answers every request with `response`
/// as-is and keeps the connection open for `hold` before closing it.
pub(super) async fn spawn_raw_responder(response: &'static str, hold: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                read_request(&mut stream).await;
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
                tokio::time::sleep(hold).await;
            });
        }
    });

    format!("http://{addr}")
}

/// Reads one request with a `content-length` body.
async fn read_request(stream: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_len = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before end of request head");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_len]).to_ascii_lowercase();
    let body_len: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or_default();

    while buf.len() < head_len + body_len {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before end of request body");
        buf.extend_from_slice(&chunk[..n]);
    }
}
