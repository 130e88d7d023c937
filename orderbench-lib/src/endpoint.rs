use std::time::Duration;

use rama::http::StatusCode;

/// Path of the endpoint accepting orders for asynchronous processing.
pub const FAST_ACCEPT_PATH: &str = "/orders/async";

/// Path of the endpoint processing orders before responding.
pub const SYNCHRONOUS_PATH: &str = "/orders/sync";

/// Static description of one target endpoint.
///
/// `timeout` is the maximum time a submission waits for the response,
/// it should be chosen well above the expected processing latency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointProfile {
    pub path: &'static str,
    pub expected_status: StatusCode,
    pub timeout: Duration,
}

impl EndpointProfile {
    /// `/orders/async`, replies `202 Accepted` within 5s.
    pub fn fast_accept() -> Self {
        Self {
            path: FAST_ACCEPT_PATH,
            expected_status: StatusCode::ACCEPTED,
            timeout: Duration::from_secs(5),
        }
    }

    /// `/orders/sync`, replies `200 OK` once processing is done (within 10s).
    pub fn synchronous() -> Self {
        Self {
            path: SYNCHRONOUS_PATH,
            expected_status: StatusCode::OK,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full request target for this endpoint on the given base url.
    pub fn target(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }
}
