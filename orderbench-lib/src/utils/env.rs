/// Identifier used as `server` header value and in log lines.
pub const fn network_service_identifier() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}
