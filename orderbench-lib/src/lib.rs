#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod client;
pub mod endpoint;
pub mod mock;
pub mod order;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod utils;

#[cfg(test)]
mod test;
