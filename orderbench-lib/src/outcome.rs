use std::{fmt, time::Duration};

use rama::http::StatusCode;

/// Classification of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureReason),
}

impl Outcome {
    #[inline(always)]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Self::Success => None,
            Self::Failure(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure(reason) => reason.fmt(f),
        }
    }
}

/// Why a submission did not count as a success.
///
/// None of these are fatal: the call is recorded and the simulated user
/// carries on with its next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// A response arrived with another status than the endpoint's expected one.
    UnexpectedStatus(u16),
    /// No response within the endpoint timeout.
    Timeout,
    /// Transport failure, e.g. connection refused or reset.
    ConnectionError,
}

impl FailureReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnexpectedStatus(_) => "unexpected_status",
            Self::Timeout => "timeout",
            Self::ConnectionError => "connection_error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedStatus(code) => write!(f, "unexpected status {code}"),
            Self::Timeout => f.write_str("timeout"),
            Self::ConnectionError => f.write_str("connection error"),
        }
    }
}

/// Result of one submission: its outcome and the time it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub outcome: Outcome,
    pub latency: Duration,
}

/// Only the status code decides, the response body is never inspected.
pub fn classify(status: StatusCode, expected: StatusCode) -> Outcome {
    if status == expected {
        Outcome::Success
    } else {
        Outcome::Failure(FailureReason::UnexpectedStatus(status.as_u16()))
    }
}
