use std::time::Duration;

use rama::error::BoxError;
use rand::{Rng, RngExt as _};

/// Time a simulated user waits before each task invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTime {
    Constant(Duration),
    /// Uniformly distributed within `[min, max]`.
    Between { min: Duration, max: Duration },
}

impl WaitTime {
    #[inline(always)]
    pub const fn constant(wait: Duration) -> Self {
        Self::Constant(wait)
    }

    pub fn try_between(min: Duration, max: Duration) -> Result<Self, BoxError> {
        if min > max {
            return Err(BoxError::from(format!(
                "wait time lower bound ({min:?}) exceeds upper bound ({max:?})"
            )));
        }
        Ok(if min == max {
            Self::Constant(min)
        } else {
            Self::Between { min, max }
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            Self::Constant(wait) => wait,
            Self::Between { min, max } => {
                let lo = min.as_nanos().min(u64::MAX as u128) as u64;
                let hi = max.as_nanos().min(u64::MAX as u128) as u64;
                Duration::from_nanos(rng.random_range(lo..=hi))
            }
        }
    }
}

impl Default for WaitTime {
    /// Between 100ms and 500ms.
    fn default() -> Self {
        Self::Between {
            min: Duration::from_millis(100),
            max: Duration::from_millis(500),
        }
    }
}
