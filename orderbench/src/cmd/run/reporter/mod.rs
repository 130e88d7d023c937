mod human;
mod json;

pub use self::{human::HumanReporter, json::JsonlReporter};

use orderbench_lib::report::{Counters, ReportEvent};

/// Interval bookkeeping shared by the reporters.
#[derive(Debug, Default)]
struct IntervalState {
    interval: std::time::Duration,
    last_tick: std::time::Duration,
    counts: Counters,
    last_pos: Option<(usize, usize)>,
}

impl IntervalState {
    fn new(interval: std::time::Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    fn record(&mut self, ev: &ReportEvent) {
        self.counts.record(&ev.outcome, ev.latency);
        self.last_pos = Some((ev.user, ev.iteration));
    }

    /// Closes the current interval, if at least `interval` has elapsed since the last tick.
    fn tick(&mut self, now: std::time::Duration) -> Option<ClosedInterval> {
        let elapsed = now.saturating_sub(self.last_tick);
        if elapsed < self.interval {
            return None;
        }
        self.last_tick = now;
        Some(ClosedInterval {
            counts: std::mem::take(&mut self.counts),
            elapsed,
        })
    }
}

/// Counters of one reporting interval and its actual length.
///
/// Ticks can arrive late (e.g. a sequential run only ticks on results),
/// so the length can exceed the configured interval.
#[derive(Debug, Default, PartialEq, Eq)]
struct ClosedInterval {
    counts: Counters,
    elapsed: std::time::Duration,
}

impl ClosedInterval {
    fn rps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0. {
            0.
        } else {
            self.counts.total as f64 / secs
        }
    }
}

fn millis(d: std::time::Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.
}
