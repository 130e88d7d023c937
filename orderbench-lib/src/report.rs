//! Aggregation of task results and the reporter seam.
//!
//! Runners own a [`Stats`] value, record every [`ReportEvent`] in it and
//! forward the same event to a [`Reporter`] for presentation.

use std::{collections::BTreeMap, time::Duration};

use rama::utils::str::arcstr::ArcStr;

use crate::outcome::{FailureReason, Outcome};

pub trait Reporter: Send + Sync + 'static {
    fn on_report(&mut self, ev: &ReportEvent);
    fn on_tick(&mut self, now: Duration);
    fn finish(&mut self, stats: &Stats);
}

impl Reporter for Box<dyn Reporter> {
    fn on_report(&mut self, ev: &ReportEvent) {
        (**self).on_report(ev)
    }

    fn on_tick(&mut self, now: Duration) {
        (**self).on_tick(now)
    }

    fn finish(&mut self, stats: &Stats) {
        (**self).finish(stats)
    }
}

/// Discards everything, useful when only the returned [`Stats`] matter.
#[derive(Debug, Clone, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn on_report(&mut self, _ev: &ReportEvent) {}
    fn on_tick(&mut self, _now: Duration) {}
    fn finish(&mut self, _stats: &Stats) {}
}

/// Result of one scenario task execution by one simulated user.
#[derive(Debug, Clone)]
pub struct ReportEvent {
    pub ts: std::time::SystemTime,
    /// time since the start of the run
    pub elapsed: Duration,
    pub user: usize,
    pub iteration: usize,
    pub task: ArcStr,
    pub latency: Duration,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub total: u64,
    pub ok: u64,
    pub unexpected_status: u64,
    pub timeout: u64,
    pub connection_error: u64,
    pub latency_sum: Duration,
    pub latency_max: Duration,
}

impl Counters {
    pub fn record(&mut self, outcome: &Outcome, latency: Duration) {
        self.total += 1;
        self.latency_sum += latency;
        self.latency_max = self.latency_max.max(latency);

        match outcome {
            Outcome::Success => self.ok += 1,
            Outcome::Failure(FailureReason::UnexpectedStatus(_)) => self.unexpected_status += 1,
            Outcome::Failure(FailureReason::Timeout) => self.timeout += 1,
            Outcome::Failure(FailureReason::ConnectionError) => self.connection_error += 1,
        }
    }

    #[inline(always)]
    pub fn failed(&self) -> u64 {
        self.total - self.ok
    }

    pub fn mean_latency(&self) -> Option<Duration> {
        let total = u32::try_from(self.total).ok().filter(|n| *n > 0)?;
        Some(self.latency_sum / total)
    }
}

/// Aggregated counters, overall and per task name.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    total: Counters,
    per_task: BTreeMap<ArcStr, Counters>,
}

impl Stats {
    pub fn record(&mut self, ev: &ReportEvent) {
        self.total.record(&ev.outcome, ev.latency);
        self.per_task
            .entry(ev.task.clone())
            .or_default()
            .record(&ev.outcome, ev.latency);
    }

    #[inline(always)]
    pub fn total(&self) -> &Counters {
        &self.total
    }

    pub fn task(&self, name: &str) -> Option<&Counters> {
        self.per_task.get(name)
    }

    pub fn tasks(&self) -> impl Iterator<Item = (&ArcStr, &Counters)> {
        self.per_task.iter()
    }
}
