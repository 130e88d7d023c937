use orderbench_lib::report::{Counters, ReportEvent, Reporter, Stats};

use super::{ClosedInterval, IntervalState, millis};

pub struct HumanReporter {
    state: IntervalState,
    total_counts: Counters,
}

impl HumanReporter {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            state: IntervalState::new(interval),
            total_counts: Counters::default(),
        }
    }

    fn interval_line(&self, now: std::time::Duration, closed: &ClosedInterval) -> String {
        let counts = &closed.counts;
        let (user, it) = self.state.last_pos.unwrap_or_default();
        format!(
            "t={:.1}s user={} it={} rps={:.1} ok={} status_fail={} timeout={} conn_fail={} total_ok={} total_fail={}",
            now.as_secs_f64(),
            user,
            it,
            closed.rps(),
            counts.ok,
            counts.unexpected_status,
            counts.timeout,
            counts.connection_error,
            self.total_counts.ok,
            self.total_counts.failed(),
        )
    }

    fn summary_lines(stats: &Stats) -> Vec<String> {
        let mut lines = Vec::new();
        for (name, counts) in stats.tasks() {
            lines.push(format!("task={name} {}", counts_line(counts)));
        }
        lines.push(format!("done {}", counts_line(stats.total())));
        lines
    }
}

fn counts_line(counts: &Counters) -> String {
    format!(
        "ok={} status_fail={} timeout={} conn_fail={} total={} mean_ms={:.1} max_ms={:.1}",
        counts.ok,
        counts.unexpected_status,
        counts.timeout,
        counts.connection_error,
        counts.total,
        counts.mean_latency().map(millis).unwrap_or_default(),
        millis(counts.latency_max),
    )
}

impl Reporter for HumanReporter {
    fn on_report(&mut self, ev: &ReportEvent) {
        self.state.record(ev);
        self.total_counts.record(&ev.outcome, ev.latency);
    }

    fn on_tick(&mut self, now: std::time::Duration) {
        if let Some(closed) = self.state.tick(now) {
            println!("{}", self.interval_line(now, &closed));
        }
    }

    fn finish(&mut self, stats: &Stats) {
        for line in Self::summary_lines(stats) {
            println!("{line}");
        }
    }
}
