use orderbench_lib::report::{Counters, ReportEvent, Reporter, Stats};
use serde_json::{Value, json};

use super::{ClosedInterval, IntervalState, millis};

pub struct JsonlReporter {
    state: IntervalState,
    total_counts: Counters,
    emit_events: bool,
}

impl JsonlReporter {
    pub fn new(interval: std::time::Duration, emit_events: bool) -> Self {
        Self {
            state: IntervalState::new(interval),
            total_counts: Counters::default(),
            emit_events,
        }
    }

    fn event_line(ev: &ReportEvent) -> Value {
        json!({
            "type": "event",
            "t_ms": ev.elapsed.as_millis(),
            "task": ev.task.as_str(),
            "user": ev.user,
            "iteration": ev.iteration,
            "latency_ms": millis(ev.latency),
            "ok": ev.outcome.is_success(),
            "failure": ev.outcome.failure().map(|reason| reason.kind()),
            "reason": ev.outcome.failure().map(|reason| reason.to_string()),
        })
    }

    fn summary_line(&self, now: std::time::Duration, closed: &ClosedInterval) -> Value {
        let counts = &closed.counts;
        let (user, iteration) = self.state.last_pos.unwrap_or_default();
        json!({
            "type": "summary",
            "t_ms": now.as_millis(),
            "user": user,
            "iteration": iteration,
            "interval_ms": closed.elapsed.as_millis(),
            "rps": closed.rps(),
            "interval": counts_value(counts),
            "total": counts_value(&self.total_counts),
        })
    }

    fn final_line(stats: &Stats) -> Value {
        let tasks: serde_json::Map<String, Value> = stats
            .tasks()
            .map(|(name, counts)| (name.to_string(), counts_value(counts)))
            .collect();
        json!({
            "type": "final",
            "tasks": tasks,
            "total": counts_value(stats.total()),
        })
    }
}

fn counts_value(counts: &Counters) -> Value {
    json!({
        "total": counts.total,
        "ok": counts.ok,
        "unexpected_status": counts.unexpected_status,
        "timeout": counts.timeout,
        "connection_error": counts.connection_error,
        "mean_latency_ms": counts.mean_latency().map(millis),
        "max_latency_ms": millis(counts.latency_max),
    })
}

impl Reporter for JsonlReporter {
    fn on_report(&mut self, ev: &ReportEvent) {
        self.state.record(ev);
        self.total_counts.record(&ev.outcome, ev.latency);

        if self.emit_events {
            println!("{}", Self::event_line(ev));
        }
    }

    fn on_tick(&mut self, now: std::time::Duration) {
        if let Some(closed) = self.state.tick(now) {
            println!("{}", self.summary_line(now, &closed));
        }
    }

    fn finish(&mut self, stats: &Stats) {
        println!("{}", Self::final_line(stats));
    }
}
