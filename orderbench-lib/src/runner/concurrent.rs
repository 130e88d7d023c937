use std::{sync::Arc, time::Duration};

use rama::{graceful::ShutdownGuard, telemetry::tracing};
use tokio::{
    sync::mpsc::{self, Sender},
    time::{Instant, MissedTickBehavior, sleep_until},
};

use super::{RunLimit, RunPlan, ScenarioTask, TaskRunner, WaitTime, new_user_rng};
use crate::report::{ReportEvent, Reporter, Stats};

const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Runs every simulated user as its own task,
/// spawned on the graceful shutdown guard.
///
/// Results are funneled over a channel into the collector loop,
/// which owns the [`Stats`] and the [`Reporter`].
#[derive(Clone)]
pub struct ConcurrentRunner {
    guard: ShutdownGuard,
    seed: Option<u64>,
    report_interval: Duration,
}

impl ConcurrentRunner {
    pub fn new(guard: ShutdownGuard) -> Self {
        Self {
            guard,
            seed: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Interval at which the reporter is ticked when no results arrive.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }
}

impl TaskRunner for ConcurrentRunner {
    async fn run<T, R>(self, plan: RunPlan<T>, mut reporter: R) -> Stats
    where
        T: ScenarioTask,
        R: Reporter,
    {
        let (tasks, assignment, wait_time, limit) = plan.into_parts();
        let tasks: Vec<Arc<T>> = tasks.into_iter().map(Arc::new).collect();

        tracing::info!(
            users = assignment.len(),
            ?limit,
            ?wait_time,
            "start concurrent run"
        );

        let start = Instant::now();
        let deadline = match limit {
            RunLimit::Duration(duration) => Some(start + duration),
            RunLimit::Iterations(_) | RunLimit::UntilShutdown => None,
        };

        let (result_tx, mut result_rx) = mpsc::channel(assignment.len().max(1) * 8);

        for (user, task_index) in assignment.into_iter().enumerate() {
            let user = SimulatedUser {
                id: user,
                task: tasks[task_index].clone(),
                wait_time,
                limit,
                deadline,
                start,
                seed: self.seed,
                result_tx: result_tx.clone(),
            };
            self.guard
                .spawn_task_fn(async move |guard| user.run(guard).await);
        }
        drop(result_tx);

        let mut stats = Stats::default();
        let mut ticker = tokio::time::interval(self.report_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                maybe_ev = result_rx.recv() => {
                    let Some(ev) = maybe_ev else {
                        tracing::debug!("exit collector: all simulated users are done");
                        break;
                    };
                    stats.record(&ev);
                    reporter.on_report(&ev);
                    reporter.on_tick(start.elapsed());
                }
                _ = ticker.tick() => {
                    reporter.on_tick(start.elapsed());
                }
            }
        }

        reporter.finish(&stats);
        stats
    }
}

struct SimulatedUser<T> {
    id: usize,
    task: Arc<T>,
    wait_time: WaitTime,
    limit: RunLimit,
    deadline: Option<Instant>,
    start: Instant,
    seed: Option<u64>,
    result_tx: Sender<ReportEvent>,
}

impl<T: ScenarioTask> SimulatedUser<T> {
    async fn run(self, guard: ShutdownGuard) {
        let mut rng = new_user_rng(self.seed, self.id);
        let mut iteration = 0;

        loop {
            if let RunLimit::Iterations(n) = self.limit
                && iteration >= n
            {
                tracing::trace!(user = self.id, "simulated user done: iterations reached");
                return;
            }

            let wake_up = Instant::now() + self.wait_time.sample(&mut rng);
            tokio::select! {
                _ = guard.cancelled() => {
                    tracing::debug!(user = self.id, "exit simulated user: guard shutdown");
                    return;
                }
                _ = sleep_until(self.deadline.map_or(wake_up, |deadline| deadline.min(wake_up))) => {}
            }

            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::trace!(user = self.id, "simulated user done: duration elapsed");
                return;
            }

            let submission = tokio::select! {
                _ = guard.cancelled() => {
                    tracing::debug!(user = self.id, "cancel in-flight task: guard shutdown");
                    return;
                }
                submission = self.task.execute(&mut rng) => submission,
            };

            let ev = ReportEvent {
                ts: std::time::SystemTime::now(),
                elapsed: self.start.elapsed(),
                user: self.id,
                iteration,
                task: self.task.name().clone(),
                latency: submission.latency,
                outcome: submission.outcome,
            };

            if let Err(err) = self.result_tx.send(ev).await {
                tracing::debug!("failed to send task report msg: {err}");
                return;
            }

            iteration += 1;
        }
    }
}
