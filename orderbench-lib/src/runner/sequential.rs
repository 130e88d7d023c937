use rama::{graceful::ShutdownGuard, telemetry::tracing};
use tokio::time::{Instant, sleep};

use super::{RunLimit, RunPlan, ScenarioTask, TaskRunner, new_user_rng};
use crate::report::{ReportEvent, Reporter, Stats};

/// Runs simulated users one at a time on the calling task.
///
/// Users take turns: each turn a single user waits and executes one
/// iteration. With a seed, the generated payloads are fully reproducible.
#[derive(Clone, Default)]
pub struct SequentialRunner {
    seed: Option<u64>,
    guard: Option<ShutdownGuard>,
}

impl SequentialRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Stop early once this guard is cancelled.
    ///
    /// Without a guard a [`RunLimit::UntilShutdown`] plan never ends.
    pub fn with_shutdown_guard(mut self, guard: ShutdownGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    async fn cancelled(guard: Option<&ShutdownGuard>) {
        match guard {
            Some(guard) => guard.cancelled().await,
            None => std::future::pending().await,
        }
    }
}

impl TaskRunner for SequentialRunner {
    async fn run<T, R>(self, plan: RunPlan<T>, mut reporter: R) -> Stats
    where
        T: ScenarioTask,
        R: Reporter,
    {
        let (tasks, assignment, wait_time, limit) = plan.into_parts();

        let mut rngs: Vec<_> = (0..assignment.len())
            .map(|user| new_user_rng(self.seed, user))
            .collect();

        tracing::debug!(
            users = assignment.len(),
            ?limit,
            ?wait_time,
            "start sequential run"
        );

        let start = Instant::now();
        let deadline = match limit {
            RunLimit::Duration(duration) => Some(start + duration),
            RunLimit::Iterations(_) | RunLimit::UntilShutdown => None,
        };
        let max_iterations = match limit {
            RunLimit::Iterations(n) => Some(n),
            RunLimit::Duration(_) | RunLimit::UntilShutdown => None,
        };

        let mut stats = Stats::default();
        let mut iteration = 0;

        'run: loop {
            if max_iterations.is_some_and(|n| iteration >= n) {
                break;
            }

            for (user, task_index) in assignment.iter().copied().enumerate() {
                let task = &tasks[task_index];
                let rng = &mut rngs[user];

                let wait = wait_time.sample(rng);
                tokio::select! {
                    _ = Self::cancelled(self.guard.as_ref()) => {
                        tracing::debug!("exit sequential run early: guard shutdown");
                        break 'run;
                    }
                    _ = sleep(wait) => {}
                }

                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    break 'run;
                }

                let submission = tokio::select! {
                    _ = Self::cancelled(self.guard.as_ref()) => {
                        tracing::debug!("exit sequential run early: guard shutdown");
                        break 'run;
                    }
                    submission = task.execute(rng) => submission,
                };

                let ev = ReportEvent {
                    ts: std::time::SystemTime::now(),
                    elapsed: start.elapsed(),
                    user,
                    iteration,
                    task: task.name().clone(),
                    latency: submission.latency,
                    outcome: submission.outcome,
                };
                stats.record(&ev);
                reporter.on_report(&ev);
                reporter.on_tick(start.elapsed());
            }

            if assignment.is_empty() {
                break;
            }
            iteration += 1;
        }

        reporter.finish(&stats);
        stats
    }
}
