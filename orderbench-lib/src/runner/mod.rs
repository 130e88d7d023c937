//! Simulated user orchestration.
//!
//! A [`RunPlan`] registers one or more [`ScenarioTask`]s (with a weight),
//! the wait time between invocations, the amount of simulated users and
//! when to stop. A [`TaskRunner`] executes that plan:
//!
//! - [`ConcurrentRunner`]: every user is its own tokio task;
//! - [`SequentialRunner`]: users take turns on the calling task,
//!   deterministic when seeded.
//!
//! Each user loops `wait -> execute -> report` until the [`RunLimit`] is reached.

use std::time::Duration;

use rama::utils::str::arcstr::ArcStr;
use rand::{SeedableRng as _, rngs::SmallRng};

use crate::{
    outcome::Submission,
    report::{Reporter, Stats},
};

mod concurrent;
mod sequential;
mod wait;

pub use self::{concurrent::ConcurrentRunner, sequential::SequentialRunner, wait::WaitTime};

/// One unit of work executed by a simulated user.
pub trait ScenarioTask: Send + Sync + 'static {
    fn name(&self) -> &ArcStr;

    /// Execute the task once, using the user's own random source.
    fn execute<'a>(
        &'a self,
        rng: &'a mut SmallRng,
    ) -> impl Future<Output = Submission> + Send + 'a;
}

pub trait TaskRunner {
    /// Run the plan to completion, returning the aggregated stats.
    ///
    /// The reporter sees every result as it comes in
    /// and gets [`Reporter::finish`] called once at the end.
    fn run<T, R>(self, plan: RunPlan<T>, reporter: R) -> impl Future<Output = Stats> + Send
    where
        T: ScenarioTask,
        R: Reporter;
}

/// When simulated users stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    /// Stop starting new iterations once the duration has elapsed.
    Duration(Duration),
    /// Each user executes its task this many times.
    Iterations(usize),
    /// Run until shutdown is triggered.
    UntilShutdown,
}

#[derive(Debug)]
pub struct RunPlan<T> {
    tasks: Vec<T>,
    weights: Vec<u32>,
    wait_time: WaitTime,
    users: usize,
    limit: RunLimit,
}

impl<T> RunPlan<T> {
    pub fn new(wait_time: WaitTime) -> Self {
        Self {
            tasks: Vec::new(),
            weights: Vec::new(),
            wait_time,
            users: 1,
            limit: RunLimit::UntilShutdown,
        }
    }

    /// Register a task, a weight of 0 is treated as 1.
    pub fn with_task(mut self, task: T, weight: u32) -> Self {
        self.tasks.push(task);
        self.weights.push(weight.max(1));
        self
    }

    pub fn with_users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    pub fn with_limit(mut self, limit: RunLimit) -> Self {
        self.limit = limit;
        self
    }

    #[inline(always)]
    pub fn users(&self) -> usize {
        self.users
    }

    #[inline(always)]
    pub fn limit(&self) -> RunLimit {
        self.limit
    }

    #[inline(always)]
    pub fn wait_time(&self) -> WaitTime {
        self.wait_time
    }

    pub fn tasks(&self) -> &[T] {
        &self.tasks
    }

    /// Task index per simulated user.
    pub fn assignment(&self) -> Vec<usize> {
        assign_users(&self.weights, self.users)
    }

    pub(crate) fn into_parts(self) -> (Vec<T>, Vec<usize>, WaitTime, RunLimit) {
        let assignment = assign_users(&self.weights, self.users);
        (self.tasks, assignment, self.wait_time, self.limit)
    }
}

/// Distribute users over weighted tasks using smooth weighted round-robin,
/// so that the assignment is proportional to the weights and interleaved.
pub fn assign_users(weights: &[u32], users: usize) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }

    let total: i64 = weights.iter().map(|w| *w as i64).sum();
    let mut current = vec![0i64; weights.len()];

    (0..users)
        .map(|_| {
            let mut selected = 0;
            for (index, weight) in weights.iter().enumerate() {
                current[index] += *weight as i64;
                if current[index] > current[selected] {
                    selected = index;
                }
            }
            current[selected] -= total;
            selected
        })
        .collect()
}

fn new_user_rng(seed: Option<u64>, user: usize) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(user as u64)),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}
