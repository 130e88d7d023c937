use std::time::Duration;

use rama::{
    error::{BoxError, ErrorContext as _},
    graceful::ShutdownGuard,
    http::Uri,
    rt::Executor,
    telemetry::tracing,
};

use clap::Args;
use orderbench_lib::{
    client::new_web_client,
    report::{Reporter, Stats},
    runner::{ConcurrentRunner, RunLimit, RunPlan, SequentialRunner, TaskRunner as _, WaitTime},
    scenario::OrderTask,
};

use crate::config::{Scenario, UserConfig};

pub mod reporter;

use self::reporter::*;

#[derive(Debug, Clone, Args)]
/// run order scenarios against an order API
pub struct RunCommand {
    /// base url of the order API, e.g. http://127.0.0.1:8080
    #[arg(value_name = "TARGET_URL", required = true)]
    target: Uri,

    #[arg(long)]
    /// Scenario to run,
    /// manually defined parameters overwrite scenario parameters.
    scenario: Option<Scenario>,

    #[clap(flatten)]
    config: Option<UserConfig>,

    /// stop starting new tasks after this duration
    #[arg(long, value_name = "DURATION", conflicts_with = "iterations")]
    run_time: Option<humantime::Duration>,

    /// amount of tasks each simulated user executes
    #[arg(long, value_name = "N")]
    iterations: Option<usize>,

    /// seed the random sources of the simulated users,
    /// making the generated orders reproducible
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// run all simulated users one after the other on a single task
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// report json instead of a human-friendly format
    #[arg(long, default_value_t = false)]
    json: bool,
}

pub async fn exec(guard: ShutdownGuard, args: RunCommand) -> Result<(), BoxError> {
    let base = base_url(&args.target)?;

    let client = new_web_client(Executor::graceful(guard.clone())).context("create HTTP client")?;

    let scenario = args.scenario.unwrap_or_default();
    let merged_cfg = merge_user_cfg(scenario, args.config);

    let users = merged_cfg.users.unwrap_or(1).max(1);
    let wait_time = wait_time(&merged_cfg)?;
    let limit = run_limit(args.run_time.map(Into::into), args.iterations);

    tracing::info!(
        %base,
        ?scenario,
        %users,
        ?wait_time,
        ?limit,
        seed = ?args.seed,
        sequential = %args.sequential,
        "run config parameters ready",
    );

    let mut plan = RunPlan::new(wait_time)
        .with_users(users)
        .with_limit(limit);
    for task in scenario.tasks() {
        let profile = match merged_cfg.timeout {
            Some(timeout) => task.profile.with_timeout(timeout.into()),
            None => task.profile,
        };
        plan = plan.with_task(
            OrderTask::new(task.name, client.clone(), base.as_str(), profile, task.shape),
            task.weight,
        );
    }

    const REPORT_INTERVAL: Duration = Duration::from_secs(1);

    let reporter: Box<dyn Reporter> = if args.json {
        const EMIT_EVENTS: bool = true;
        Box::new(JsonlReporter::new(REPORT_INTERVAL, EMIT_EVENTS))
    } else {
        Box::new(HumanReporter::new(REPORT_INTERVAL))
    };

    let stats = if args.sequential {
        SequentialRunner::new()
            .with_seed(args.seed)
            .with_shutdown_guard(guard)
            .run(plan, reporter)
            .await
    } else {
        ConcurrentRunner::new(guard)
            .with_seed(args.seed)
            .with_report_interval(REPORT_INTERVAL)
            .run(plan, reporter)
            .await
    };

    log_stats(&stats);
    Ok(())
}

fn base_url(target: &Uri) -> Result<String, BoxError> {
    match target.scheme_str() {
        Some("http" | "https") if target.authority().is_some() => Ok(target.to_string()),
        _ => Err(BoxError::from(format!(
            "target '{target}' is not an absolute http(s) url"
        ))),
    }
}

fn wait_time(cfg: &UserConfig) -> Result<WaitTime, BoxError> {
    Ok(match (cfg.wait_min, cfg.wait_max) {
        (Some(min), Some(max)) => WaitTime::try_between(min.into(), max.into())
            .context("create wait time between tasks")?,
        (Some(wait), None) | (None, Some(wait)) => WaitTime::constant(wait.into()),
        (None, None) => WaitTime::default(),
    })
}

/// A single wait bound overwrite means a constant wait,
/// it must not be paired with the other bound of the scenario.
fn pin_single_wait_bound(mut cfg: UserConfig) -> UserConfig {
    match (cfg.wait_min, cfg.wait_max) {
        (Some(wait), None) => {
            tracing::info!("only wait_min overwritten: use constant wait of {wait}");
            cfg.wait_max = Some(wait);
        }
        (None, Some(wait)) => {
            tracing::info!("only wait_max overwritten: use constant wait of {wait}");
            cfg.wait_min = Some(wait);
        }
        _ => (),
    }
    cfg
}

fn run_limit(run_time: Option<Duration>, iterations: Option<usize>) -> RunLimit {
    match (run_time, iterations) {
        (Some(duration), _) => RunLimit::Duration(duration),
        (None, Some(n)) => RunLimit::Iterations(n),
        (None, None) => RunLimit::UntilShutdown,
    }
}

fn log_stats(stats: &Stats) {
    for (task, counts) in stats.tasks() {
        tracing::info!(
            %task,
            total = counts.total,
            ok = counts.ok,
            failed = counts.failed(),
            mean_latency = ?counts.mean_latency(),
            max_latency = ?counts.latency_max,
            "task stats",
        );
    }
    let total = stats.total();
    tracing::info!(
        total = total.total,
        ok = total.ok,
        unexpected_status = total.unexpected_status,
        timeout = total.timeout,
        connection_error = total.connection_error,
        "run finished",
    );
}

fn merge_user_cfg(scenario: Scenario, config: Option<UserConfig>) -> UserConfig {
    tracing::info!("use scenario to define base config: {scenario:?}");
    let scenario_cfg = scenario.user_config();

    let overwrite_cfg = pin_single_wait_bound(config.unwrap_or_default());

    macro_rules! merge_config {
        ($scenario:ident, $overwrite:ident, {$($property:ident),+ $(,)?}) => {
            UserConfig {
                $(
                    $property: if let Some(value) = $overwrite.$property {
                        tracing::info!("property '{}': use overwrite: {value}", stringify!($property));
                        Some(value)
                    } else if let Some(value) = $scenario.$property {
                        tracing::info!("property '{}': use scenario: {value}", stringify!($property));
                        Some(value)
                    } else {
                        tracing::info!("property '{}': undefined", stringify!($property));
                        None
                    },
                )+
            }
        };
    }

    merge_config!(
        scenario_cfg, overwrite_cfg,
        {
            users,
            wait_min,
            wait_max,
            timeout,
        }
    )
}
