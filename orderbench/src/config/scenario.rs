use std::time::Duration;

use orderbench_lib::{endpoint::EndpointProfile, order::OrderShape};

use super::UserConfig;

/// High level load scenarios.
/// Each scenario is a preset of tasks and simulated user behavior.
#[derive(Debug, Clone, Copy, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum Scenario {
    /// Sample orders against the fast-accept endpoint.
    Async,

    /// Sample orders against the synchronous endpoint.
    Sync,

    /// Random multi-item orders against the synchronous endpoint.
    #[default]
    Orders,

    /// Fast-accept and synchronous sample orders, one user each in turn.
    Mixed,
}

/// Task registered by a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPreset {
    pub name: &'static str,
    pub profile: EndpointProfile,
    pub shape: OrderShape,
    pub weight: u32,
}

const ORDERS_TIMEOUT: Duration = Duration::from_secs(8);

impl Scenario {
    /// Construct the simulated user configuration
    /// associated with this scenario.
    pub fn user_config(self) -> UserConfig {
        let wait_min = Some(Duration::from_millis(100).into());
        let wait_max = Some(Duration::from_millis(500).into());

        match self {
            Scenario::Async | Scenario::Sync => UserConfig {
                users: Some(1),
                wait_min,
                wait_max,
                timeout: None,
            },
            Scenario::Orders => UserConfig {
                users: Some(1),
                wait_min,
                wait_max,
                timeout: Some(ORDERS_TIMEOUT.into()),
            },
            Scenario::Mixed => UserConfig {
                users: Some(2),
                wait_min,
                wait_max,
                timeout: None,
            },
        }
    }

    /// Tasks to register, without timeout overwrites applied.
    pub fn tasks(self) -> Vec<TaskPreset> {
        let async_task = TaskPreset {
            name: "async",
            profile: EndpointProfile::fast_accept(),
            shape: OrderShape::Sample,
            weight: 1,
        };
        let sync_task = TaskPreset {
            name: "sync",
            profile: EndpointProfile::synchronous(),
            shape: OrderShape::Sample,
            weight: 1,
        };

        match self {
            Scenario::Async => vec![async_task],
            Scenario::Sync => vec![sync_task],
            Scenario::Orders => vec![TaskPreset {
                name: "orders",
                profile: EndpointProfile::synchronous().with_timeout(ORDERS_TIMEOUT),
                shape: OrderShape::Random,
                weight: 1,
            }],
            Scenario::Mixed => vec![async_task, sync_task],
        }
    }
}
