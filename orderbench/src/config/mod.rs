mod scenario;
mod user;

pub use self::{
    scenario::{Scenario, TaskPreset},
    user::UserConfig,
};
