pub mod env;
pub mod fs;
pub mod telemetry;
