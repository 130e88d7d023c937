/// Simulated user configuration.
/// This models how orders are produced over time.
#[derive(Debug, Clone, clap::Args, Default, PartialEq, Eq)]
pub struct UserConfig {
    /// Number of simulated users.
    #[arg(long, value_name = "N")]
    pub users: Option<usize>,

    /// Minimum wait between two tasks of the same user.
    #[arg(long, value_name = "DURATION")]
    pub wait_min: Option<humantime::Duration>,

    /// Maximum wait between two tasks of the same user.
    #[arg(long, value_name = "DURATION")]
    pub wait_max: Option<humantime::Duration>,

    /// Time a single order submission may take.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<humantime::Duration>,
}
