//! Simulation configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Knobs for the headless scenario.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub players: usize,
    pub steps: u32,
    /// Wall-clock pause between steps, which lets the drain loop run.
    pub step_delay: Duration,
    /// Simulated time added to the clock on every step.
    pub step_time: Duration,
    pub grant_per_step: f64,
    pub enable_persistence: bool,
    pub session_id: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            players: 3,
            steps: 120,
            step_delay: Duration::from_millis(50),
            step_time: Duration::from_secs(1_800),
            grant_per_step: 40.0,
            enable_persistence: false,
            session_id: None,
            data_dir: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SIM_PLAYERS` - Number of simulated players (default: 3)
    /// - `SIM_STEPS` - Scenario length in steps (default: 120)
    /// - `SIM_STEP_DELAY_MS` - Real pause between steps (default: 50)
    /// - `SIM_STEP_SECS` - Simulated seconds per step (default: 1800)
    /// - `SIM_GRANT` - Base essence granted per step (default: 40)
    /// - `ENABLE_PERSISTENCE` - Save player records to disk (default: false)
    /// - `SIM_SESSION_ID` - Log session name (default: timestamp)
    /// - `ESSENCE_DATA_DIR` - Config and save directory (default: platform-specific)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(players) = read_env::<usize>("SIM_PLAYERS") {
            config.players = players.max(1);
        }
        if let Some(steps) = read_env::<u32>("SIM_STEPS") {
            config.steps = steps;
        }
        if let Some(ms) = read_env::<u64>("SIM_STEP_DELAY_MS") {
            config.step_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = read_env::<u64>("SIM_STEP_SECS") {
            config.step_time = Duration::from_secs(secs);
        }
        if let Some(grant) = read_env::<f64>("SIM_GRANT")
            && grant.is_finite()
            && grant >= 0.0
        {
            config.grant_per_step = grant;
        }

        if let Some(enable) = read_env::<bool>("ENABLE_PERSISTENCE") {
            config.enable_persistence = enable;
        } else if env::var("ENABLE_PERSISTENCE").is_ok() {
            config.enable_persistence = true;
        }

        config.session_id = env::var("SIM_SESSION_ID").ok();
        config.data_dir = env::var("ESSENCE_DATA_DIR").ok().map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
