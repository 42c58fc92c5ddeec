use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use homepro_core::settings::SimulationSettings;
use homepro_core::timeline::StatusTimeline;

use crate::error::TrackerError;

/// Tracker configuration loaded from environment variables.
///
/// All fields have defaults matching the stock simulation, so an empty
/// environment yields a working setup.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Period of the session tick (default: 2 s).
    pub tick_interval: Duration,
    /// Pause between completion and opening the review flow (default: 2 s).
    pub review_delay: Duration,
    /// Timeline and interpolation parameters.
    pub simulation: SimulationSettings,
    /// Where the key-value state (intro flag) is persisted.
    pub state_file: PathBuf,
}

impl TrackerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                      | Default               |
    /// |------------------------------|-----------------------|
    /// | `TRACKING_TICK_MS`           | `2000`                |
    /// | `TRACKING_REVIEW_DELAY_MS`   | `2000`                |
    /// | `TRACKING_ON_THE_WAY_SECS`   | `3`                   |
    /// | `TRACKING_IN_PROGRESS_SECS`  | `8`                   |
    /// | `TRACKING_COMPLETED_SECS`    | `15`                  |
    /// | `TRACKING_DAMPING`           | `0.08`                |
    /// | `TRACKING_ARRIVAL_EPSILON`   | `0.001`               |
    /// | `TRACKING_STATE_FILE`        | `.homepro-state.json` |
    pub fn from_env() -> Result<Self, TrackerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tick_ms: u64 = parse_var(&lookup, "TRACKING_TICK_MS", 2000)?;
        let review_delay_ms: u64 = parse_var(&lookup, "TRACKING_REVIEW_DELAY_MS", 2000)?;

        let timeline = StatusTimeline::from_delays(
            Duration::from_secs(parse_var(&lookup, "TRACKING_ON_THE_WAY_SECS", 3)?),
            Duration::from_secs(parse_var(&lookup, "TRACKING_IN_PROGRESS_SECS", 8)?),
            Duration::from_secs(parse_var(&lookup, "TRACKING_COMPLETED_SECS", 15)?),
        )?;
        let simulation = SimulationSettings::new(
            timeline,
            parse_var(&lookup, "TRACKING_DAMPING", 0.08)?,
            parse_var(&lookup, "TRACKING_ARRIVAL_EPSILON", 0.001)?,
        )?;

        let state_file = lookup("TRACKING_STATE_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".homepro-state.json"));

        let config = Self {
            tick_interval: Duration::from_millis(tick_ms),
            review_delay: Duration::from_millis(review_delay_ms),
            simulation,
            state_file,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that public construction can bypass.
    ///
    /// A zero tick interval is rejected; the simulation settings are
    /// re-validated.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.tick_interval.is_zero() {
            return Err(TrackerError::Config(
                "TRACKING_TICK_MS must be greater than zero".to_string(),
            ));
        }
        self.simulation.validate()?;
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(2),
            review_delay: Duration::from_secs(2),
            simulation: SimulationSettings::default(),
            state_file: PathBuf::from(".homepro-state.json"),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, TrackerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| TrackerError::Config(format!("{name} has an invalid value: '{raw}'"))),
    }
}
