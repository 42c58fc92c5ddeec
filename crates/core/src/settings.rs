//! Tunables for a tracking simulation.

use crate::error::CoreError;
use crate::geo::{validate_damping, validate_epsilon, DEFAULT_ARRIVAL_EPSILON, DEFAULT_DAMPING};
use crate::timeline::StatusTimeline;

/// Timeline plus interpolation parameters shared by every session a
/// controller starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub timeline: StatusTimeline,
    /// Fraction of the remaining distance closed per tick, in `(0, 1)`.
    pub damping: f64,
    /// Per-axis arrival tolerance in degrees.
    pub arrival_epsilon: f64,
}

impl SimulationSettings {
    pub fn new(timeline: StatusTimeline, damping: f64, arrival_epsilon: f64) -> Result<Self, CoreError> {
        let settings = Self {
            timeline,
            damping,
            arrival_epsilon,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the numeric parameters. The timeline validates itself on
    /// construction.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_damping(self.damping)?;
        validate_epsilon(self.arrival_epsilon)?;
        Ok(())
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            timeline: StatusTimeline::default(),
            damping: DEFAULT_DAMPING,
            arrival_epsilon: DEFAULT_ARRIVAL_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_damping() {
        assert!(SimulationSettings::new(StatusTimeline::default(), 1.5, 0.001).is_err());
    }

    #[test]
    fn rejects_bad_epsilon() {
        assert!(SimulationSettings::new(StatusTimeline::default(), 0.08, 0.0).is_err());
    }
}
