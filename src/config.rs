use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tunables of a simulation run. Every field has a default, so a config file
/// only has to name what it changes:
///
/// ```
/// # use isospin::SimulationConfig;
/// let config = SimulationConfig::from_json(r#"{ "steady_state": { "max_repetitions": 500 } }"#).unwrap();
/// assert_eq!(config.steady_state.max_repetitions, 500);
/// assert_eq!(config.steady_state.threshold, 1e-4);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub steady_state: SteadyStateConfig,
    pub ensemble: EnsembleConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteadyStateConfig {
    /// Convergence is reached once the magnitude of the net magnetization
    /// changes by less than this between two repetitions.
    pub threshold: f64,
    /// Upper bound on the number of repetitions before giving up.
    pub max_repetitions: usize,
}

impl Default for SteadyStateConfig {
    fn default() -> Self {
        Self {
            threshold: 1e-4,
            max_repetitions: 10_000,
        }
    }
}

/// Controls the automatic Lorentzian isochromat distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Half bandwidth of the frequency grid in units of 1/T2'.
    pub lorentz_widths: f64,
    /// Revival period of the discrete ensemble in units of T2. The frequency
    /// spacing is `2π / (revival_periods * T2)`.
    pub revival_periods: f64,
    pub min_isochromats: usize,
    pub max_isochromats: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            lorentz_widths: 32.0,
            revival_periods: 8.0,
            min_isochromats: 64,
            max_isochromats: 1 << 20,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn partial_override() {
        let config =
            SimulationConfig::from_json(r#"{ "ensemble": { "min_isochromats": 16 } }"#).unwrap();
        assert_eq!(config.ensemble.min_isochromats, 16);
        assert_eq!(config.ensemble.lorentz_widths, 32.0);
        assert_eq!(config.steady_state, SteadyStateConfig::default());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SimulationConfig::from_json("{ steady_state: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn json_round_trip() {
        let mut config = SimulationConfig::default();
        config.steady_state.threshold = 1e-6;
        let json = config.to_json().unwrap();
        assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
    }
}
