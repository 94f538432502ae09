//! Planner configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file (or no file)
//! yields the standard weights and rules.
//!
//! ```
//! use shiftopt::config::PlannerConfig;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     [solver]
//!     time_budget_secs = 120
//!     workers = 4
//!
//!     [weights]
//!     dummy = 500
//! "#).unwrap();
//!
//! assert_eq!(config.solver.workers, 4);
//! assert_eq!(config.weights.dummy, 500);
//! assert_eq!(config.weights.night_spread, 4);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{SolverBackend, SolverConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub solver: SolverSettings,
    pub weights: PenaltyWeights,
    pub rules: RuleSettings,
}

impl PlannerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.solver.time_budget_secs.is_finite() || self.solver.time_budget_secs <= 0.0 {
            return Err(ConfigError::Invalid("time_budget_secs must be positive".into()));
        }
        if self.solver.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.rules.full_time_weekly_hours <= 0.0 {
            return Err(ConfigError::Invalid(
                "full_time_weekly_hours must be positive".into(),
            ));
        }
        if self.rules.weekend_window_weeks == 0 || self.rules.night_window_days == 0 {
            return Err(ConfigError::Invalid("rolling windows must be non-empty".into()));
        }
        Ok(())
    }

    /// Solver configuration for one request; the request's own budget wins.
    pub fn solver_config(&self, request_budget_secs: Option<f64>) -> SolverConfig {
        let secs = request_budget_secs.unwrap_or(self.solver.time_budget_secs);
        SolverConfig {
            backend: self.solver.backend,
            time_limit: Some(Duration::from_secs_f64(secs)),
            workers: self.solver.workers,
            verbose: self.solver.verbose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverSettings {
    pub backend: SolverBackend,
    pub time_budget_secs: f64,
    pub workers: usize,
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_budget_secs: 30.0,
            workers: 8,
            verbose: false,
        }
    }
}

/// Objective coefficients of the soft rule families; 0 disables a family.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Per non-off shift covered by the dummy employee.
    pub dummy: i64,
    /// Per shift above a shift type's weekly cap.
    pub weekly_cap: i64,
    /// Per hour below the contracted ceiling.
    pub hours_shortfall: i64,
    pub night_spread: i64,
    pub equal_function_spread: i64,
    pub equal_group_spread: i64,
    /// Per worked weekend above the rolling-window limit.
    pub weekend_window: i64,
    pub consecutive_weekends: i64,
    pub weekend_spread: i64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            dummy: 300,
            weekly_cap: 4,
            hours_shortfall: 10,
            night_spread: 4,
            equal_function_spread: 4,
            equal_group_spread: 12,
            weekend_window: 2,
            consecutive_weekends: 8,
            weekend_spread: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Shifts shorter than this must be paired with another shift.
    pub short_shift_hours: f64,
    pub full_time_weekly_hours: f64,
    pub max_weekends_per_window: usize,
    pub weekend_window_weeks: usize,
    pub night_window_days: usize,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            short_shift_hours: 6.0,
            full_time_weekly_hours: 37.0,
            max_weekends_per_window: 2,
            weekend_window_weeks: 4,
            night_window_days: 7,
        }
    }
}
