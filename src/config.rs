//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! [week]
//! days_per_week = 5
//! start_hour = 8
//! end_hour = 18
//!
//! [constraints]
//! student_conflicts = true
//!
//! [solver]
//! timeout_secs = 120
//! selection_tolerance = 1e-5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigurationError;
use crate::milp::DEFAULT_SELECTION_TOLERANCE;
use crate::models::WeekTemplate;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Schedulable week.
    pub week: WeekTemplate,
    /// Optional constraint families.
    pub constraints: ConstraintToggles,
    /// Solver limits.
    pub solver: SolverSettings,
}

/// Switches for constraint families that may be disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintToggles {
    /// Forbid a student from attending two sections in one slot.
    pub student_conflicts: bool,
}

impl Default for ConstraintToggles {
    fn default() -> Self {
        Self {
            student_conflicts: true,
        }
    }
}

/// Solver limits and numeric tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Wall-clock budget for the whole two-stage solve.
    pub timeout_secs: u64,
    /// Distance from 1 within which a value counts as selected.
    pub selection_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            selection_tolerance: DEFAULT_SELECTION_TOLERANCE,
        }
    }
}

impl SolverSettings {
    /// Solve budget as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigurationError::File(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::File(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Sets the week template.
    pub fn with_week(mut self, week: WeekTemplate) -> Self {
        self.week = week;
        self
    }

    /// Enables or disables student-conflict constraints.
    pub fn with_student_conflicts(mut self, enabled: bool) -> Self {
        self.constraints.student_conflicts = enabled;
        self
    }

    /// Sets the solve timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.solver.timeout_secs = secs;
        self
    }

    /// Checks values the week and solver rely on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.week.validate()?;
        let tol = self.solver.selection_tolerance;
        if !(0.0..0.5).contains(&tol) {
            return Err(ConfigurationError::File(format!(
                "solver.selection_tolerance must be in [0, 0.5), got {tol}"
            )));
        }
        Ok(())
    }
}
