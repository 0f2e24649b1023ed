//! Error types for timetable generation.
//!
//! Errors fall into three families that callers treat differently:
//!
//! | Family | Variant | Retry? |
//! |--------|---------|--------|
//! | Bad input | [`SchedulingError::Configuration`] | no, fix the data |
//! | Broken contract | [`SchedulingError::ModelBuild`], [`SchedulingError::Internal`] | no, a bug |
//! | Solve failure | [`SchedulingError::Solver`] | no, the model is deterministic |
//!
//! Concurrency outcomes (`SemesterBusy`, `Cancelled`) are reported
//! separately so callers can tell them apart from data problems.

use thiserror::Error;

use crate::milp::{SolveStage, SolveStatus};
use crate::models::Semester;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Top-level error for a generation run or a schedule edit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    /// Input data cannot produce a valid model.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The model builder hit an internal inconsistency.
    #[error("model build error: {0}")]
    ModelBuild(String),

    /// A solve stage reported a non-success status.
    #[error("solver error during {stage} stage: {status}")]
    Solver {
        /// Which stage failed.
        stage: SolveStage,
        /// Status reported by the solver.
        status: SolveStatus,
    },

    /// Generic scheduling inconsistency.
    #[error("scheduling error: {0}")]
    Internal(String),

    /// Another generation run or a point edit holds the semester.
    #[error("{0} is busy with another generation or edit")]
    SemesterBusy(Semester),

    /// The caller cancelled the run.
    #[error("generation for {0} was cancelled")]
    Cancelled(Semester),

    /// A point edit referenced a section missing from the schedule.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Input problems detected before or while building the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The week template yields no time slots.
    #[error("week template has an empty time-slot domain (days={days_per_week}, hours={start_hour}..{end_hour})")]
    EmptyTimeDomain {
        days_per_week: u32,
        start_hour: u32,
        end_hour: u32,
    },

    /// No room of the given kind exists (or all have zero capacity).
    #[error("no room with positive capacity serves session type '{0}'")]
    NoRoomsForSessionType(String),

    /// A section's roster exceeds every suitable room.
    #[error("section '{section_id}' ({roster_size} students) fits no room (largest suitable capacity: {largest_capacity})")]
    NoFeasibleRoom {
        section_id: String,
        roster_size: usize,
        largest_capacity: u32,
    },

    /// A section's instructor is unavailable in every slot.
    #[error("section '{section_id}' has no time slot in which its instructor is available")]
    NoAvailableSlot { section_id: String },

    /// A course unit requires more session types than supported.
    #[error("course unit '{course_code}' requires {count} session types (supported: 1 or 2)")]
    UnsupportedSessionTypes { course_code: String, count: usize },

    /// Structural validation findings.
    #[error("invalid planning input: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// Configuration file could not be read or parsed.
    #[error("configuration file: {0}")]
    File(String),
}

impl SchedulingError {
    /// Shorthand for a solver failure.
    pub fn solver(stage: SolveStage, status: SolveStatus) -> Self {
        Self::Solver { stage, status }
    }

    /// Whether the error stems from input data rather than a bug or solve failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
