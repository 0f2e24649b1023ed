//! Timetable generation engine.
//!
//! Orchestrates partitioning, model building, solving and decoding, and
//! keeps the versioned schedule per semester.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`Timetabler`] | Synchronous pipeline for one run |
//! | [`TimetableEngine`] | Async orchestration: locking, timeout, cancellation, storage, point edits |
//! | [`Catalog`] | Read access to rooms, course units, instructors |
//! | [`ScheduleStore`] | Versioned schedule persistence |
//! | [`check_conflicts`] | Ad hoc clash check for one proposed entry |
//! | [`verify_schedule`] | Full invariant check of a schedule |
//! | [`ScheduleKpi`] | Quality metrics |
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"
//! - McCollum et al. (2010), "Setting the Research Agenda in Automated Timetabling"

mod catalog;
mod conflicts;
mod kpi;
mod locks;
mod service;
mod store;
mod timetabler;
mod verify;

pub use catalog::{Catalog, InMemoryCatalog};
pub use conflicts::{check_conflicts, ConflictReport, StudentConflict};
pub use kpi::ScheduleKpi;
pub use locks::{SemesterClaim, SemesterLocks};
pub use service::{EditOutcome, GenerationHandle, TimetableEngine};
pub use store::{InMemoryScheduleStore, ScheduleStore};
pub use timetabler::{GenerationReport, ModelStats, PlanningInput, PreparedRun, Timetabler};
pub use verify::{verify_schedule, Violation, ViolationType};
