//! University timetable generation for the U-Engine ecosystem.
//!
//! Partitions course-unit enrollment into sections bounded by room
//! capacity, assigns every section a room and a weekly time slot through a
//! mixed-integer linear program, and keeps the result as versioned,
//! per-semester schedules.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `WeekTemplate`, `TimeSlot`, `CourseUnit`,
//!   `Room`, `Instructor`, `Section`, `ScheduleEntry`, `GlobalSchedule`
//! - **`validation`**: Input integrity checks (duplicate IDs, session types, room kinds)
//! - **`partition`**: `SectionPartitioner`, enrollment → sections
//! - **`milp`**: Model building, two-stage solve, solution decoding
//! - **`engine`**: Orchestration, locking, storage, conflicts, verification, KPIs
//! - **`config`**: TOML engine configuration
//! - **`error`**: Error taxonomy
//!
//! # Example
//!
//! ```
//! use u_timetable::config::EngineConfig;
//! use u_timetable::engine::{PlanningInput, Timetabler};
//! use u_timetable::milp::GoodLpSolver;
//! use u_timetable::models::{CourseUnit, Room, Semester, WeekTemplate};
//!
//! let input = PlanningInput::new(
//!     vec![CourseUnit::new("DB201", "Databases", "prof")
//!         .with_session_type("lab")
//!         .with_students(["s1", "s2", "s3"])],
//!     vec![Room::new("L1", "lab", 20)],
//! );
//! let config = EngineConfig::default().with_week(WeekTemplate::new(2, 8, 13));
//! let report = Timetabler::new(config)
//!     .run(&input, Semester::First, &GoodLpSolver::new())
//!     .unwrap();
//! assert_eq!(report.schedule.len(), 1);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

pub mod config;
pub mod engine;
pub mod error;
pub mod milp;
pub mod models;
pub mod partition;
pub mod validation;
