//! MILP formulation of section-to-room-and-slot assignment.
//!
//! Builds an [`IntegerProgram`] from sections, rooms and the week template,
//! hands it to a [`MilpSolver`] in two stages, and decodes the solved values
//! back into schedule entries.
//!
//! # Pipeline
//!
//! ```text
//! sections ─► ConstraintModelBuilder ─► IntegerProgram
//!                                          │
//!                          solve_two_stage (relaxation → integer)
//!                                          │
//!                      SolutionDecoder ◄── values
//! ```
//!
//! # References
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Wolsey (1998), "Integer Programming", Ch. 7 (branch-and-bound)

mod builder;
mod decode;
mod program;
mod solver;

pub use builder::{AssignmentModel, ConstraintModelBuilder};
pub use decode::{DecodeOutcome, DecodeWarning, SolutionDecoder, DEFAULT_SELECTION_TOLERANCE};
pub use program::{
    AssignmentKey, ConstraintFamily, IntegerProgram, LinearConstraint, Sense, VarId,
};
pub use solver::{
    solve_two_stage, solve_two_stage_tracked, GoodLpSolver, MilpSolver, SolveOutcome, SolveStage,
    SolveStatus, StageTracker,
};
