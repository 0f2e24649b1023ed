//! MILP solver boundary.
//!
//! The engine does not implement LP or branch-and-bound itself; it hands an
//! [`IntegerProgram`] to a [`MilpSolver`] twice:
//!
//! 1. **Relaxation**: variables continuous in `[0, 1]`. Detects infeasible
//!    or unbounded models cheaply and yields a lower bound.
//! 2. **Integer**: variables binary. Yields the assignment.
//!
//! Both stages must succeed before the solution is trusted. Failures are
//! surfaced as `SchedulingError::Solver` and never retried.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::{debug, info};

use super::program::{IntegerProgram, Sense};
use crate::error::{Result, SchedulingError};

/// Solve stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStage {
    /// Continuous relaxation.
    Relaxation,
    /// Binary (branch-and-bound) solve.
    Integer,
}

impl fmt::Display for SolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relaxation => f.write_str("relaxation"),
            Self::Integer => f.write_str("integer"),
        }
    }
}

/// Non-success status reported by a solve stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective is unbounded.
    Unbounded,
    /// The stage exceeded its time budget.
    TimedOut,
    /// Any other solver failure.
    Failed(String),
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infeasible => f.write_str("infeasible"),
            Self::Unbounded => f.write_str("unbounded"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(msg) => write!(f, "failed ({msg})"),
        }
    }
}

impl From<ResolutionError> for SolveStatus {
    fn from(e: ResolutionError) -> Self {
        match e {
            ResolutionError::Infeasible => Self::Infeasible,
            ResolutionError::Unbounded => Self::Unbounded,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// A MILP solver capable of relaxation and integer solves.
///
/// Implementations return one value per variable, in arena order.
pub trait MilpSolver: Send + Sync + fmt::Debug {
    /// Solver name for logs.
    fn name(&self) -> &'static str;

    /// Solves one stage of the program.
    fn solve(
        &self,
        program: &IntegerProgram,
        stage: SolveStage,
    ) -> std::result::Result<Vec<f64>, SolveStatus>;
}

/// [`MilpSolver`] backed by `good_lp`'s default (pure-Rust) solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for GoodLpSolver {
    fn name(&self) -> &'static str {
        "good_lp"
    }

    fn solve(
        &self,
        program: &IntegerProgram,
        stage: SolveStage,
    ) -> std::result::Result<Vec<f64>, SolveStatus> {
        if program.num_variables() == 0 {
            return if program.constraints().iter().all(|c| c.rhs >= 0.0 && c.sense == Sense::Le) {
                Ok(Vec::new())
            } else {
                Err(SolveStatus::Infeasible)
            };
        }

        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = program
            .keys()
            .iter()
            .map(|_| match stage {
                SolveStage::Relaxation => problem.add(variable().min(0.0).max(1.0)),
                SolveStage::Integer => problem.add(variable().binary()),
            })
            .collect();

        let objective: Expression = program
            .costs()
            .iter()
            .zip(&vars)
            .map(|(&cost, &var)| var * cost)
            .sum();

        let mut model = problem.minimise(objective).using(default_solver);
        for c in program.constraints() {
            let lhs: Expression = c.terms.iter().map(|v| vars[v.0]).sum();
            let rhs = c.rhs;
            match c.sense {
                Sense::Eq => model.add_constraint(constraint!(lhs == rhs)),
                Sense::Le => model.add_constraint(constraint!(lhs <= rhs)),
            };
        }

        let solution = model.solve().map_err(SolveStatus::from)?;
        Ok(vars.iter().map(|&v| solution.value(v)).collect())
    }
}

/// Result of a successful two-stage solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Objective of the relaxation (a lower bound).
    pub relaxation_bound: f64,
    /// Objective of the integer solution.
    pub objective: f64,
    /// Integer-stage values, in arena order.
    pub values: Vec<f64>,
}

/// Shared view of the stage a running solve is in.
///
/// Clones observe the same solve, so a caller can tell which stage was
/// running when it stopped waiting.
#[derive(Debug, Clone, Default)]
pub struct StageTracker {
    integer: Arc<AtomicBool>,
}

impl StageTracker {
    /// Creates a tracker in the relaxation stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage currently running (or last run).
    pub fn current(&self) -> SolveStage {
        if self.integer.load(Ordering::Acquire) {
            SolveStage::Integer
        } else {
            SolveStage::Relaxation
        }
    }

    fn enter(&self, stage: SolveStage) {
        self.integer
            .store(stage == SolveStage::Integer, Ordering::Release);
    }
}

/// Runs the relaxation and integer stages in order.
///
/// # Errors
/// `SchedulingError::Solver` naming the first stage that failed.
pub fn solve_two_stage(solver: &dyn MilpSolver, program: &IntegerProgram) -> Result<SolveOutcome> {
    solve_two_stage_tracked(solver, program, &StageTracker::new())
}

/// [`solve_two_stage`], reporting stage transitions to `tracker`.
pub fn solve_two_stage_tracked(
    solver: &dyn MilpSolver,
    program: &IntegerProgram,
    tracker: &StageTracker,
) -> Result<SolveOutcome> {
    let started = Instant::now();
    tracker.enter(SolveStage::Relaxation);

    let relaxed = solver
        .solve(program, SolveStage::Relaxation)
        .map_err(|status| SchedulingError::solver(SolveStage::Relaxation, status))?;
    let relaxation_bound = program.objective_value(&relaxed);
    debug!(
        solver = solver.name(),
        stage = %SolveStage::Relaxation,
        bound = relaxation_bound,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "stage solved"
    );

    tracker.enter(SolveStage::Integer);
    let values = solver
        .solve(program, SolveStage::Integer)
        .map_err(|status| SchedulingError::solver(SolveStage::Integer, status))?;
    if values.len() != program.num_variables() {
        return Err(SchedulingError::solver(
            SolveStage::Integer,
            SolveStatus::Failed(format!(
                "expected {} values, got {}",
                program.num_variables(),
                values.len()
            )),
        ));
    }
    let objective = program.objective_value(&values);

    info!(
        solver = solver.name(),
        variables = program.num_variables(),
        constraints = program.num_constraints(),
        relaxation_bound,
        objective,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "two-stage solve finished"
    );

    Ok(SolveOutcome {
        relaxation_bound,
        objective,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::program::{AssignmentKey, ConstraintFamily, VarId};
    use crate::models::TimeSlot;

    fn two_choice_program() -> IntegerProgram {
        let mut p = IntegerProgram::new();
        let a = p.add_variable(AssignmentKey::new(0, 0, TimeSlot::new(0, 8)), 1.0);
        let b = p.add_variable(AssignmentKey::new(0, 0, TimeSlot::new(0, 9)), 2.0);
        p.add_constraint(ConstraintFamily::ExactlyOnce, vec![a, b], Sense::Eq, 1.0);
        p
    }

    #[test]
    fn test_good_lp_picks_cheapest() {
        let p = two_choice_program();
        let outcome = solve_two_stage(&GoodLpSolver::new(), &p).unwrap();
        assert!((outcome.values[0] - 1.0).abs() < 1e-5);
        assert!(outcome.values[1].abs() < 1e-5);
        assert!((outcome.objective - 1.0).abs() < 1e-5);
        assert!(outcome.relaxation_bound <= outcome.objective + 1e-6);
    }

    #[test]
    fn test_good_lp_infeasible() {
        let mut p = two_choice_program();
        // both variables capped by a clashing ≤ 0 rule
        p.add_constraint(
            ConstraintFamily::RoomExclusive,
            vec![VarId(0), VarId(1)],
            Sense::Le,
            0.0,
        );
        let err = solve_two_stage(&GoodLpSolver::new(), &p).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::solver(SolveStage::Relaxation, SolveStatus::Infeasible)
        );
    }

    #[derive(Debug)]
    struct FailingAt(SolveStage);

    impl MilpSolver for FailingAt {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn solve(
            &self,
            program: &IntegerProgram,
            stage: SolveStage,
        ) -> std::result::Result<Vec<f64>, SolveStatus> {
            if stage == self.0 {
                Err(SolveStatus::Failed("boom".into()))
            } else {
                Ok(vec![0.5; program.num_variables()])
            }
        }
    }

    #[test]
    fn test_stage_reported() {
        let p = two_choice_program();
        let err = solve_two_stage(&FailingAt(SolveStage::Integer), &p).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Solver { stage: SolveStage::Integer, .. }
        ));
        let err = solve_two_stage(&FailingAt(SolveStage::Relaxation), &p).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Solver { stage: SolveStage::Relaxation, .. }
        ));
    }

    #[test]
    fn test_tracker_follows_stages() {
        let tracker = StageTracker::new();
        assert_eq!(tracker.current(), SolveStage::Relaxation);

        let observer = tracker.clone();
        let p = two_choice_program();
        solve_two_stage_tracked(&GoodLpSolver::new(), &p, &tracker).unwrap();
        assert_eq!(observer.current(), SolveStage::Integer);

        // a relaxation failure never reaches the integer stage
        let fresh = StageTracker::new();
        let _ = solve_two_stage_tracked(&FailingAt(SolveStage::Relaxation), &p, &fresh);
        assert_eq!(fresh.current(), SolveStage::Relaxation);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolveStatus::Infeasible.to_string(), "infeasible");
        assert_eq!(SolveStatus::Failed("x".into()).to_string(), "failed (x)");
        assert_eq!(SolveStage::Relaxation.to_string(), "relaxation");
    }
}
