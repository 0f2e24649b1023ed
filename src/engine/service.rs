//! Asynchronous timetable engine.
//!
//! Wraps the synchronous [`Timetabler`] with:
//! - one generation per semester at a time (rejects concurrent requests)
//! - the solve on a blocking worker, raced against a timeout and a
//!   cancellation token
//! - versioned storage of the result
//! - point edits applied as deltas under the same per-semester lock
//!
//! A timed-out or cancelled solve cannot be interrupted inside the solver;
//! its worker finishes in the background and the result is discarded.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::catalog::Catalog;
use super::conflicts::{check_conflicts, ConflictReport};
use super::kpi::ScheduleKpi;
use super::locks::SemesterLocks;
use super::store::ScheduleStore;
use super::timetabler::{PlanningInput, Timetabler};
use super::verify::verify_schedule;
use crate::config::EngineConfig;
use crate::error::{Result, SchedulingError};
use crate::milp::{solve_two_stage_tracked, GoodLpSolver, MilpSolver, SolveStatus, StageTracker};
use crate::models::{GlobalSchedule, ScheduleDelta, ScheduleEntry, Semester};

/// Result of a point edit.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// The new schedule version.
    pub schedule: Arc<GlobalSchedule>,
    /// Conflicts the edit introduced (edits are applied regardless).
    pub conflicts: ConflictReport,
}

/// Handle to a generation running in the background.
#[derive(Debug)]
pub struct GenerationHandle {
    semester: Semester,
    cancel: CancellationToken,
    join: JoinHandle<Result<Arc<GlobalSchedule>>>,
}

impl GenerationHandle {
    /// Semester being generated.
    pub fn semester(&self) -> Semester {
        self.semester
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the background task has finished.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the generation result.
    pub async fn wait(self) -> Result<Arc<GlobalSchedule>> {
        self.join
            .await
            .map_err(|e| SchedulingError::Internal(format!("generation task failed: {e}")))?
    }
}

/// Orchestrates generation and edits for both semesters.
#[derive(Debug)]
pub struct TimetableEngine {
    timetabler: Timetabler,
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn ScheduleStore>,
    solver: Arc<dyn MilpSolver>,
    locks: SemesterLocks,
    timeout: Duration,
}

impl TimetableEngine {
    /// Creates an engine using the `good_lp` solver.
    pub fn new(config: EngineConfig, catalog: Arc<dyn Catalog>, store: Arc<dyn ScheduleStore>) -> Self {
        let timeout = config.solver.timeout();
        Self {
            timetabler: Timetabler::new(config),
            catalog,
            store,
            solver: Arc::new(GoodLpSolver::new()),
            locks: SemesterLocks::new(),
            timeout,
        }
    }

    /// Replaces the solver.
    pub fn with_solver(mut self, solver: Arc<dyn MilpSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Overrides the configured solve timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        self.timetabler.config()
    }

    /// Latest stored schedule for a semester.
    pub fn latest(&self, semester: Semester) -> Result<Option<Arc<GlobalSchedule>>> {
        self.store.latest(semester)
    }

    /// KPIs of the latest stored schedule.
    pub fn kpi(&self, semester: Semester) -> Result<Option<ScheduleKpi>> {
        let rooms = self.catalog.rooms();
        Ok(self
            .store
            .latest(semester)?
            .map(|s| ScheduleKpi::calculate(&s, &rooms, &self.config().week)))
    }

    /// Generates and stores a new schedule version for `semester`.
    ///
    /// # Errors
    /// - `SemesterBusy` if a generation or edit holds the semester
    /// - `Configuration` for bad input (nothing is solved)
    /// - `Solver` if a stage fails or the timeout elapses
    pub async fn generate(&self, semester: Semester) -> Result<Arc<GlobalSchedule>> {
        self.generate_with_cancel(semester, CancellationToken::new())
            .await
    }

    /// Like [`TimetableEngine::generate`], stopping early when `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        semester: Semester,
        cancel: CancellationToken,
    ) -> Result<Arc<GlobalSchedule>> {
        let result = self.run_generation(semester, cancel).await;
        match &result {
            Ok(schedule) => info!(
                %semester,
                version = schedule.version,
                entries = schedule.len(),
                objective = schedule.objective,
                "generation finished"
            ),
            Err(SchedulingError::SemesterBusy(_)) => {
                warn!(%semester, "generation rejected: semester busy")
            }
            Err(e) => error!(%semester, error = %e, "generation failed"),
        }
        result
    }

    async fn run_generation(
        &self,
        semester: Semester,
        cancel: CancellationToken,
    ) -> Result<Arc<GlobalSchedule>> {
        let _claim = self.locks.try_claim(semester)?;
        info!(%semester, "generation started");

        let input = PlanningInput {
            courses: self.catalog.course_units(),
            rooms: self.catalog.rooms(),
            instructors: self.catalog.instructors(),
        };
        let prepared = self.timetabler.prepare(&input, semester)?;

        let solver = Arc::clone(&self.solver);
        let tracker = StageTracker::new();
        let worker_tracker = tracker.clone();
        let task = tokio::task::spawn_blocking(move || {
            let outcome = match &prepared.model {
                Some(model) => Some(solve_two_stage_tracked(
                    solver.as_ref(),
                    &model.program,
                    &worker_tracker,
                )?),
                None => None,
            };
            Ok::<_, SchedulingError>((prepared, outcome))
        });

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SchedulingError::Cancelled(semester)),
            joined = tokio::time::timeout(self.timeout, task) => joined,
        };
        let (prepared, outcome) = match joined {
            Err(_) => {
                return Err(SchedulingError::solver(tracker.current(), SolveStatus::TimedOut))
            }
            Ok(Err(e)) => {
                return Err(SchedulingError::Internal(format!("solver worker failed: {e}")))
            }
            Ok(Ok(solved)) => solved?,
        };

        let report = self.timetabler.finish(&input, prepared, outcome);
        let violations = verify_schedule(
            &report.schedule,
            &report.sections,
            &input.rooms,
            self.config().constraints.student_conflicts,
        );
        for v in &violations {
            warn!(%semester, kind = ?v.violation_type, "{}", v.message);
        }

        self.store.replace(report.schedule)
    }

    /// Starts a generation in the background.
    pub fn spawn_generation(self: &Arc<Self>, semester: Semester) -> GenerationHandle {
        let cancel = CancellationToken::new();
        let engine = Arc::clone(self);
        let token = cancel.clone();
        let join = tokio::spawn(async move { engine.generate_with_cancel(semester, token).await });
        GenerationHandle {
            semester,
            cancel,
            join,
        }
    }

    /// Conflicts a candidate entry would have with the latest schedule.
    pub fn check_entry(&self, semester: Semester, candidate: &ScheduleEntry) -> Result<ConflictReport> {
        Ok(match self.store.latest(semester)? {
            Some(schedule) => check_conflicts(candidate, schedule.iter()),
            None => ConflictReport::default(),
        })
    }

    /// Adds an entry for an unscheduled section.
    pub async fn add_entry(&self, semester: Semester, entry: ScheduleEntry) -> Result<EditOutcome> {
        self.edit(semester, ScheduleDelta::Add(entry)).await
    }

    /// Replaces the entry of a scheduled section.
    pub async fn update_entry(&self, semester: Semester, entry: ScheduleEntry) -> Result<EditOutcome> {
        self.edit(semester, ScheduleDelta::Update(entry)).await
    }

    /// Removes the entry of a scheduled section.
    pub async fn delete_entry(&self, semester: Semester, section_id: &str) -> Result<EditOutcome> {
        self.edit(semester, ScheduleDelta::Delete(section_id.to_string()))
            .await
    }

    async fn edit(&self, semester: Semester, delta: ScheduleDelta) -> Result<EditOutcome> {
        let _claim = self.locks.claim(semester).await;

        let conflicts = match &delta {
            ScheduleDelta::Add(entry) | ScheduleDelta::Update(entry) => {
                self.check_entry(semester, entry)?
            }
            ScheduleDelta::Delete(_) => ConflictReport::default(),
        };
        if !conflicts.is_clear() {
            warn!(
                %semester,
                section = delta.section_id(),
                rooms = conflicts.room_conflicts.len(),
                instructors = conflicts.instructor_conflicts.len(),
                students = conflicts.student_conflicts.len(),
                "manual edit introduces conflicts"
            );
        }

        let schedule = self.store.apply(semester, &delta)?;
        Ok(EditOutcome {
            schedule,
            conflicts,
        })
    }
}
