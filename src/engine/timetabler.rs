//! Synchronous generation pipeline.
//!
//! # Algorithm
//!
//! 1. Keep course units applicable to the semester.
//! 2. Validate rooms, instructors and those course units.
//! 3. Partition enrollment into sections (fresh every run).
//! 4. Build the assignment model.
//! 5. Solve relaxation, then integer.
//! 6. Decode the integer solution into an unsaved schedule.
//!
//! Steps 1-4 run in [`Timetabler::prepare`]; 5 is the expensive part and
//! can be run elsewhere (see `TimetableEngine`); 6 runs in
//! [`Timetabler::finish`]. [`Timetabler::run`] does all of it in place.
//!
//! # Reference
//! Carter & Laporte (1998), "Recent Developments in Practical Course Timetabling"

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::milp::{
    solve_two_stage, AssignmentModel, ConstraintFamily, ConstraintModelBuilder, DecodeWarning,
    MilpSolver, SolutionDecoder, SolveOutcome,
};
use crate::models::{CourseUnit, GlobalSchedule, Instructor, Room, Section, Semester};
use crate::partition::SectionPartitioner;
use crate::validation::{to_configuration_error, validate_input};

/// Planning data for one run.
#[derive(Debug, Clone, Default)]
pub struct PlanningInput {
    /// Course units (all semesters; filtered per run).
    pub courses: Vec<CourseUnit>,
    /// Rooms.
    pub rooms: Vec<Room>,
    /// Instructor calendars.
    pub instructors: Vec<Instructor>,
}

impl PlanningInput {
    /// Creates an input from course units and rooms.
    pub fn new(courses: Vec<CourseUnit>, rooms: Vec<Room>) -> Self {
        Self {
            courses,
            rooms,
            instructors: Vec::new(),
        }
    }

    /// Sets instructor calendars.
    pub fn with_instructors(mut self, instructors: Vec<Instructor>) -> Self {
        self.instructors = instructors;
        self
    }
}

/// Sections and model ready for solving.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// Target semester.
    pub semester: Semester,
    /// Sections generated for this run.
    pub sections: Vec<Section>,
    /// The assignment model; `None` when there is nothing to schedule.
    pub model: Option<AssignmentModel>,
}

/// Model size figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    /// Decision variables.
    pub variables: usize,
    /// Constraints of all families.
    pub constraints: usize,
    /// Room-exclusivity constraints.
    pub room_constraints: usize,
    /// Instructor-exclusivity constraints.
    pub instructor_constraints: usize,
    /// Student-exclusivity constraints.
    pub student_constraints: usize,
}

impl ModelStats {
    fn of(model: &AssignmentModel) -> Self {
        let p = &model.program;
        Self {
            variables: p.num_variables(),
            constraints: p.num_constraints(),
            room_constraints: p.count_family(ConstraintFamily::RoomExclusive),
            instructor_constraints: p.count_family(ConstraintFamily::InstructorExclusive),
            student_constraints: p.count_family(ConstraintFamily::StudentExclusive),
        }
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Decoded schedule (version 0 until stored).
    pub schedule: GlobalSchedule,
    /// Sections the schedule was built for.
    pub sections: Vec<Section>,
    /// Decode warnings; non-empty means coverage may be incomplete.
    pub warnings: Vec<DecodeWarning>,
    /// Model size.
    pub stats: ModelStats,
    /// Relaxation objective, if a solve ran.
    pub relaxation_bound: Option<f64>,
}

impl GenerationReport {
    /// Section ids without an entry.
    pub fn missing_sections(&self) -> Vec<String> {
        self.schedule
            .missing_sections(self.sections.iter().map(|s| s.id.as_str()))
    }
}

/// Runs the generation pipeline for one semester.
#[derive(Debug, Clone, Default)]
pub struct Timetabler {
    config: EngineConfig,
    partitioner: SectionPartitioner,
}

impl Timetabler {
    /// Creates a timetabler with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            partitioner: SectionPartitioner::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates, partitions and builds the model.
    ///
    /// # Errors
    /// Any `Configuration` error; nothing reaches the solver on failure.
    pub fn prepare(&self, input: &PlanningInput, semester: Semester) -> Result<PreparedRun> {
        self.config.week.validate()?;

        let courses: Vec<CourseUnit> = input
            .courses
            .iter()
            .filter(|c| c.applies_to(semester))
            .cloned()
            .collect();

        if let Err(errors) = validate_input(&courses, &input.rooms, &input.instructors, &self.config.week) {
            for e in &errors {
                warn!(%semester, kind = ?e.kind, entity = %e.entity_id, "{}", e.message);
            }
            return Err(to_configuration_error(&errors, &courses).into());
        }

        let sections = self
            .partitioner
            .partition_semester(&courses, &input.rooms, semester)?;
        info!(%semester, courses = courses.len(), sections = sections.len(), "sections partitioned");

        if sections.is_empty() {
            return Ok(PreparedRun {
                semester,
                sections,
                model: None,
            });
        }

        let model = ConstraintModelBuilder::new(&sections, &input.rooms, &self.config.week)
            .with_instructors(&input.instructors)
            .with_student_conflicts(self.config.constraints.student_conflicts)
            .build()?;

        Ok(PreparedRun {
            semester,
            sections,
            model: Some(model),
        })
    }

    /// Decodes a solved run into a report.
    pub fn finish(
        &self,
        input: &PlanningInput,
        prepared: PreparedRun,
        outcome: Option<SolveOutcome>,
    ) -> GenerationReport {
        let PreparedRun {
            semester,
            sections,
            model,
        } = prepared;

        let (Some(model), Some(outcome)) = (model, outcome) else {
            return GenerationReport {
                schedule: GlobalSchedule::new(semester),
                sections,
                warnings: Vec::new(),
                stats: ModelStats::default(),
                relaxation_bound: None,
            };
        };

        let decoded = SolutionDecoder::new(&sections, &input.rooms)
            .with_instructors(&input.instructors)
            .with_tolerance(self.config.solver.selection_tolerance)
            .decode(&model.program, &outcome.values, semester);

        let report = GenerationReport {
            schedule: decoded.schedule,
            warnings: decoded.warnings,
            stats: ModelStats::of(&model),
            relaxation_bound: Some(outcome.relaxation_bound),
            sections,
        };

        let missing = report.missing_sections();
        if !missing.is_empty() {
            warn!(%semester, missing = missing.len(), "schedule does not cover every section");
        }
        info!(
            %semester,
            entries = report.schedule.len(),
            objective = report.schedule.objective,
            warnings = report.warnings.len(),
            "schedule decoded"
        );
        report
    }

    /// Runs every step on the current thread.
    ///
    /// # Errors
    /// `Configuration` from preparation, `Solver` from either solve stage.
    pub fn run(
        &self,
        input: &PlanningInput,
        semester: Semester,
        solver: &dyn MilpSolver,
    ) -> Result<GenerationReport> {
        let prepared = self.prepare(input, semester)?;
        let outcome = match &prepared.model {
            Some(model) => Some(solve_two_stage(solver, &model.program)?),
            None => None,
        };
        Ok(self.finish(input, prepared, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::verify::verify_schedule;
    use crate::error::{ConfigurationError, SchedulingError};
    use crate::milp::{GoodLpSolver, SolveStage, SolveStatus};
    use crate::models::{TimeSlot, WeekTemplate};

    fn timetabler(days: u32, start: u32, end: u32) -> Timetabler {
        Timetabler::new(EngineConfig::default().with_week(WeekTemplate::new(days, start, end)))
    }

    fn students(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_single_section_earliest_slot() {
        // one section, two adequate rooms, 2 days x 5 hours
        let input = PlanningInput::new(
            vec![CourseUnit::new("DB201", "Databases", "p1")
                .with_session_type("lab")
                .with_students(students("s", 15))],
            vec![Room::new("L1", "lab", 20), Room::new("L2", "lab", 25)],
        );
        let report = timetabler(2, 8, 13)
            .run(&input, Semester::First, &GoodLpSolver::new())
            .unwrap();

        assert_eq!(report.stats.variables, 20);
        assert_eq!(report.schedule.len(), 1);
        let entry = report.schedule.iter().next().unwrap();
        assert_eq!(entry.slot, TimeSlot::new(0, 8));
        assert_eq!(entry.roster.len(), 15);
        assert!((report.schedule.objective - 1.0).abs() < 1e-6);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_oversized_section_fails_before_solve() {
        #[derive(Debug)]
        struct Unreachable;
        impl MilpSolver for Unreachable {
            fn name(&self) -> &'static str {
                "unreachable"
            }
            fn solve(
                &self,
                _: &crate::milp::IntegerProgram,
                _: SolveStage,
            ) -> std::result::Result<Vec<f64>, SolveStatus> {
                panic!("solver must not be called");
            }
        }

        // roster 40 exceeds the only lab
        let section = Section::new("X/lab/1", "lab", "p").with_roster(students("s", 40));
        let rooms = vec![Room::new("L1", "lab", 30)];
        let week = WeekTemplate::new(1, 8, 9);
        let err = ConstraintModelBuilder::new(std::slice::from_ref(&section), &rooms, &week)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Configuration(ConfigurationError::NoFeasibleRoom { .. })
        ));

        // through the pipeline, a missing room kind is caught by validation
        let input = PlanningInput::new(
            vec![CourseUnit::new("X1", "X", "p")
                .with_session_type("studio")
                .with_students(students("s", 5))],
            vec![Room::new("L1", "lab", 30)],
        );
        let err = timetabler(1, 8, 9)
            .run(&input, Semester::First, &Unreachable)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_instructor_clash_infeasible() {
        // two courses, same instructor, one slot, two rooms
        let input = PlanningInput::new(
            vec![
                CourseUnit::new("A1", "A", "p")
                    .with_session_type("lecture")
                    .with_students(["a"]),
                CourseUnit::new("B1", "B", "p")
                    .with_session_type("lecture")
                    .with_students(["b"]),
            ],
            vec![Room::new("R1", "lecture", 10), Room::new("R2", "lecture", 10)],
        );
        let err = timetabler(1, 8, 9)
            .run(&input, Semester::First, &GoodLpSolver::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Solver {
                status: SolveStatus::Infeasible,
                ..
            }
        ));
    }

    #[test]
    fn test_full_run_satisfies_invariants() {
        let input = PlanningInput::new(
            vec![
                CourseUnit::new("DB1", "Databases", "p1")
                    .with_session_type("classroom")
                    .with_session_type("lab")
                    .with_students(students("s", 45)),
                CourseUnit::new("OS3", "Operating Systems", "p2")
                    .with_session_type("classroom")
                    .with_students(students("s", 20)),
                CourseUnit::new("NW1", "Networks", "p1")
                    .with_session_type("classroom")
                    .with_students(students("t", 10)),
                CourseUnit::new("AI2", "AI", "p3")
                    .with_session_type("classroom")
                    .with_students(students("u", 10)),
            ],
            vec![
                Room::new("C1", "classroom", 30),
                Room::new("C2", "classroom", 25),
                Room::new("L1", "lab", 20),
            ],
        )
        .with_instructors(vec![Instructor::new("p2").with_unavailable(TimeSlot::new(0, 8))]);

        let tt = timetabler(2, 8, 12);
        let report = tt.run(&input, Semester::First, &GoodLpSolver::new()).unwrap();

        // DB1: 2 classroom + 3 lab sections, OS3: 1, NW1: 1; AI2 is second semester
        assert_eq!(report.sections.len(), 7);
        assert!(report.missing_sections().is_empty());
        assert!(report.stats.student_constraints > 0);
        assert!(report.relaxation_bound.unwrap() <= report.schedule.objective + 1e-6);

        let violations = verify_schedule(&report.schedule, &report.sections, &input.rooms, true);
        assert!(violations.is_empty(), "{violations:?}");

        let os = report
            .schedule
            .iter()
            .find(|e| e.instructor.as_str() == "p2")
            .unwrap();
        assert_ne!(os.slot, TimeSlot::new(0, 8));
    }

    #[test]
    fn test_repeated_session_type_rejected_before_solve() {
        let input = PlanningInput::new(
            vec![CourseUnit::new("DB1", "Databases", "p")
                .with_session_type("lab")
                .with_session_type("lab")
                .with_students(["a", "b"])],
            vec![Room::new("L1", "lab", 10)],
        );
        let err = timetabler(1, 8, 10)
            .run(&input, Semester::First, &GoodLpSolver::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Configuration(ConfigurationError::Invalid(_))
        ));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_step_boundaries_logged_at_info() {
        let input = PlanningInput::new(
            vec![CourseUnit::new("DB1", "Databases", "p")
                .with_session_type("lab")
                .with_students(["a", "b"])],
            vec![Room::new("L1", "lab", 10)],
        );
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            timetabler(1, 8, 10).prepare(&input, Semester::First).unwrap();
        });

        let out = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("sections partitioned"), "{out}");
        assert!(out.contains("model built"), "{out}");
        // per-course and per-family detail stays at debug
        assert!(!out.contains("partitioned course"), "{out}");
        assert!(!out.contains("constraints per family"), "{out}");
    }

    #[test]
    fn test_empty_semester() {
        let input = PlanningInput::new(
            vec![CourseUnit::new("A2", "A", "p")
                .with_session_type("lecture")
                .with_students(["a"])],
            vec![Room::new("R1", "lecture", 10)],
        );
        let report = timetabler(5, 8, 18)
            .run(&input, Semester::First, &GoodLpSolver::new())
            .unwrap();
        assert!(report.schedule.is_empty());
        assert!(report.sections.is_empty());
        assert_eq!(report.relaxation_bound, None);
    }

    #[test]
    fn test_validation_errors_mapped() {
        let input = PlanningInput::new(
            vec![CourseUnit::new("A1", "A", "p")
                .with_session_type("lecture")
                .with_session_type("lab")
                .with_session_type("seminar")],
            vec![Room::new("R1", "lecture", 10)],
        );
        let err = timetabler(5, 8, 18)
            .prepare(&input, Semester::First)
            .unwrap_err();
        assert_eq!(
            err,
            SchedulingError::Configuration(ConfigurationError::UnsupportedSessionTypes {
                course_code: "A1".into(),
                count: 3
            })
        );
    }
}
