//! Solution decoding.
//!
//! Reads solved variable values, keeps those within tolerance of 1, and
//! rebuilds one `ScheduleEntry` per selected (section, room, slot) key.
//! Variables that cannot be resolved are skipped and reported as
//! [`DecodeWarning`]s instead of failing the run.

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use super::program::{IntegerProgram, VarId};
use crate::models::{
    GlobalSchedule, Instructor, InstructorId, Room, ScheduleEntry, Section, Semester,
};

/// Default tolerance for treating a value as 1.
pub const DEFAULT_SELECTION_TOLERANCE: f64 = 1e-5;

/// A recoverable problem found while decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeWarning {
    /// The solver returned a different number of values than variables.
    ValueCountMismatch { expected: usize, actual: usize },
    /// A selected value has no variable in the arena.
    UnknownVariable(VarId),
    /// A selected variable points to a section not in memory.
    DanglingSection { var: VarId, section: usize },
    /// A selected variable points to a room not in memory.
    DanglingRoom { var: VarId, room: usize },
    /// A section was selected more than once; the earliest slot is kept.
    DuplicateSelection { section_id: String },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueCountMismatch { expected, actual } => {
                write!(f, "expected {expected} solved values, got {actual}")
            }
            Self::UnknownVariable(var) => write!(f, "selected variable {} is not in the model", var.0),
            Self::DanglingSection { var, section } => {
                write!(f, "variable {} refers to missing section #{section}", var.0)
            }
            Self::DanglingRoom { var, room } => {
                write!(f, "variable {} refers to missing room #{room}", var.0)
            }
            Self::DuplicateSelection { section_id } => {
                write!(f, "section '{section_id}' selected more than once")
            }
        }
    }
}

/// Decoded schedule plus any warnings raised on the way.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    /// The decoded (unsaved) schedule.
    pub schedule: GlobalSchedule,
    /// Skipped variables.
    pub warnings: Vec<DecodeWarning>,
}

/// Rebuilds schedule entries from a solved program.
#[derive(Debug, Clone)]
pub struct SolutionDecoder<'a> {
    sections: &'a [Section],
    rooms: &'a [Room],
    instructor_names: HashMap<&'a InstructorId, &'a str>,
    tolerance: f64,
}

impl<'a> SolutionDecoder<'a> {
    /// Creates a decoder over the slices the model was built from.
    pub fn new(sections: &'a [Section], rooms: &'a [Room]) -> Self {
        Self {
            sections,
            rooms,
            instructor_names: HashMap::new(),
            tolerance: DEFAULT_SELECTION_TOLERANCE,
        }
    }

    /// Supplies instructor display names.
    pub fn with_instructors(mut self, instructors: &'a [Instructor]) -> Self {
        self.instructor_names = instructors.iter().map(|i| (&i.id, i.name.as_str())).collect();
        self
    }

    /// Sets the selection tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Whether a solved value counts as selected.
    #[inline]
    pub fn is_selected(&self, value: f64) -> bool {
        (value - 1.0).abs() <= self.tolerance
    }

    /// Decodes `values` (arena order) into a schedule.
    pub fn decode(&self, program: &IntegerProgram, values: &[f64], semester: Semester) -> DecodeOutcome {
        let mut warnings = Vec::new();
        if values.len() != program.num_variables() {
            warnings.push(DecodeWarning::ValueCountMismatch {
                expected: program.num_variables(),
                actual: values.len(),
            });
        }

        let mut schedule = GlobalSchedule::new(semester);
        let mut costs: HashMap<&str, f64> = HashMap::new();

        for (i, &value) in values.iter().enumerate() {
            if !self.is_selected(value) {
                continue;
            }
            let var = VarId(i);
            let Some(key) = program.key(var) else {
                warnings.push(DecodeWarning::UnknownVariable(var));
                continue;
            };
            let Some(section) = self.sections.get(key.section) else {
                warnings.push(DecodeWarning::DanglingSection {
                    var,
                    section: key.section,
                });
                continue;
            };
            let Some(room) = self.rooms.get(key.room) else {
                warnings.push(DecodeWarning::DanglingRoom { var, room: key.room });
                continue;
            };

            if let Some(existing) = schedule.entry(&section.id) {
                warnings.push(DecodeWarning::DuplicateSelection {
                    section_id: section.id.clone(),
                });
                if existing.slot <= key.slot {
                    continue;
                }
            }

            let instructor_name = self
                .instructor_names
                .get(&section.instructor)
                .map(|n| n.to_string())
                .unwrap_or_else(|| section.instructor.to_string());

            let entry = ScheduleEntry::new(&section.id, &room.id, key.slot, section.instructor.clone())
                .with_names(&section.name, &room.name, instructor_name)
                .with_roster(section.roster.iter().cloned());
            schedule.insert(entry);
            costs.insert(&section.id, program.costs()[i]);
        }
        let objective: f64 = costs.values().sum();

        for w in &warnings {
            warn!(%semester, warning = %w, "decode warning");
        }

        DecodeOutcome {
            schedule: schedule.with_objective(objective),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::program::{AssignmentKey, ConstraintFamily, Sense};
    use crate::models::TimeSlot;

    fn fixture() -> (Vec<Section>, Vec<Room>, IntegerProgram) {
        let sections = vec![
            Section::new("A/lec/1", "lecture", "p").with_name("A - 1").with_roster(["s1", "s2"]),
            Section::new("B/lec/1", "lecture", "q").with_name("B - 1").with_roster(["s3"]),
        ];
        let rooms = vec![Room::new("R1", "lecture", 10).with_name("Room One")];
        let mut p = IntegerProgram::new();
        let a = p.add_variable(AssignmentKey::new(0, 0, TimeSlot::new(0, 8)), 1.0);
        let b = p.add_variable(AssignmentKey::new(1, 0, TimeSlot::new(0, 9)), 2.0);
        p.add_constraint(ConstraintFamily::ExactlyOnce, vec![a], Sense::Eq, 1.0);
        p.add_constraint(ConstraintFamily::ExactlyOnce, vec![b], Sense::Eq, 1.0);
        (sections, rooms, p)
    }

    #[test]
    fn test_decode_entries() {
        let (sections, rooms, p) = fixture();
        let instructors = vec![Instructor::new("p").with_name("Dr. P")];
        let out = SolutionDecoder::new(&sections, &rooms)
            .with_instructors(&instructors)
            .decode(&p, &[0.999_999_5, 1.0], Semester::First);

        assert!(out.warnings.is_empty());
        assert_eq!(out.schedule.len(), 2);
        let a = out.schedule.entry("A/lec/1").unwrap();
        assert_eq!(a.room_id, "R1");
        assert_eq!(a.room_name, "Room One");
        assert_eq!(a.section_name, "A - 1");
        assert_eq!(a.instructor_name, "Dr. P");
        assert_eq!(a.slot, TimeSlot::new(0, 8));
        assert_eq!(a.roster.len(), 2);
        let b = out.schedule.entry("B/lec/1").unwrap();
        assert_eq!(b.instructor_name, "q");
        assert!((out.schedule.objective - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_tolerance() {
        let (sections, rooms, p) = fixture();
        let out = SolutionDecoder::new(&sections, &rooms).decode(&p, &[0.9999, 0.5], Semester::First);
        assert!(out.schedule.is_empty());

        let loose = SolutionDecoder::new(&sections, &rooms)
            .with_tolerance(1e-3)
            .decode(&p, &[0.9999, 0.5], Semester::First);
        assert_eq!(loose.schedule.len(), 1);
    }

    #[test]
    fn test_dangling_section_skipped() {
        let (sections, rooms, p) = fixture();
        // decoder only knows the first section
        let out = SolutionDecoder::new(&sections[..1], &rooms).decode(&p, &[1.0, 1.0], Semester::First);
        assert_eq!(out.schedule.len(), 1);
        assert_eq!(
            out.warnings,
            vec![DecodeWarning::DanglingSection { var: VarId(1), section: 1 }]
        );
    }

    #[test]
    fn test_unknown_variable_and_count_mismatch() {
        let (sections, rooms, p) = fixture();
        let out = SolutionDecoder::new(&sections, &rooms).decode(&p, &[1.0, 1.0, 1.0], Semester::Second);
        assert_eq!(out.schedule.len(), 2);
        assert!(out.warnings.contains(&DecodeWarning::ValueCountMismatch { expected: 2, actual: 3 }));
        assert!(out.warnings.contains(&DecodeWarning::UnknownVariable(VarId(2))));
    }

    #[test]
    fn test_duplicate_selection_keeps_earliest() {
        let sections = vec![Section::new("A", "lecture", "p")];
        let rooms = vec![Room::new("R1", "lecture", 10)];
        let mut p = IntegerProgram::new();
        p.add_variable(AssignmentKey::new(0, 0, TimeSlot::new(1, 8)), 5.0);
        p.add_variable(AssignmentKey::new(0, 0, TimeSlot::new(0, 8)), 1.0);

        let out = SolutionDecoder::new(&sections, &rooms).decode(&p, &[1.0, 1.0], Semester::First);
        assert_eq!(out.schedule.entry("A").map(|e| e.slot), Some(TimeSlot::new(0, 8)));
        assert_eq!(out.warnings.len(), 1);
    }
}
