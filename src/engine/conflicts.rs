//! Ad hoc conflict checking for a single proposed entry.
//!
//! Pure equality checks against existing entries; independent of the
//! optimization model. Used by manual overrides before an edit is applied.

use serde::Serialize;

use crate::models::{ScheduleEntry, StudentId};

/// Existing entries that clash with a candidate entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConflictReport {
    /// Entries occupying the same room in the same slot.
    pub room_conflicts: Vec<ScheduleEntry>,
    /// Entries taught by the same instructor in the same slot.
    pub instructor_conflicts: Vec<ScheduleEntry>,
    /// Entries sharing a student in the same slot, with the shared students.
    pub student_conflicts: Vec<StudentConflict>,
}

/// A student clash with one existing entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentConflict {
    /// The clashing entry.
    pub entry: ScheduleEntry,
    /// Students attending both.
    pub students: Vec<StudentId>,
}

impl ConflictReport {
    /// Whether no conflict was found.
    pub fn is_clear(&self) -> bool {
        self.room_conflicts.is_empty()
            && self.instructor_conflicts.is_empty()
            && self.student_conflicts.is_empty()
    }

    /// Total number of conflicting pairs.
    pub fn len(&self) -> usize {
        self.room_conflicts.len() + self.instructor_conflicts.len() + self.student_conflicts.len()
    }

    /// Whether the report is empty. Same as [`ConflictReport::is_clear`].
    pub fn is_empty(&self) -> bool {
        self.is_clear()
    }
}

/// Compares `candidate` with every entry of `existing` in the same slot.
///
/// An existing entry for the candidate's own section is ignored, so an
/// update can be checked against the schedule it replaces.
pub fn check_conflicts<'a, I>(candidate: &ScheduleEntry, existing: I) -> ConflictReport
where
    I: IntoIterator<Item = &'a ScheduleEntry>,
{
    let mut report = ConflictReport::default();

    for other in existing {
        if other.section_id == candidate.section_id || other.slot != candidate.slot {
            continue;
        }
        if other.room_id == candidate.room_id {
            report.room_conflicts.push(other.clone());
        }
        if other.instructor == candidate.instructor {
            report.instructor_conflicts.push(other.clone());
        }
        let shared: Vec<StudentId> = candidate
            .roster
            .iter()
            .filter(|s| other.roster.contains(s))
            .cloned()
            .collect();
        if !shared.is_empty() {
            report.student_conflicts.push(StudentConflict {
                entry: other.clone(),
                students: shared,
            });
        }
    }

    report
}
