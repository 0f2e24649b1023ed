//! Global schedule (solution) model.
//!
//! A `GlobalSchedule` is one immutable version of a semester's timetable:
//! one `ScheduleEntry` per section, keyed by section id. New versions are
//! produced either by a full regeneration or by applying a `ScheduleDelta`
//! to the latest version; existing versions are never mutated in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{InstructorId, Semester, StudentId, TimeSlot};
use crate::error::{Result, SchedulingError};

/// One section placed in one room at one time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Scheduled section.
    pub section_id: String,
    /// Section display name.
    pub section_name: String,
    /// Assigned room.
    pub room_id: String,
    /// Room display name.
    pub room_name: String,
    /// Assigned (day, hour).
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Teaching instructor.
    pub instructor: InstructorId,
    /// Instructor display name.
    pub instructor_name: String,
    /// Attending students.
    pub roster: Vec<StudentId>,
}

impl ScheduleEntry {
    /// Creates an entry with display names equal to ids and an empty roster.
    pub fn new(
        section_id: impl Into<String>,
        room_id: impl Into<String>,
        slot: TimeSlot,
        instructor: impl Into<InstructorId>,
    ) -> Self {
        let section_id = section_id.into();
        let room_id = room_id.into();
        let instructor = instructor.into();
        Self {
            section_name: section_id.clone(),
            section_id,
            room_name: room_id.clone(),
            room_id,
            slot,
            instructor_name: instructor.0.clone(),
            instructor,
            roster: Vec::new(),
        }
    }

    /// Replaces the roster.
    pub fn with_roster<I, S>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StudentId>,
    {
        self.roster = students.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the display names.
    pub fn with_names(
        mut self,
        section_name: impl Into<String>,
        room_name: impl Into<String>,
        instructor_name: impl Into<String>,
    ) -> Self {
        self.section_name = section_name.into();
        self.room_name = room_name.into();
        self.instructor_name = instructor_name.into();
        self
    }
}

/// A single-entry edit applied on top of the latest schedule version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleDelta {
    /// Adds an entry for a section that has none.
    Add(ScheduleEntry),
    /// Replaces the entry for an existing section.
    Update(ScheduleEntry),
    /// Removes the entry for a section.
    Delete(String),
}

impl ScheduleDelta {
    /// Section the delta targets.
    pub fn section_id(&self) -> &str {
        match self {
            Self::Add(e) | Self::Update(e) => &e.section_id,
            Self::Delete(id) => id,
        }
    }
}

/// One version of a semester's timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSchedule {
    /// Planning semester.
    pub semester: Semester,
    /// Monotonic version number, assigned by the store (0 = unsaved).
    pub version: u64,
    /// Objective value of the solve that produced this schedule.
    pub objective: f64,
    /// Entries keyed by section id.
    pub entries: BTreeMap<String, ScheduleEntry>,
}

impl GlobalSchedule {
    /// Creates an empty, unsaved schedule.
    pub fn new(semester: Semester) -> Self {
        Self {
            semester,
            version: 0,
            objective: 0.0,
            entries: BTreeMap::new(),
        }
    }

    /// Sets the objective value.
    pub fn with_objective(mut self, objective: f64) -> Self {
        self.objective = objective;
        self
    }

    /// Inserts (or replaces) an entry; returns the previous one.
    pub fn insert(&mut self, entry: ScheduleEntry) -> Option<ScheduleEntry> {
        self.entries.insert(entry.section_id.clone(), entry)
    }

    /// Entry for a section.
    pub fn entry(&self, section_id: &str) -> Option<&ScheduleEntry> {
        self.entries.get(section_id)
    }

    /// Iterates entries in section-id order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in a given slot.
    pub fn entries_at(&self, slot: TimeSlot) -> Vec<&ScheduleEntry> {
        self.iter().filter(|e| e.slot == slot).collect()
    }

    /// Entries held in a given room.
    pub fn entries_for_room(&self, room_id: &str) -> Vec<&ScheduleEntry> {
        self.iter().filter(|e| e.room_id == room_id).collect()
    }

    /// Entries taught by a given instructor.
    pub fn entries_for_instructor(&self, instructor: &InstructorId) -> Vec<&ScheduleEntry> {
        self.iter().filter(|e| &e.instructor == instructor).collect()
    }

    /// Section ids from `expected` that have no entry.
    pub fn missing_sections<'a, I>(&self, expected: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        expected
            .into_iter()
            .filter(|id| !self.entries.contains_key(*id))
            .map(str::to_string)
            .collect()
    }

    /// Builds the next version by applying a delta.
    ///
    /// `Add` fails if the section already has an entry; `Update` and
    /// `Delete` fail with `NotFound` if it has none.
    pub fn apply(&self, delta: &ScheduleDelta) -> Result<GlobalSchedule> {
        let mut next = self.clone();
        match delta {
            ScheduleDelta::Add(entry) => {
                if next.entries.contains_key(&entry.section_id) {
                    return Err(SchedulingError::Internal(format!(
                        "section '{}' is already scheduled",
                        entry.section_id
                    )));
                }
                next.insert(entry.clone());
            }
            ScheduleDelta::Update(entry) => {
                if next.insert(entry.clone()).is_none() {
                    return Err(SchedulingError::NotFound(format!(
                        "section '{}'",
                        entry.section_id
                    )));
                }
            }
            ScheduleDelta::Delete(section_id) => {
                if next.entries.remove(section_id).is_none() {
                    return Err(SchedulingError::NotFound(format!("section '{section_id}'")));
                }
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> GlobalSchedule {
        let mut s = GlobalSchedule::new(Semester::First).with_objective(3.0);
        s.insert(ScheduleEntry::new("A/lec/1", "R1", TimeSlot::new(0, 8), "p1").with_roster(["s1"]));
        s.insert(ScheduleEntry::new("B/lec/1", "R2", TimeSlot::new(0, 8), "p2").with_roster(["s2"]));
        s.insert(ScheduleEntry::new("C/lab/1", "R1", TimeSlot::new(0, 9), "p1"));
        s
    }

    #[test]
    fn test_queries() {
        let s = sample_schedule();
        assert_eq!(s.len(), 3);
        assert_eq!(s.entries_at(TimeSlot::new(0, 8)).len(), 2);
        assert_eq!(s.entries_for_room("R1").len(), 2);
        assert_eq!(s.entries_for_instructor(&InstructorId::new("p1")).len(), 2);
        assert_eq!(s.entry("B/lec/1").map(|e| e.room_id.as_str()), Some("R2"));
        assert!(s.entry("Z").is_none());
    }

    #[test]
    fn test_missing_sections() {
        let s = sample_schedule();
        let missing = s.missing_sections(["A/lec/1", "D/lec/1"]);
        assert_eq!(missing, vec!["D/lec/1".to_string()]);
    }

    #[test]
    fn test_apply_add_update_delete() {
        let s = sample_schedule();

        let added = s
            .apply(&ScheduleDelta::Add(ScheduleEntry::new("D/lec/1", "R3", TimeSlot::new(1, 8), "p3")))
            .unwrap();
        assert_eq!(added.len(), 4);
        assert_eq!(s.len(), 3); // original untouched

        let moved = ScheduleEntry::new("A/lec/1", "R3", TimeSlot::new(2, 10), "p1");
        let updated = added.apply(&ScheduleDelta::Update(moved.clone())).unwrap();
        assert_eq!(updated.entry("A/lec/1"), Some(&moved));

        let deleted = updated.apply(&ScheduleDelta::Delete("C/lab/1".into())).unwrap();
        assert_eq!(deleted.len(), 3);
        assert!(deleted.entry("C/lab/1").is_none());
    }

    #[test]
    fn test_apply_errors() {
        let s = sample_schedule();
        let dup = ScheduleEntry::new("A/lec/1", "R9", TimeSlot::new(3, 8), "p1");
        assert!(matches!(
            s.apply(&ScheduleDelta::Add(dup)),
            Err(SchedulingError::Internal(_))
        ));

        let ghost = ScheduleEntry::new("ghost", "R9", TimeSlot::new(3, 8), "p1");
        assert!(matches!(
            s.apply(&ScheduleDelta::Update(ghost)),
            Err(SchedulingError::NotFound(_))
        ));
        assert!(matches!(
            s.apply(&ScheduleDelta::Delete("ghost".into())),
            Err(SchedulingError::NotFound(_))
        ));
    }

    #[test]
    fn test_serialization_flattens_slot() {
        let e = ScheduleEntry::new("A/lec/1", "R1", TimeSlot::new(1, 9), "p1");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["day"], 1);
        assert_eq!(json["hour"], 9);
        assert_eq!(json["instructor"], "p1");
    }
}
