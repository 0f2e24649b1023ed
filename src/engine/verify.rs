//! Post-generation schedule verification.
//!
//! Re-checks a [`GlobalSchedule`] against the sections and rooms it was
//! built from. A schedule straight from the solver should verify clean;
//! a schedule with manual overrides may not.
//!
//! # Checks
//!
//! | Check | Violation |
//! |-------|-----------|
//! | Section ids are unique | `DuplicateSection` |
//! | Every section has an entry | `MissingSection` |
//! | Every entry names a known section | `UnknownSection` |
//! | Every entry names a known room | `UnknownRoom` |
//! | Roster fits room capacity | `CapacityExceeded` |
//! | One section per room per slot | `RoomClash` |
//! | One section per instructor per slot | `InstructorClash` |
//! | One section per student per slot | `StudentClash` |

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{GlobalSchedule, Room, ScheduleEntry, Section, TimeSlot};

/// Kinds of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationType {
    /// Two input sections share an id, so only one can hold an entry.
    DuplicateSection,
    /// A section has no entry.
    MissingSection,
    /// An entry refers to a section not in the input.
    UnknownSection,
    /// An entry refers to a room not in the input.
    UnknownRoom,
    /// A roster exceeds the assigned room's capacity.
    CapacityExceeded,
    /// Two entries share a room and slot.
    RoomClash,
    /// Two entries share an instructor and slot.
    InstructorClash,
    /// Two entries share a student and slot.
    StudentClash,
}

/// A single violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Violation category.
    pub violation_type: ViolationType,
    /// Related ids (sections, rooms, students).
    pub related_ids: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    fn new(violation_type: ViolationType, related_ids: Vec<String>, message: String) -> Self {
        Self {
            violation_type,
            related_ids,
            message,
        }
    }
}

/// Verifies a schedule; returns every violation found.
///
/// Student clashes are reported only when `check_students` is set, matching
/// the constraint toggle the schedule was generated with.
pub fn verify_schedule(
    schedule: &GlobalSchedule,
    sections: &[Section],
    rooms: &[Room],
    check_students: bool,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let room_by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut known: HashMap<&str, &Section> = HashMap::with_capacity(sections.len());
    for section in sections {
        if known.insert(section.id.as_str(), section).is_some() {
            violations.push(Violation::new(
                ViolationType::DuplicateSection,
                vec![section.id.clone()],
                format!("Section id {} is used by more than one section", section.id),
            ));
        }
    }

    for missing in schedule.missing_sections(sections.iter().map(|s| s.id.as_str())) {
        violations.push(Violation::new(
            ViolationType::MissingSection,
            vec![missing.clone()],
            format!("Section {missing} is not scheduled"),
        ));
    }

    for entry in schedule.iter() {
        if !known.contains_key(entry.section_id.as_str()) {
            violations.push(Violation::new(
                ViolationType::UnknownSection,
                vec![entry.section_id.clone()],
                format!("Entry for unknown section {}", entry.section_id),
            ));
        }
        match room_by_id.get(entry.room_id.as_str()) {
            None => violations.push(Violation::new(
                ViolationType::UnknownRoom,
                vec![entry.section_id.clone(), entry.room_id.clone()],
                format!("Section {} is in unknown room {}", entry.section_id, entry.room_id),
            )),
            Some(room) if !room.fits(entry.roster.len()) => violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                vec![entry.section_id.clone(), entry.room_id.clone()],
                format!(
                    "Section {} has {} students but room {} seats {}",
                    entry.section_id,
                    entry.roster.len(),
                    room.id,
                    room.capacity
                ),
            )),
            Some(_) => {}
        }
    }

    // Group by slot, then compare pairs within each slot.
    let mut by_slot: BTreeMap<TimeSlot, Vec<&ScheduleEntry>> = BTreeMap::new();
    for entry in schedule.iter() {
        by_slot.entry(entry.slot).or_default().push(entry);
    }

    for (slot, entries) in &by_slot {
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                let pair = vec![a.section_id.clone(), b.section_id.clone()];
                if a.room_id == b.room_id {
                    violations.push(Violation::new(
                        ViolationType::RoomClash,
                        pair.clone(),
                        format!(
                            "Room {} hosts {} and {} at {slot}",
                            a.room_id, a.section_id, b.section_id
                        ),
                    ));
                }
                if a.instructor == b.instructor {
                    violations.push(Violation::new(
                        ViolationType::InstructorClash,
                        pair.clone(),
                        format!(
                            "Instructor {} teaches {} and {} at {slot}",
                            a.instructor, a.section_id, b.section_id
                        ),
                    ));
                }
                if check_students {
                    for student in a.roster.iter().filter(|s| b.roster.contains(s)) {
                        let mut ids = pair.clone();
                        ids.push(student.to_string());
                        violations.push(Violation::new(
                            ViolationType::StudentClash,
                            ids,
                            format!(
                                "Student {student} attends {} and {} at {slot}",
                                a.section_id, b.section_id
                            ),
                        ));
                    }
                }
            }
        }
    }

    violations
}
