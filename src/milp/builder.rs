//! Constraint model construction.
//!
//! Translates sections, rooms, instructors and the week template into an
//! [`IntegerProgram`]:
//!
//! - One binary variable per (section, feasible room, available slot)
//! - Objective: minimize `Σ slot_weight(slot) · x`, favouring early slots
//! - `Σ x[s,·,·] = 1` per section
//! - `Σ x[·,r,t] ≤ 1` per room and slot
//! - `Σ x[s,·,t] ≤ 1` over an instructor's sections, per slot
//! - `Σ x[s,·,t] ≤ 1` over a student's sections, per slot (toggle)
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §3

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};

use super::program::{AssignmentKey, ConstraintFamily, IntegerProgram, Sense, VarId};
use crate::error::{ConfigurationError, Result, SchedulingError};
use crate::models::{Instructor, InstructorId, Room, Section, StudentId, TimeSlot, WeekTemplate};

/// Builds the assignment model for one generation run.
///
/// # Example
/// ```
/// use u_timetable::milp::ConstraintModelBuilder;
/// use u_timetable::models::{Room, Section, WeekTemplate};
///
/// let sections = vec![Section::new("DB/lab/1", "lab", "prof").with_roster(["s1", "s2"])];
/// let rooms = vec![Room::new("L1", "lab", 20), Room::new("L2", "lab", 25)];
/// let week = WeekTemplate::new(2, 8, 13);
///
/// let model = ConstraintModelBuilder::new(&sections, &rooms, &week).build().unwrap();
/// assert_eq!(model.program.num_variables(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintModelBuilder<'a> {
    sections: &'a [Section],
    rooms: &'a [Room],
    instructors: &'a [Instructor],
    week: &'a WeekTemplate,
    student_conflicts: bool,
}

/// A built model plus the precomputed indices used to build it.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    /// The integer program.
    pub program: IntegerProgram,
    /// Feasible room indices per section.
    pub feasible_rooms: Vec<Vec<usize>>,
    /// Available slots per section.
    pub available_slots: Vec<Vec<TimeSlot>>,
}

impl AssignmentModel {
    /// Variable for a (section, room, slot) triple.
    pub fn var(&self, section: usize, room: usize, slot: TimeSlot) -> Option<VarId> {
        self.program.var(&AssignmentKey::new(section, room, slot))
    }
}

impl<'a> ConstraintModelBuilder<'a> {
    /// Creates a builder with student conflicts enabled and no instructor calendars.
    pub fn new(sections: &'a [Section], rooms: &'a [Room], week: &'a WeekTemplate) -> Self {
        Self {
            sections,
            rooms,
            instructors: &[],
            week,
            student_conflicts: true,
        }
    }

    /// Sets instructor availability records.
    ///
    /// Instructors without a record are available in every slot.
    pub fn with_instructors(mut self, instructors: &'a [Instructor]) -> Self {
        self.instructors = instructors;
        self
    }

    /// Enables or disables student-exclusivity constraints.
    pub fn with_student_conflicts(mut self, enabled: bool) -> Self {
        self.student_conflicts = enabled;
        self
    }

    /// Builds the model.
    ///
    /// # Errors
    /// - `EmptyTimeDomain` if the week has no slots
    /// - `NoFeasibleRoom` if a section fits no room of its type
    /// - `NoAvailableSlot` if a section's instructor is blocked everywhere
    /// - `ModelBuild` if a precomputed index is inconsistent
    pub fn build(&self) -> Result<AssignmentModel> {
        self.week.validate()?;
        let slots = self.week.slots();

        let feasible_rooms = self.feasible_rooms()?;
        let available_slots = self.available_slots(&slots)?;

        let mut program = IntegerProgram::new();

        // Variables
        let mut section_vars: Vec<Vec<VarId>> = Vec::with_capacity(self.sections.len());
        let mut room_slot_vars: BTreeMap<(usize, TimeSlot), Vec<VarId>> = BTreeMap::new();
        for (s, rooms) in feasible_rooms.iter().enumerate() {
            let mut vars = Vec::with_capacity(rooms.len() * available_slots[s].len());
            for &r in rooms {
                for &slot in &available_slots[s] {
                    let var = program.add_variable(
                        AssignmentKey::new(s, r, slot),
                        self.week.slot_weight(slot),
                    );
                    vars.push(var);
                    room_slot_vars.entry((r, slot)).or_default().push(var);
                }
            }
            section_vars.push(vars);
        }

        // Exactly-once
        for vars in section_vars {
            program.add_constraint(ConstraintFamily::ExactlyOnce, vars, Sense::Eq, 1.0);
        }

        // Room exclusivity; a single candidate is already bounded by its binary domain.
        for vars in room_slot_vars.into_values().filter(|v| v.len() > 1) {
            program.add_constraint(ConstraintFamily::RoomExclusive, vars, Sense::Le, 1.0);
        }

        // Instructor exclusivity
        for group in self.instructor_groups().into_values() {
            self.add_group_exclusivity(
                &mut program,
                &feasible_rooms,
                &available_slots,
                &slots,
                &group,
                ConstraintFamily::InstructorExclusive,
            )?;
        }

        // Student exclusivity; students sharing the same section set share one constraint set.
        if self.student_conflicts {
            let groups: BTreeSet<Vec<usize>> = self.student_groups().into_values().collect();
            for group in &groups {
                self.add_group_exclusivity(
                    &mut program,
                    &feasible_rooms,
                    &available_slots,
                    &slots,
                    group,
                    ConstraintFamily::StudentExclusive,
                )?;
            }
        }

        info!(
            sections = self.sections.len(),
            rooms = self.rooms.len(),
            slots = slots.len(),
            variables = program.num_variables(),
            constraints = program.num_constraints(),
            "model built"
        );
        debug!(
            exactly_once = program.count_family(ConstraintFamily::ExactlyOnce),
            room_exclusive = program.count_family(ConstraintFamily::RoomExclusive),
            instructor_exclusive = program.count_family(ConstraintFamily::InstructorExclusive),
            student_exclusive = program.count_family(ConstraintFamily::StudentExclusive),
            "constraints per family"
        );

        Ok(AssignmentModel {
            program,
            feasible_rooms,
            available_slots,
        })
    }

    /// Rooms of the section's type whose capacity covers its roster.
    fn feasible_rooms(&self) -> Result<Vec<Vec<usize>>> {
        self.sections
            .iter()
            .map(|section| {
                let rooms: Vec<usize> = self
                    .rooms
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.serves(&section.session_type) && r.fits(section.roster_size()))
                    .map(|(i, _)| i)
                    .collect();
                if rooms.is_empty() {
                    let largest_capacity = self
                        .rooms
                        .iter()
                        .filter(|r| r.serves(&section.session_type))
                        .map(|r| r.capacity)
                        .max()
                        .unwrap_or(0);
                    return Err(ConfigurationError::NoFeasibleRoom {
                        section_id: section.id.clone(),
                        roster_size: section.roster_size(),
                        largest_capacity,
                    }
                    .into());
                }
                Ok(rooms)
            })
            .collect()
    }

    /// Slots in which each section's instructor can teach.
    fn available_slots(&self, slots: &[TimeSlot]) -> Result<Vec<Vec<TimeSlot>>> {
        let calendars: HashMap<&InstructorId, &Instructor> =
            self.instructors.iter().map(|i| (&i.id, i)).collect();

        self.sections
            .iter()
            .map(|section| {
                let available: Vec<TimeSlot> = match calendars.get(&section.instructor) {
                    Some(instructor) => slots
                        .iter()
                        .copied()
                        .filter(|&slot| instructor.is_available(slot))
                        .collect(),
                    None => slots.to_vec(),
                };
                if available.is_empty() {
                    return Err(ConfigurationError::NoAvailableSlot {
                        section_id: section.id.clone(),
                    }
                    .into());
                }
                Ok(available)
            })
            .collect()
    }

    /// Instructor → their section indices (only instructors with 2+ sections).
    fn instructor_groups(&self) -> BTreeMap<&'a InstructorId, Vec<usize>> {
        let mut groups: BTreeMap<&'a InstructorId, Vec<usize>> = BTreeMap::new();
        for (s, section) in self.sections.iter().enumerate() {
            groups.entry(&section.instructor).or_default().push(s);
        }
        groups.retain(|_, g| g.len() > 1);
        groups
    }

    /// Student → their section indices (only students in 2+ sections).
    fn student_groups(&self) -> BTreeMap<&'a StudentId, Vec<usize>> {
        let mut groups: BTreeMap<&'a StudentId, Vec<usize>> = BTreeMap::new();
        for (s, section) in self.sections.iter().enumerate() {
            for student in &section.roster {
                let entry = groups.entry(student).or_default();
                if entry.last() != Some(&s) {
                    entry.push(s);
                }
            }
        }
        groups.retain(|_, g| g.len() > 1);
        groups
    }

    /// Adds `Σ x[s,·,t] ≤ 1` over a group of sections for every slot.
    fn add_group_exclusivity(
        &self,
        program: &mut IntegerProgram,
        feasible_rooms: &[Vec<usize>],
        available_slots: &[Vec<TimeSlot>],
        slots: &[TimeSlot],
        group: &[usize],
        family: ConstraintFamily,
    ) -> Result<()> {
        for &slot in slots {
            let mut terms = Vec::new();
            let mut sections_in_slot = 0;
            for &s in group {
                if !available_slots[s].contains(&slot) {
                    continue;
                }
                sections_in_slot += 1;
                for &r in &feasible_rooms[s] {
                    let key = AssignmentKey::new(s, r, slot);
                    let var = program.var(&key).ok_or_else(|| {
                        SchedulingError::ModelBuild(format!(
                            "no variable for section {s}, room {r}, slot {slot} ({family})"
                        ))
                    })?;
                    terms.push(var);
                }
            }
            if sections_in_slot > 1 {
                program.add_constraint(family, terms, Sense::Le, 1.0);
            }
        }
        Ok(())
    }
}
