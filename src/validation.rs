//! Input validation for timetable generation.
//!
//! Checks structural integrity of course units, rooms and instructors
//! before partitioning. Detects:
//! - Duplicate room ids, course codes and instructor ids
//! - Rooms with zero capacity
//! - Course units with no session type, more than two, or one listed twice
//! - Session types no room serves
//! - Students enrolled twice in one course unit
//! - Instructor blocked slots outside the week
//!
//! Every finding is collected; validation never stops at the first.

use std::collections::HashSet;

use crate::error::ConfigurationError;
use crate::models::{max_capacity_for, CourseUnit, Instructor, Room, WeekTemplate};
use crate::partition::MAX_SESSION_TYPES;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending entity (room id, course code, session type, ...).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same id.
    DuplicateId,
    /// A room has no seats.
    ZeroCapacity,
    /// A course unit lists no session type.
    NoSessionType,
    /// A course unit lists more session types than supported.
    TooManySessionTypes,
    /// A course unit lists the same session type twice.
    DuplicateSessionType,
    /// No room serves a required session type.
    MissingRoomType,
    /// A student appears twice in one roster.
    DuplicateEnrollment,
    /// An instructor blocks a slot outside the week.
    SlotOutsideWeek,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Validates the planning input for one generation run.
///
/// Checks:
/// 1. No duplicate room ids, course codes or instructor ids
/// 2. Every room has positive capacity
/// 3. Every course unit requires 1..=2 distinct session types
/// 4. Every required session type is served by some room
/// 5. No student is enrolled twice in the same course unit
/// 6. Instructor blocked slots lie inside the week
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    courses: &[CourseUnit],
    rooms: &[Room],
    instructors: &[Instructor],
    week: &WeekTemplate,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &r.id,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        if r.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                &r.id,
                format!("Room '{}' has zero capacity", r.id),
            ));
        }
    }

    let mut instructor_ids = HashSet::new();
    for i in instructors {
        if !instructor_ids.insert(i.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                i.id.as_str(),
                format!("Duplicate instructor ID: {}", i.id),
            ));
        }
        for slot in &i.unavailable {
            if !week.contains(*slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SlotOutsideWeek,
                    i.id.as_str(),
                    format!("Instructor '{}' blocks slot {} outside the week", i.id, slot),
                ));
            }
        }
    }

    let mut course_codes = HashSet::new();
    let mut missing_types = HashSet::new();
    for c in courses {
        if !course_codes.insert(c.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &c.code,
                format!("Duplicate course code: {}", c.code),
            ));
        }

        if c.session_types.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoSessionType,
                &c.code,
                format!("Course '{}' requires no session type", c.code),
            ));
        } else if c.session_types.len() > MAX_SESSION_TYPES {
            errors.push(ValidationError::new(
                ValidationErrorKind::TooManySessionTypes,
                &c.code,
                format!(
                    "Course '{}' requires {} session types (max {})",
                    c.code,
                    c.session_types.len(),
                    MAX_SESSION_TYPES
                ),
            ));
        }

        let mut listed = HashSet::new();
        for t in &c.session_types {
            if !listed.insert(t) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateSessionType,
                    &c.code,
                    format!("Course '{}' lists session type '{t}' twice", c.code),
                ));
            }
        }

        for t in &c.session_types {
            if max_capacity_for(rooms, t).is_none() && missing_types.insert(t.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingRoomType,
                    t.as_str(),
                    format!("No room serves session type '{t}' (required by '{}')", c.code),
                ));
            }
        }

        let mut seen = HashSet::new();
        for s in &c.enrolled {
            if !seen.insert(s) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateEnrollment,
                    &c.code,
                    format!("Student '{s}' enrolled twice in '{}'", c.code),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Maps validation findings to the configuration error reported to callers.
///
/// Session-type policy violations take precedence, since they have
/// dedicated error variants; everything else is reported together.
pub fn to_configuration_error(errors: &[ValidationError], courses: &[CourseUnit]) -> ConfigurationError {
    if let Some(e) = errors
        .iter()
        .find(|e| e.kind == ValidationErrorKind::TooManySessionTypes)
    {
        let count = courses
            .iter()
            .find(|c| c.code == e.entity_id)
            .map(|c| c.session_types.len())
            .unwrap_or(0);
        return ConfigurationError::UnsupportedSessionTypes {
            course_code: e.entity_id.clone(),
            count,
        };
    }
    if let Some(e) = errors
        .iter()
        .find(|e| e.kind == ValidationErrorKind::MissingRoomType)
    {
        return ConfigurationError::NoRoomsForSessionType(e.entity_id.clone());
    }
    ConfigurationError::Invalid(errors.iter().map(|e| e.message.clone()).collect())
}
