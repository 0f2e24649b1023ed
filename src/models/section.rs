//! Section ("class") model.
//!
//! A section is the unit of scheduling: one course unit, one session type,
//! one slice of the roster. Each section receives exactly one room and one
//! time slot in a solved schedule.

use serde::{Deserialize, Serialize};

use super::{InstructorId, SemesterTag, SessionType, StudentId};

/// A schedulable instance of a course unit and session type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier (`<code>/<session type>/<index>`).
    pub id: String,
    /// Display name (`<course name> - <index>`).
    pub name: String,
    /// Parent course code.
    pub course_code: String,
    /// Session type; selects the room kind.
    pub session_type: SessionType,
    /// Instructor inherited from the course unit.
    pub instructor: InstructorId,
    /// Students attending this section.
    pub roster: Vec<StudentId>,
    /// Semester tag inherited from the course code.
    pub semester: Option<SemesterTag>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(
        id: impl Into<String>,
        session_type: impl Into<SessionType>,
        instructor: impl Into<InstructorId>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            course_code: String::new(),
            session_type: session_type.into(),
            instructor: instructor.into(),
            roster: Vec::new(),
            semester: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the parent course code.
    pub fn with_course(mut self, code: impl Into<String>) -> Self {
        self.course_code = code.into();
        self
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

    /// Sets the semester tag.
    pub fn with_semester(mut self, tag: SemesterTag) -> Self {
        self.semester = Some(tag);
        self
    }

    /// Number of students attending.
    #[inline]
    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    /// Whether a student attends this section.
    pub fn has_student(&self, student: &StudentId) -> bool {
        self.roster.contains(student)
    }
}
