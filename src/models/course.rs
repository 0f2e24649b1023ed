//! Course unit and semester models.
//!
//! A course unit is a taught unit of study: it has an enrolled roster,
//! one or two required session types and a single instructor. The trailing
//! digit of its code selects the semester(s) in which it is taught.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InstructorId, SessionType, StudentId};

/// Planning semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    /// First semester.
    First,
    /// Second semester.
    Second,
}

impl Semester {
    /// Semester number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(format!("semester must be 1 or 2, got {other}")),
        }
    }
}

impl From<Semester> for u8 {
    fn from(s: Semester) -> u8 {
        s.number()
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "semester {}", self.number())
    }
}

/// Semester applicability encoded in a course code.
///
/// | Trailing digit | Tag |
/// |----------------|-----|
/// | `1` | `First` |
/// | `2` | `Second` |
/// | `3` | `Both` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemesterTag {
    /// Taught in the first semester only.
    First,
    /// Taught in the second semester only.
    Second,
    /// Taught in both semesters.
    Both,
}

impl SemesterTag {
    /// Parses the tag from a course code's trailing character.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().chars().last()? {
            '1' => Some(Self::First),
            '2' => Some(Self::Second),
            '3' => Some(Self::Both),
            _ => None,
        }
    }

    /// Whether this tag covers the given semester.
    pub fn includes(self, semester: Semester) -> bool {
        matches!(
            (self, semester),
            (Self::Both, _) | (Self::First, Semester::First) | (Self::Second, Semester::Second)
        )
    }
}

/// A taught unit of study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseUnit {
    /// Course code; its trailing digit encodes the semester.
    pub code: String,
    /// Display name, used to name generated sections.
    pub name: String,
    /// Required session types, in declaration order.
    pub session_types: Vec<SessionType>,
    /// Teaching instructor.
    pub instructor: InstructorId,
    /// Enrolled students, in enrollment order.
    pub enrolled: Vec<StudentId>,
}

impl CourseUnit {
    /// Creates a course unit with no session types and no enrollment.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        instructor: impl Into<InstructorId>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            session_types: Vec::new(),
            instructor: instructor.into(),
            enrolled: Vec::new(),
        }
    }

    /// Adds a required session type.
    pub fn with_session_type(mut self, session_type: impl Into<SessionType>) -> Self {
        self.session_types.push(session_type.into());
        self
    }

    /// Adds an enrolled student.
    pub fn with_student(mut self, student: impl Into<StudentId>) -> Self {
        self.enrolled.push(student.into());
        self
    }

    /// Replaces the roster.
    pub fn with_students<I, S>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StudentId>,
    {
        self.enrolled = students.into_iter().map(Into::into).collect();
        self
    }

    /// Total enrolled size.
    #[inline]
    pub fn enrolled_count(&self) -> usize {
        self.enrolled.len()
    }

    /// Semester tag derived from the code, if the code carries one.
    pub fn semester_tag(&self) -> Option<SemesterTag> {
        SemesterTag::from_code(&self.code)
    }

    /// Whether this course is taught in the given semester.
    pub fn applies_to(&self, semester: Semester) -> bool {
        self.semester_tag().is_some_and(|t| t.includes(semester))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_builder() {
        let c = CourseUnit::new("DB201", "Databases", "prof-a")
            .with_session_type("classroom")
            .with_session_type("lab")
            .with_students(["s1", "s2", "s3"]);

        assert_eq!(c.code, "DB201");
        assert_eq!(c.session_types.len(), 2);
        assert_eq!(c.enrolled_count(), 3);
        assert_eq!(c.instructor, InstructorId::new("prof-a"));
    }

    #[test]
    fn test_semester_tag_from_code() {
        assert_eq!(SemesterTag::from_code("CS101"), Some(SemesterTag::First));
        assert_eq!(SemesterTag::from_code("CS102"), Some(SemesterTag::Second));
        assert_eq!(SemesterTag::from_code("CS103 "), Some(SemesterTag::Both));
        assert_eq!(SemesterTag::from_code("CS104"), None);
        assert_eq!(SemesterTag::from_code("CSX"), None);
        assert_eq!(SemesterTag::from_code(""), None);
    }

    #[test]
    fn test_applies_to() {
        let first = CourseUnit::new("A1", "A", "i");
        let both = CourseUnit::new("B3", "B", "i");
        let none = CourseUnit::new("C9", "C", "i");

        assert!(first.applies_to(Semester::First));
        assert!(!first.applies_to(Semester::Second));
        assert!(both.applies_to(Semester::First));
        assert!(both.applies_to(Semester::Second));
        assert!(!none.applies_to(Semester::First));
    }

    #[test]
    fn test_semester_conversion() {
        assert_eq!(Semester::try_from(1), Ok(Semester::First));
        assert_eq!(Semester::try_from(2), Ok(Semester::Second));
        assert!(Semester::try_from(3).is_err());
        assert_eq!(u8::from(Semester::Second), 2);
        assert_eq!(serde_json::to_string(&Semester::First).unwrap(), "1");
    }
}
