//! Section partitioning.
//!
//! Splits a course unit's roster into sections small enough for the rooms
//! suited to each session type.
//!
//! # Algorithm
//!
//! For `N` enrolled students and largest suitable room capacity `C`:
//!
//! 1. `sections = ceil(N / C)`
//! 2. `per_section = ceil(N / sections)`
//! 3. Slice the roster into contiguous chunks of `per_section`; the last
//!    chunk may be smaller.
//!
//! Since `per_section <= C`, the chunk count always equals `sections` and no
//! chunk exceeds the capacity.

use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::models::{max_capacity_for, CourseUnit, Room, Section, Semester, SessionType};

/// Maximum number of session types a course unit may require.
pub const MAX_SESSION_TYPES: usize = 2;

/// Splits course enrollment into capacity-bounded sections.
#[derive(Debug, Clone, Default)]
pub struct SectionPartitioner;

impl SectionPartitioner {
    /// Creates a partitioner.
    pub fn new() -> Self {
        Self
    }

    /// Splits one course unit for one session type.
    ///
    /// # Errors
    /// `NoRoomsForSessionType` if `max_capacity` is `None` or zero.
    /// An empty roster yields no sections.
    pub fn split(
        &self,
        course: &CourseUnit,
        session_type: &SessionType,
        max_capacity: Option<u32>,
    ) -> Result<Vec<Section>> {
        let capacity = match max_capacity {
            Some(c) if c > 0 => c as usize,
            _ => {
                return Err(ConfigurationError::NoRoomsForSessionType(session_type.to_string()).into())
            }
        };

        let enrolled = course.enrolled_count();
        if enrolled == 0 {
            return Ok(Vec::new());
        }

        let section_count = enrolled.div_ceil(capacity);
        let per_section = enrolled.div_ceil(section_count);
        let semester = course.semester_tag();

        let sections: Vec<Section> = course
            .enrolled
            .chunks(per_section)
            .enumerate()
            .map(|(i, chunk)| {
                let index = i + 1;
                let mut section = Section::new(
                    format!("{}/{}/{}", course.code, session_type, index),
                    session_type.clone(),
                    course.instructor.clone(),
                )
                .with_name(format!("{} - {}", course.name, index))
                .with_course(&course.code)
                .with_roster(chunk.iter().cloned());
                section.semester = semester;
                section
            })
            .collect();

        debug!(
            course = %course.code,
            session_type = %session_type,
            enrolled,
            capacity,
            sections = sections.len(),
            per_section,
            "partitioned course"
        );
        Ok(sections)
    }

    /// Splits a course unit for every session type it requires.
    ///
    /// # Errors
    /// `UnsupportedSessionTypes` for more than [`MAX_SESSION_TYPES`] types;
    /// `Invalid` if a type is listed twice (section ids would collide);
    /// `NoRoomsForSessionType` if a required type has no room.
    pub fn partition_course(&self, course: &CourseUnit, rooms: &[Room]) -> Result<Vec<Section>> {
        if course.session_types.len() > MAX_SESSION_TYPES {
            return Err(ConfigurationError::UnsupportedSessionTypes {
                course_code: course.code.clone(),
                count: course.session_types.len(),
            }
            .into());
        }
        if let Some((_, t)) = course
            .session_types
            .iter()
            .enumerate()
            .find(|&(i, t)| course.session_types[..i].contains(t))
        {
            return Err(ConfigurationError::Invalid(vec![format!(
                "Course '{}' lists session type '{t}' twice",
                course.code
            )])
            .into());
        }

        let mut sections = Vec::new();
        for session_type in &course.session_types {
            let max_capacity = max_capacity_for(rooms, session_type);
            sections.extend(self.split(course, session_type, max_capacity)?);
        }
        Ok(sections)
    }

    /// Partitions every course unit applicable to a semester.
    ///
    /// Courses whose code carries no semester digit are skipped.
    pub fn partition_semester(
        &self,
        courses: &[CourseUnit],
        rooms: &[Room],
        semester: Semester,
    ) -> Result<Vec<Section>> {
        let mut sections = Vec::new();
        for course in courses {
            if !course.applies_to(semester) {
                debug!(course = %course.code, %semester, "course not taught this semester");
                continue;
            }
            sections.extend(self.partition_course(course, rooms)?);
        }
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulingError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn course_with(n: usize) -> CourseUnit {
        CourseUnit::new("DB201", "Databases", "prof")
            .with_session_type("classroom")
            .with_students((0..n).map(|i| format!("s{i}")))
    }

    #[test]
    fn test_databases_45_over_30() {
        let course = course_with(45);
        let sections = SectionPartitioner::new()
            .split(&course, &"classroom".into(), Some(30))
            .unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].roster_size(), 23);
        assert_eq!(sections[1].roster_size(), 22);
        assert_eq!(sections[0].name, "Databases - 1");
        assert_eq!(sections[1].name, "Databases - 2");
        assert_eq!(sections[0].id, "DB201/classroom/1");
        assert_eq!(sections[1].instructor.as_str(), "prof");
        assert_eq!(sections[1].semester, Some(crate::models::SemesterTag::First));
    }

    #[test]
    fn test_rosters_contiguous_and_disjoint() {
        let course = course_with(7);
        let sections = SectionPartitioner::new()
            .split(&course, &"classroom".into(), Some(3))
            .unwrap();

        let flattened: Vec<_> = sections.iter().flat_map(|s| s.roster.clone()).collect();
        assert_eq!(flattened, course.enrolled);
        let sizes: Vec<_> = sections.iter().map(|s| s.roster_size()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_empty_enrollment() {
        let course = course_with(0);
        let sections = SectionPartitioner::new()
            .split(&course, &"classroom".into(), Some(30))
            .unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_missing_capacity_is_configuration_error() {
        let course = course_with(10);
        let p = SectionPartitioner::new();
        for cap in [None, Some(0)] {
            let err = p.split(&course, &"classroom".into(), cap).unwrap_err();
            assert!(matches!(
                err,
                SchedulingError::Configuration(ConfigurationError::NoRoomsForSessionType(_))
            ));
        }
    }

    #[test]
    fn test_partition_course_two_types() {
        let course = course_with(50).with_session_type("lab");
        let rooms = vec![
            Room::new("R1", "classroom", 60),
            Room::new("L1", "lab", 20),
        ];
        let sections = SectionPartitioner::new().partition_course(&course, &rooms).unwrap();

        let lectures = sections.iter().filter(|s| s.session_type.as_str() == "classroom").count();
        let labs = sections.iter().filter(|s| s.session_type.as_str() == "lab").count();
        assert_eq!(lectures, 1);
        assert_eq!(labs, 3);
        assert!(sections.iter().filter(|s| s.session_type.as_str() == "lab").all(|s| s.roster_size() <= 20));
    }

    #[test]
    fn test_repeated_session_type_rejected() {
        let course = CourseUnit::new("DB1", "Databases", "p")
            .with_session_type("lab")
            .with_session_type("lab")
            .with_students(["a", "b"]);
        let rooms = vec![Room::new("L1", "lab", 10)];
        let err = SectionPartitioner::new()
            .partition_course(&course, &rooms)
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Configuration(ConfigurationError::Invalid(_))
        ));
    }

    #[test]
    fn test_too_many_session_types() {
        let course = course_with(5).with_session_type("lab").with_session_type("seminar");
        let err = SectionPartitioner::new().partition_course(&course, &[]).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Configuration(ConfigurationError::UnsupportedSessionTypes { count: 3, .. })
        ));
    }

    #[test]
    fn test_partition_semester_filters_by_code() {
        let rooms = vec![Room::new("R1", "classroom", 40)];
        let courses = vec![
            CourseUnit::new("A101", "A", "p").with_session_type("classroom").with_students(["s1"]),
            CourseUnit::new("B102", "B", "p").with_session_type("classroom").with_students(["s1"]),
            CourseUnit::new("C103", "C", "p").with_session_type("classroom").with_students(["s1"]),
            CourseUnit::new("D10X", "D", "p").with_session_type("classroom").with_students(["s1"]),
        ];
        let p = SectionPartitioner::new();
        let first = p.partition_semester(&courses, &rooms, Semester::First).unwrap();
        let codes: Vec<_> = first.iter().map(|s| s.course_code.as_str()).collect();
        assert_eq!(codes, vec!["A101", "C103"]);

        let second = p.partition_semester(&courses, &rooms, Semester::Second).unwrap();
        let codes: Vec<_> = second.iter().map(|s| s.course_code.as_str()).collect();
        assert_eq!(codes, vec!["B102", "C103"]);
    }

    #[test]
    fn test_partition_properties_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = SectionPartitioner::new();
        for _ in 0..200 {
            let n = rng.random_range(1..500usize);
            let cap = rng.random_range(1..80u32);
            let sections = p.split(&course_with(n), &"classroom".into(), Some(cap)).unwrap();

            let expected = n.div_ceil(cap as usize);
            assert_eq!(sections.len(), expected, "n={n} cap={cap}");
            let total: usize = sections.iter().map(|s| s.roster_size()).sum();
            assert_eq!(total, n);
            let bound = n.div_ceil(expected);
            assert!(sections.iter().all(|s| s.roster_size() <= bound));
            assert!(sections.iter().all(|s| s.roster_size() <= cap as usize));
        }
    }
}
