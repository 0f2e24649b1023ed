//! Read access to rooms, course units and instructors.

use std::fmt::Debug;

use crate::models::{CourseUnit, Instructor, Room};

/// Source of planning data for the engine.
///
/// The surrounding application implements this over its own storage;
/// the engine only reads.
pub trait Catalog: Send + Sync + Debug {
    /// All rooms.
    fn rooms(&self) -> Vec<Room>;

    /// All course units with their enrollment.
    fn course_units(&self) -> Vec<CourseUnit>;

    /// All instructors. Instructors not listed are always available.
    fn instructors(&self) -> Vec<Instructor>;
}

/// Catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    rooms: Vec<Room>,
    courses: Vec<CourseUnit>,
    instructors: Vec<Instructor>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a course unit.
    pub fn with_course(mut self, course: CourseUnit) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds an instructor.
    pub fn with_instructor(mut self, instructor: Instructor) -> Self {
        self.instructors.push(instructor);
        self
    }
}

impl Catalog for InMemoryCatalog {
    fn rooms(&self) -> Vec<Room> {
        self.rooms.clone()
    }

    fn course_units(&self) -> Vec<CourseUnit> {
        self.courses.clone()
    }

    fn instructors(&self) -> Vec<Instructor> {
        self.instructors.clone()
    }
}
