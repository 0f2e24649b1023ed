//! Timetabling domain models.
//!
//! Provides the input records supplied by the surrounding application
//! (rooms, course units, instructors) and the output records the engine
//! produces (sections, schedule entries, global schedules).
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | CourseUnit | Task |
//! | Section | Activity |
//! | Room / Instructor | Resource |
//! | TimeSlot | Time bucket |
//! | GlobalSchedule | Schedule |

mod course;
mod ids;
mod room;
mod schedule;
mod section;
mod week;

pub use course::{CourseUnit, Semester, SemesterTag};
pub use ids::{InstructorId, SessionType, StudentId};
pub use room::{max_capacity_for, Instructor, Room};
pub use schedule::{GlobalSchedule, ScheduleDelta, ScheduleEntry};
pub use section::Section;
pub use week::{TimeSlot, WeekTemplate};
