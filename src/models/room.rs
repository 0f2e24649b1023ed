//! Room and instructor models.
//!
//! Rooms are the spatial resource of the timetable: each has a kind that
//! matches one session type and a seat capacity. Instructors are the human
//! resource: identity plus the slots in which they cannot teach.

use serde::{Deserialize, Serialize};

use super::{InstructorId, SessionType, TimeSlot};

/// A teaching room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Session type this room is built for.
    pub kind: SessionType,
    /// Seat capacity.
    pub capacity: u32,
}

impl Room {
    /// Creates a room. The name defaults to the id.
    pub fn new(id: impl Into<String>, kind: impl Into<SessionType>, capacity: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: kind.into(),
            capacity,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the room is built for the given session type.
    #[inline]
    pub fn serves(&self, session_type: &SessionType) -> bool {
        &self.kind == session_type
    }

    /// Whether a roster of the given size fits.
    #[inline]
    pub fn fits(&self, roster_size: usize) -> bool {
        roster_size <= self.capacity as usize
    }
}

/// Largest capacity among rooms serving a session type.
///
/// Returns `None` when no room serves the type or all such rooms are empty.
pub fn max_capacity_for(rooms: &[Room], session_type: &SessionType) -> Option<u32> {
    rooms
        .iter()
        .filter(|r| r.serves(session_type))
        .map(|r| r.capacity)
        .max()
        .filter(|&c| c > 0)
}

/// An instructor and their blocked slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    /// Instructor identity.
    pub id: InstructorId,
    /// Human-readable name.
    pub name: String,
    /// Slots in which the instructor cannot teach.
    #[serde(default)]
    pub unavailable: Vec<TimeSlot>,
}

impl Instructor {
    /// Creates an instructor available in every slot.
    pub fn new(id: impl Into<InstructorId>) -> Self {
        let id = id.into();
        Self {
            name: id.0.clone(),
            id,
            unavailable: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Blocks a slot.
    pub fn with_unavailable(mut self, slot: TimeSlot) -> Self {
        self.unavailable.push(slot);
        self
    }

    /// Whether the instructor can teach in the slot.
    pub fn is_available(&self, slot: TimeSlot) -> bool {
        !self.unavailable.contains(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("R1", "classroom", 30).with_name("Main Hall");
        assert_eq!(r.id, "R1");
        assert_eq!(r.name, "Main Hall");
        assert!(r.serves(&SessionType::new("classroom")));
        assert!(!r.serves(&SessionType::new("lab")));
        assert!(r.fits(30));
        assert!(!r.fits(31));
    }

    #[test]
    fn test_max_capacity_for() {
        let rooms = vec![
            Room::new("R1", "classroom", 30),
            Room::new("R2", "classroom", 45),
            Room::new("L1", "lab", 20),
            Room::new("X1", "studio", 0),
        ];
        assert_eq!(max_capacity_for(&rooms, &"classroom".into()), Some(45));
        assert_eq!(max_capacity_for(&rooms, &"lab".into()), Some(20));
        assert_eq!(max_capacity_for(&rooms, &"seminar".into()), None);
        assert_eq!(max_capacity_for(&rooms, &"studio".into()), None);
    }

    #[test]
    fn test_instructor_availability() {
        let i = Instructor::new("prof")
            .with_name("Prof. X")
            .with_unavailable(TimeSlot::new(0, 8));
        assert!(!i.is_available(TimeSlot::new(0, 8)));
        assert!(i.is_available(TimeSlot::new(0, 9)));
        assert_eq!(i.name, "Prof. X");
    }
}
