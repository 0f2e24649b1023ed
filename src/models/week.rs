//! Week template and time-slot domain.
//!
//! The schedulable week is a grid of `days_per_week × (end_hour - start_hour)`
//! one-hour slots. Days are 0-indexed; hours are wall-clock hours in the
//! half-open range `[start_hour, end_hour)`.
//!
//! # Slot Weight
//! Each slot carries a weight `(hour - start_hour + 1) + day * hours_per_day`.
//! Weights are strictly increasing in (day, hour) order, so minimizing the
//! total weight favours early days and early hours.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;

/// A (day, hour) pair drawn from the week template.
///
/// Ordering is lexicographic: day first, then hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day index, `0..days_per_week`.
    pub day: u32,
    /// Wall-clock hour, `start_hour..end_hour`.
    pub hour: u32,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(day: u32, hour: u32) -> Self {
        Self { day, hour }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}@{:02}h", self.day, self.hour)
    }
}

/// Static description of the schedulable week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekTemplate {
    /// Number of teaching days.
    pub days_per_week: u32,
    /// First teaching hour (inclusive).
    pub start_hour: u32,
    /// Last teaching hour (exclusive).
    pub end_hour: u32,
}

impl Default for WeekTemplate {
    fn default() -> Self {
        Self {
            days_per_week: 5,
            start_hour: 8,
            end_hour: 18,
        }
    }
}

impl WeekTemplate {
    /// Creates a week template.
    pub fn new(days_per_week: u32, start_hour: u32, end_hour: u32) -> Self {
        Self {
            days_per_week,
            start_hour,
            end_hour,
        }
    }

    /// Teaching hours per day (0 if the range is inverted).
    #[inline]
    pub fn hours_per_day(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour)
    }

    /// Number of slots in the domain.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.days_per_week as usize * self.hours_per_day() as usize
    }

    /// Rejects templates whose slot domain is empty.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.days_per_week == 0 || self.start_hour >= self.end_hour {
            return Err(ConfigurationError::EmptyTimeDomain {
                days_per_week: self.days_per_week,
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        Ok(())
    }

    /// Whether a slot lies inside the domain.
    pub fn contains(&self, slot: TimeSlot) -> bool {
        slot.day < self.days_per_week && slot.hour >= self.start_hour && slot.hour < self.end_hour
    }

    /// All slots, ordered by (day, hour).
    pub fn slots(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::with_capacity(self.slot_count());
        for day in 0..self.days_per_week {
            for hour in self.start_hour..self.end_hour {
                slots.push(TimeSlot::new(day, hour));
            }
        }
        slots
    }

    /// Objective weight of a slot (see module docs).
    pub fn slot_weight(&self, slot: TimeSlot) -> f64 {
        let within_day = slot.hour.saturating_sub(self.start_hour) + 1;
        (within_day + slot.day * self.hours_per_day()) as f64
    }
}
