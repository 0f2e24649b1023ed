//! Timetable quality metrics (KPIs).
//!
//! Computes indicators from a generated schedule, its rooms and the
//! week template.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Objective | Sum of slot weights of chosen assignments |
//! | Days used | Distinct days with at least one entry |
//! | Latest slot | Latest (day, hour) used |
//! | Room occupancy | Entries in room / slots in week |
//! | Seat fill | Mean of roster / room capacity |
//!
//! # Reference
//! McCollum et al. (2010), "Setting the Research Agenda in Automated
//! Timetabling: The Second International Timetabling Competition"

use std::collections::{BTreeSet, HashMap};

use crate::models::{GlobalSchedule, Room, TimeSlot, WeekTemplate};

/// Schedule performance indicators.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Objective value of the schedule.
    pub objective: f64,
    /// Number of scheduled entries.
    pub entries: usize,
    /// Distinct days in use.
    pub days_used: usize,
    /// Latest slot in use, if any.
    pub latest_slot: Option<TimeSlot>,
    /// Per-room occupancy ratio (0.0..1.0) over the week.
    pub occupancy_by_room: HashMap<String, f64>,
    /// Mean occupancy over all rooms.
    pub avg_occupancy: f64,
    /// Mean roster / capacity over entries with a known room.
    pub avg_seat_fill: f64,
}

impl ScheduleKpi {
    /// Computes KPIs.
    ///
    /// Rooms with no entries count as zero occupancy. Entries in unknown
    /// rooms are left out of the seat fill.
    pub fn calculate(schedule: &GlobalSchedule, rooms: &[Room], week: &WeekTemplate) -> Self {
        let slot_count = week.slot_count();
        let mut per_room: HashMap<&str, usize> = rooms.iter().map(|r| (r.id.as_str(), 0)).collect();
        let capacity: HashMap<&str, u32> = rooms.iter().map(|r| (r.id.as_str(), r.capacity)).collect();

        let mut days = BTreeSet::new();
        let mut latest: Option<TimeSlot> = None;
        let mut fill_sum = 0.0;
        let mut fill_count = 0usize;

        for entry in schedule.iter() {
            days.insert(entry.slot.day);
            latest = latest.max(Some(entry.slot));
            *per_room.entry(entry.room_id.as_str()).or_insert(0) += 1;

            if let Some(&cap) = capacity.get(entry.room_id.as_str()) {
                if cap > 0 {
                    fill_sum += entry.roster.len() as f64 / cap as f64;
                    fill_count += 1;
                }
            }
        }

        let occupancy_by_room: HashMap<String, f64> = per_room
            .into_iter()
            .map(|(room, n)| {
                let ratio = if slot_count == 0 {
                    0.0
                } else {
                    n as f64 / slot_count as f64
                };
                (room.to_string(), ratio)
            })
            .collect();

        let avg_occupancy = if occupancy_by_room.is_empty() {
            0.0
        } else {
            occupancy_by_room.values().sum::<f64>() / occupancy_by_room.len() as f64
        };

        let avg_seat_fill = if fill_count == 0 {
            0.0
        } else {
            fill_sum / fill_count as f64
        };

        Self {
            objective: schedule.objective,
            entries: schedule.len(),
            days_used: days.len(),
            latest_slot: latest,
            occupancy_by_room,
            avg_occupancy,
            avg_seat_fill,
        }
    }

    /// Whether the schedule stays within `max_days` and reaches `min_seat_fill`.
    pub fn meets_thresholds(&self, max_days: usize, min_seat_fill: f64) -> bool {
        self.days_used <= max_days && self.avg_seat_fill >= min_seat_fill
    }
}
