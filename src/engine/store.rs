//! Versioned schedule storage.
//!
//! Every write produces a new immutable [`GlobalSchedule`] version; readers
//! hold `Arc`s to the version they fetched and never observe a partial write.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{Result, SchedulingError};
use crate::models::{GlobalSchedule, ScheduleDelta, Semester};

/// Persistence boundary for generated schedules.
pub trait ScheduleStore: Send + Sync + Debug {
    /// Latest version for a semester.
    fn latest(&self, semester: Semester) -> Result<Option<Arc<GlobalSchedule>>>;

    /// A specific version (1-based).
    fn version(&self, semester: Semester, version: u64) -> Result<Option<Arc<GlobalSchedule>>>;

    /// Stores `schedule` as the next version, replacing the semester wholesale.
    fn replace(&self, schedule: GlobalSchedule) -> Result<Arc<GlobalSchedule>>;

    /// Applies a delta on top of the latest version and stores the result.
    fn apply(&self, semester: Semester, delta: &ScheduleDelta) -> Result<Arc<GlobalSchedule>>;
}

/// [`ScheduleStore`] keeping every version in memory.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    versions: RwLock<HashMap<Semester, Vec<Arc<GlobalSchedule>>>>,
}

fn poisoned<T>(_: T) -> SchedulingError {
    SchedulingError::Internal("schedule store lock poisoned".into())
}

impl InMemoryScheduleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored versions for a semester.
    pub fn version_count(&self, semester: Semester) -> Result<usize> {
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(versions.get(&semester).map_or(0, Vec::len))
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn latest(&self, semester: Semester) -> Result<Option<Arc<GlobalSchedule>>> {
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(versions.get(&semester).and_then(|v| v.last().cloned()))
    }

    fn version(&self, semester: Semester, version: u64) -> Result<Option<Arc<GlobalSchedule>>> {
        if version == 0 {
            return Ok(None);
        }
        let versions = self.versions.read().map_err(poisoned)?;
        Ok(versions
            .get(&semester)
            .and_then(|v| v.get(version as usize - 1).cloned()))
    }

    fn replace(&self, mut schedule: GlobalSchedule) -> Result<Arc<GlobalSchedule>> {
        let mut versions = self.versions.write().map_err(poisoned)?;
        let history = versions.entry(schedule.semester).or_default();
        schedule.version = history.len() as u64 + 1;
        let stored = Arc::new(schedule);
        history.push(Arc::clone(&stored));
        debug!(
            semester = %stored.semester,
            version = stored.version,
            entries = stored.len(),
            "schedule version stored"
        );
        Ok(stored)
    }

    fn apply(&self, semester: Semester, delta: &ScheduleDelta) -> Result<Arc<GlobalSchedule>> {
        let mut versions = self.versions.write().map_err(poisoned)?;
        let history = versions.entry(semester).or_default();
        let mut next = match history.last() {
            Some(latest) => latest.apply(delta)?,
            None => GlobalSchedule::new(semester).apply(delta)?,
        };
        next.version = history.len() as u64 + 1;
        let stored = Arc::new(next);
        history.push(Arc::clone(&stored));
        debug!(
            %semester,
            version = stored.version,
            section = delta.section_id(),
            "schedule delta applied"
        );
        Ok(stored)
    }
}
