//! Per-semester exclusive claims.
//!
//! A regeneration and point edits for the same semester never interleave.
//! Generation claims with [`SemesterLocks::try_claim`] and is rejected if the
//! semester is busy; point edits wait with [`SemesterLocks::claim`].

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{Result, SchedulingError};
use crate::models::Semester;

/// Held while a semester is claimed; released on drop.
#[derive(Debug)]
pub struct SemesterClaim {
    semester: Semester,
    _guard: OwnedMutexGuard<()>,
}

impl SemesterClaim {
    /// Claimed semester.
    pub fn semester(&self) -> Semester {
        self.semester
    }
}

/// One async mutex per semester.
#[derive(Debug, Clone, Default)]
pub struct SemesterLocks {
    first: Arc<Mutex<()>>,
    second: Arc<Mutex<()>>,
}

impl SemesterLocks {
    /// Creates unclaimed locks.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, semester: Semester) -> Arc<Mutex<()>> {
        match semester {
            Semester::First => Arc::clone(&self.first),
            Semester::Second => Arc::clone(&self.second),
        }
    }

    /// Claims a semester without waiting.
    ///
    /// # Errors
    /// `SemesterBusy` if the semester is already claimed.
    pub fn try_claim(&self, semester: Semester) -> Result<SemesterClaim> {
        let guard = self
            .lock_for(semester)
            .try_lock_owned()
            .map_err(|_| SchedulingError::SemesterBusy(semester))?;
        Ok(SemesterClaim {
            semester,
            _guard: guard,
        })
    }

    /// Claims a semester, waiting for any current holder.
    pub async fn claim(&self, semester: Semester) -> SemesterClaim {
        let guard = self.lock_for(semester).lock_owned().await;
        SemesterClaim {
            semester,
            _guard: guard,
        }
    }

    /// Whether a semester is currently claimed.
    pub fn is_claimed(&self, semester: Semester) -> bool {
        self.lock_for(semester).try_lock().is_err()
    }
}
