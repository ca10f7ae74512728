//! Half-open time intervals.
//!
//! An interval is a start instant plus a strictly positive duration in minutes.
//! Two intervals overlap when `max(a.start, b.start) < min(a.end, b.end)`, so an
//! appointment ending at 10:00 and one starting at 10:00 do NOT overlap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, Result};

/// A `[start, start + duration)` interval with `duration_minutes > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    duration_minutes: u32,
}

/// Unchecked wire shape; validated through `TryFrom` on deserialization.
#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    #[serde(alias = "durationMinutes")]
    duration_minutes: u32,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = AgendaError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        TimeInterval::new(raw.start, raw.duration_minutes)
    }
}

impl TimeInterval {
    /// Build an interval, rejecting zero-length durations.
    ///
    /// # Errors
    /// Returns `AgendaError::InvalidRequest` when `duration_minutes` is 0.
    pub fn new(start: DateTime<Utc>, duration_minutes: u32) -> Result<Self> {
        validate_duration(duration_minutes)?;
        Ok(Self {
            start,
            duration_minutes,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open overlap test. Symmetric; adjacent intervals don't overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start.max(other.start) < self.end().min(other.end())
    }

    /// Minutes shared by both intervals, 0 when they don't overlap.
    pub fn overlap_minutes(&self, other: &TimeInterval) -> i64 {
        let overlap_start = self.start.max(other.start);
        let overlap_end = self.end().min(other.end());
        if overlap_start < overlap_end {
            (overlap_end - overlap_start).num_minutes()
        } else {
            0
        }
    }
}

pub(crate) fn validate_duration(duration_minutes: u32) -> Result<()> {
    if duration_minutes == 0 {
        return Err(AgendaError::InvalidRequest(
            "duration must be greater than zero minutes".to_string(),
        ));
    }
    Ok(())
}
