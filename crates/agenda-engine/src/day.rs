//! Calendar-day helpers.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::appointment::Appointment;

/// Local calendar date of `instant` in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Keep only the appointments starting on `date` (local to `tz`), preserving order.
///
/// The conflict engine expects a single day's snapshot; this is the filter for
/// callers holding more than that.
pub fn appointments_on(date: NaiveDate, tz: Tz, appointments: &[Appointment]) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appt| local_date(appt.interval.start(), tz) == date)
        .cloned()
        .collect()
}
