//! One day's appointments with serialized writes.
//!
//! The conflict engine answers "does this request clash with this snapshot". The
//! ledger makes that answer binding: every write takes the lock, re-checks
//! against the current contents and only then inserts, so two staff members
//! booking the same slot at once can't both succeed.

use std::sync::RwLock;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentId, BookingRequest};
use crate::conflict::{check_conflict_excluding, ConflictResult};
use crate::day::{appointments_on, local_date};
use crate::error::{AgendaError, Result};

#[derive(Debug)]
pub struct DayLedger {
    date: NaiveDate,
    timezone: Tz,
    appointments: RwLock<Vec<Appointment>>,
}

impl DayLedger {
    /// Start a ledger for `date`. Appointments on other days are dropped.
    pub fn new(date: NaiveDate, timezone: Tz, appointments: &[Appointment]) -> Self {
        Self {
            date,
            timezone,
            appointments: RwLock::new(appointments_on(date, timezone, appointments)),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Book a new appointment if no resource conflicts.
    ///
    /// # Errors
    /// - `AgendaError::Rejected` with the first conflict found
    /// - `AgendaError::InvalidRequest` when the request starts on another day
    pub fn book(&self, request: BookingRequest) -> Result<Appointment> {
        self.ensure_same_day(&request)?;
        let mut appointments = self.appointments.write().map_err(|_| AgendaError::Poisoned)?;

        reject_on_conflict(check_conflict_excluding(&request, &appointments, None))?;

        let appointment = request.into_appointment(AppointmentId::new(Uuid::new_v4().to_string()));
        info!(id = %appointment.id, professional = %appointment.professional, "appointment booked");
        appointments.push(appointment.clone());
        Ok(appointment)
    }

    /// Move or edit an existing appointment, keeping its id.
    ///
    /// The appointment's own current slot never counts as a conflict.
    pub fn reschedule(&self, id: &AppointmentId, request: BookingRequest) -> Result<Appointment> {
        self.ensure_same_day(&request)?;
        let mut appointments = self.appointments.write().map_err(|_| AgendaError::Poisoned)?;

        let index = appointments
            .iter()
            .position(|appt| &appt.id == id)
            .ok_or_else(|| AgendaError::NotFound(id.to_string()))?;

        reject_on_conflict(check_conflict_excluding(&request, &appointments, Some(id)))?;

        let updated = request.into_appointment(id.clone());
        info!(id = %id, "appointment rescheduled");
        appointments[index] = updated.clone();
        Ok(updated)
    }

    pub fn cancel(&self, id: &AppointmentId) -> Result<Appointment> {
        let mut appointments = self.appointments.write().map_err(|_| AgendaError::Poisoned)?;
        let index = appointments
            .iter()
            .position(|appt| &appt.id == id)
            .ok_or_else(|| AgendaError::NotFound(id.to_string()))?;
        info!(id = %id, "appointment cancelled");
        Ok(appointments.remove(index))
    }

    /// Current appointments ordered by start time.
    pub fn snapshot(&self) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().map_err(|_| AgendaError::Poisoned)?;
        let mut snapshot = appointments.clone();
        snapshot.sort_by_key(|appt| appt.interval.start());
        Ok(snapshot)
    }

    fn ensure_same_day(&self, request: &BookingRequest) -> Result<()> {
        let day = local_date(request.interval.start(), self.timezone);
        if day != self.date {
            debug!(ledger = %self.date, request = %day, "request outside ledger day");
            return Err(AgendaError::InvalidRequest(format!(
                "request starts on {day}, ledger holds {}",
                self.date
            )));
        }
        Ok(())
    }
}

fn reject_on_conflict(result: ConflictResult) -> Result<()> {
    if result.can_proceed() {
        return Ok(());
    }
    warn!(?result, "booking rejected");
    Err(AgendaError::Rejected(result))
}
