//! Day-grid layout for the agenda and machine views.
//!
//! The grid has one column per resource (professional or machine) and one row per
//! fixed-size time slot starting at the clinic's opening time. Rows and columns are
//! 0-based; header offsets are the renderer's business.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::appointment::{Appointment, AppointmentId};
use crate::error::{AgendaError, Result};
use crate::resource::ResourceKey;

/// Row geometry of a day grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    day_start_minute: u32,
    slot_minutes: u32,
    timezone: Tz,
}

impl GridLayout {
    /// # Errors
    /// Returns `AgendaError::InvalidRequest` when `slot_minutes` is 0.
    pub fn new(day_start_minute: u32, slot_minutes: u32, timezone: Tz) -> Result<Self> {
        if slot_minutes == 0 {
            return Err(AgendaError::InvalidRequest(
                "slot granularity must be greater than zero minutes".to_string(),
            ));
        }
        Ok(Self {
            day_start_minute,
            slot_minutes,
            timezone,
        })
    }

    pub fn day_start_minute(&self) -> u32 {
        self.day_start_minute
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Wall-clock minute of the day of `instant` in the layout's timezone.
    pub fn minute_of_day(&self, instant: DateTime<Utc>) -> u32 {
        let local = instant.with_timezone(&self.timezone);
        local.hour() * 60 + local.minute()
    }
}

/// Where an appointment block sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    /// May be negative for appointments starting before the grid does.
    pub row_start: i64,
    pub row_span: u32,
    pub column: usize,
}

/// One rendered block: an appointment placed in one resource column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBlock {
    pub appointment_id: AppointmentId,
    pub resource: ResourceKey,
    pub position: GridPosition,
}

/// Place `appointment` in the column of `resource`.
///
/// `row_start = floor((minute_of_day(start) - day_start_minute) / slot_minutes)`,
/// `row_span = ceil(duration / slot_minutes)`, `column` = index of `resource` in
/// `axis_order`. An appointment with several machines is placed once per machine
/// by calling this once per machine.
///
/// # Errors
/// Returns `AgendaError::ResourceNotInAxis` when `resource` has no column in
/// `axis_order` or the appointment doesn't use it.
pub fn grid_position(
    appointment: &Appointment,
    resource: &ResourceKey,
    axis_order: &[ResourceKey],
    layout: &GridLayout,
) -> Result<GridPosition> {
    if !appointment.uses(resource) {
        return Err(AgendaError::ResourceNotInAxis(format!(
            "appointment {} does not use {resource}",
            appointment.id
        )));
    }
    let column = axis_order
        .iter()
        .position(|key| key == resource)
        .ok_or_else(|| AgendaError::ResourceNotInAxis(resource.to_string()))?;

    let slot = i64::from(layout.slot_minutes);
    let offset = i64::from(layout.minute_of_day(appointment.interval.start()))
        - i64::from(layout.day_start_minute);

    Ok(GridPosition {
        row_start: offset.div_euclid(slot),
        row_span: appointment
            .interval
            .duration_minutes()
            .div_ceil(layout.slot_minutes),
        column,
    })
}

/// Lay out every appointment that has a column in `axis_order`.
///
/// Produces one block per (appointment, resource) pair, so a two-machine
/// appointment yields two blocks in the machine view. Appointments with no
/// resource on the axis are skipped.
pub fn grid_blocks(
    appointments: &[Appointment],
    axis_order: &[ResourceKey],
    layout: &GridLayout,
) -> Vec<GridBlock> {
    appointments
        .iter()
        .flat_map(|appt| {
            appt.resources().filter_map(move |resource| {
                let position = grid_position(appt, &resource, axis_order, layout).ok()?;
                Some(GridBlock {
                    appointment_id: appt.id.clone(),
                    resource,
                    position,
                })
            })
        })
        .collect()
}

/// Shading table: `cells[column][row]` is true when an appointment using that
/// column's resource overlaps the row's time window.
pub fn occupied_cells(
    axis_order: &[ResourceKey],
    layout: &GridLayout,
    rows: u32,
    existing: &[Appointment],
) -> Vec<Vec<bool>> {
    axis_order
        .iter()
        .map(|resource| {
            // Minutes are widened to i64: durations and row counts are unbounded u32s.
            let busy: Vec<(i64, i64)> = existing
                .iter()
                .filter(|appt| appt.uses(resource))
                .map(|appt| {
                    let start = i64::from(layout.minute_of_day(appt.interval.start()));
                    (start, start + i64::from(appt.interval.duration_minutes()))
                })
                .collect();

            let slot = i64::from(layout.slot_minutes);
            (0..rows)
                .map(|row| {
                    let row_start = i64::from(layout.day_start_minute) + i64::from(row) * slot;
                    let row_end = row_start + slot;
                    busy.iter()
                        .any(|&(start, end)| start.max(row_start) < end.min(row_end))
                })
                .collect()
        })
        .collect()
}
