//! Per-slot and per-room availability tables for the booking pickers.
//!
//! The pickers narrow a booking down step by step: first a start time that the
//! chosen professional has free, then a camilla in the chosen zone, then
//! optionally a machine. Each step only looks at its own axis; the full
//! cross-axis check happens in [`check_conflict`](crate::conflict::check_conflict)
//! once every field is chosen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::Appointment;
use crate::error::Result;
use crate::interval::{validate_duration, TimeInterval};
use crate::resource::{MachineId, ProfessionalId, ResourceKey, RoomKey, Zone};

/// Whether a candidate start time is free for the professional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub start: DateTime<Utc>,
    pub available: bool,
}

/// Whether a camilla is free for the requested interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAvailability {
    pub number: u32,
    pub available: bool,
}

/// Whether a machine is free for the requested interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineAvailability {
    pub machine: MachineId,
    pub available: bool,
}

/// Mark each candidate start as free or busy for `professional`.
///
/// Each slot is treated as the interval `[slot, slot + duration_minutes)`. Room and
/// machine axes are ignored here. Output has one entry per input slot, same order.
///
/// # Errors
/// Returns `AgendaError::InvalidRequest` when `duration_minutes` is 0.
pub fn available_slots(
    professional: &ProfessionalId,
    duration_minutes: u32,
    candidate_slots: &[DateTime<Utc>],
    existing: &[Appointment],
) -> Result<Vec<SlotAvailability>> {
    validate_duration(duration_minutes)?;
    let resource = ResourceKey::Professional(professional.clone());
    let busy: Vec<&TimeInterval> = busy_intervals(&resource, existing).collect();

    let slots = candidate_slots
        .iter()
        .map(|&start| {
            let slot = TimeInterval::new(start, duration_minutes)?;
            Ok(SlotAvailability {
                start,
                available: !busy.iter().any(|b| b.overlaps(&slot)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        professional = %professional,
        free = slots.iter().filter(|s| s.available).count(),
        total = slots.len(),
        "computed slot availability"
    );
    Ok(slots)
}

/// Mark camilles `1..=room_count` of `zone` as free or busy for the interval.
///
/// # Errors
/// Returns `AgendaError::InvalidRequest` when `duration_minutes` is 0.
pub fn available_rooms(
    zone: Zone,
    room_count: u32,
    slot_start: DateTime<Utc>,
    duration_minutes: u32,
    existing: &[Appointment],
) -> Result<Vec<RoomAvailability>> {
    let wanted = TimeInterval::new(slot_start, duration_minutes)?;

    (1..=room_count)
        .map(|number| {
            let resource = ResourceKey::Room(RoomKey::new(zone, number)?);
            Ok(RoomAvailability {
                number,
                available: is_free(&resource, &wanted, existing),
            })
        })
        .collect()
}

/// Mark each machine of `machines` as free or busy for the interval, same order.
///
/// # Errors
/// Returns `AgendaError::InvalidRequest` when `duration_minutes` is 0.
pub fn available_machines(
    machines: &[MachineId],
    slot_start: DateTime<Utc>,
    duration_minutes: u32,
    existing: &[Appointment],
) -> Result<Vec<MachineAvailability>> {
    let wanted = TimeInterval::new(slot_start, duration_minutes)?;

    Ok(machines
        .iter()
        .map(|machine| MachineAvailability {
            machine: machine.clone(),
            available: is_free(&ResourceKey::Machine(machine.clone()), &wanted, existing),
        })
        .collect())
}

fn busy_intervals<'a>(
    resource: &'a ResourceKey,
    existing: &'a [Appointment],
) -> impl Iterator<Item = &'a TimeInterval> + 'a {
    existing
        .iter()
        .filter(move |appt| appt.uses(resource))
        .map(|appt| &appt.interval)
}

fn is_free(resource: &ResourceKey, wanted: &TimeInterval, existing: &[Appointment]) -> bool {
    !busy_intervals(resource, existing).any(|busy| busy.overlaps(wanted))
}
