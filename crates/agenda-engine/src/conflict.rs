//! Detect resource conflicts between a booking request and a day's appointments.
//!
//! Each request occupies one professional, one room and zero or more machines. The
//! axes are checked in a fixed priority order (professional, room, then machines by
//! id) and the first overlapping appointment found decides the result, so callers
//! always get a single human-readable reason.
//!
//! Adjacent appointments (one ends exactly when the other starts) are NOT conflicts.
//!
//! Identifiers that no stored appointment uses simply never match. The engine can't
//! tell a free resource from a misspelled one; validate requests against the
//! [`Roster`](crate::roster::Roster) first when that matters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::{Appointment, AppointmentId, BookingRequest};
use crate::resource::{ResourceAxis, ResourceKey};

/// Outcome of checking one request against a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConflictResult {
    /// No axis conflicts; the booking can proceed.
    Clear,
    /// The first conflict found in priority order.
    Conflict {
        axis: ResourceAxis,
        resource: ResourceKey,
        appointment_id: AppointmentId,
    },
}

impl ConflictResult {
    pub fn can_proceed(&self) -> bool {
        matches!(self, ConflictResult::Clear)
    }

    pub fn axis(&self) -> Option<ResourceAxis> {
        match self {
            ConflictResult::Clear => None,
            ConflictResult::Conflict { axis, .. } => Some(*axis),
        }
    }

    /// Message shown to clinic staff, in Catalan.
    pub fn reason(&self) -> Option<&'static str> {
        self.axis().map(|axis| match axis {
            ResourceAxis::Professional => "El professional ja està ocupat a aquesta hora.",
            ResourceAxis::Room => "La camilla ja està en ús en aquest horari.",
            ResourceAxis::Machine => "La màquina ja està en ús en aquest horari.",
        })
    }

    /// Flat camelCase view consumed by the web UI.
    pub fn report(&self) -> ConflictReport {
        match self {
            ConflictResult::Clear => ConflictReport {
                can_proceed: true,
                conflict_axis: None,
                conflicting_appointment_id: None,
                reason: None,
            },
            ConflictResult::Conflict {
                axis,
                appointment_id,
                ..
            } => ConflictReport {
                can_proceed: false,
                conflict_axis: Some(*axis),
                conflicting_appointment_id: Some(appointment_id.clone()),
                reason: self.reason().map(str::to_string),
            },
        }
    }
}

/// UI-facing shape of a [`ConflictResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub can_proceed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_axis: Option<ResourceAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_appointment_id: Option<AppointmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One resource clash, reported by [`find_all_conflicts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConflict {
    pub resource: ResourceKey,
    pub appointment_id: AppointmentId,
    pub overlap_minutes: i64,
}

/// Check a request against the day's appointments.
///
/// `existing` must already be limited to the request's day; no date filtering
/// happens here. Returns the first conflict in priority order, or
/// [`ConflictResult::Clear`].
pub fn check_conflict(request: &BookingRequest, existing: &[Appointment]) -> ConflictResult {
    check_conflict_excluding(request, existing, None)
}

/// Like [`check_conflict`], but ignores the appointment with id `exclude`.
///
/// Used when editing an appointment so it doesn't conflict with its own old slot.
pub fn check_conflict_excluding(
    request: &BookingRequest,
    existing: &[Appointment],
    exclude: Option<&AppointmentId>,
) -> ConflictResult {
    for resource in request.resources() {
        let hit = candidates(existing, exclude)
            .find(|appt| appt.uses(&resource) && appt.interval.overlaps(&request.interval));

        if let Some(appt) = hit {
            debug!(
                resource = %resource,
                conflicting = %appt.id,
                "booking request conflicts"
            );
            return ConflictResult::Conflict {
                axis: resource.axis(),
                resource,
                appointment_id: appt.id.clone(),
            };
        }
    }

    debug!(start = %request.interval.start(), "booking request is clear");
    ConflictResult::Clear
}

/// Find every (resource, appointment) clash for a request.
///
/// Ordered by resource priority, then by position in `existing`. An appointment
/// sharing two resources with the request shows up once per shared resource.
pub fn find_all_conflicts(
    request: &BookingRequest,
    existing: &[Appointment],
    exclude: Option<&AppointmentId>,
) -> Vec<ResourceConflict> {
    let mut conflicts = Vec::new();

    for resource in request.resources() {
        for appt in candidates(existing, exclude) {
            if appt.uses(&resource) && appt.interval.overlaps(&request.interval) {
                conflicts.push(ResourceConflict {
                    resource: resource.clone(),
                    appointment_id: appt.id.clone(),
                    overlap_minutes: appt.interval.overlap_minutes(&request.interval),
                });
            }
        }
    }

    conflicts
}

fn candidates<'a>(
    existing: &'a [Appointment],
    exclude: Option<&'a AppointmentId>,
) -> impl Iterator<Item = &'a Appointment> + 'a {
    existing
        .iter()
        .filter(move |appt| exclude != Some(&appt.id))
}
