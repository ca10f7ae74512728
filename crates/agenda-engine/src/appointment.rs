//! Appointment records and booking requests.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::resource::{MachineId, ProfessionalId, ResourceKey, RoomKey};

/// Stored appointment identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

impl AppointmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A booked appointment, read-only for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub professional: ProfessionalId,
    pub room: RoomKey,
    #[serde(default)]
    pub machines: BTreeSet<MachineId>,
    pub interval: TimeInterval,
}

/// A candidate appointment that hasn't been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub professional: ProfessionalId,
    pub room: RoomKey,
    #[serde(default)]
    pub machines: BTreeSet<MachineId>,
    pub interval: TimeInterval,
}

impl Appointment {
    /// Every resource this appointment occupies: professional, room, then machines by id.
    pub fn resources(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        resources_of(&self.professional, &self.room, &self.machines)
    }

    pub fn uses(&self, resource: &ResourceKey) -> bool {
        match resource {
            ResourceKey::Professional(id) => &self.professional == id,
            ResourceKey::Room(room) => &self.room == room,
            ResourceKey::Machine(id) => self.machines.contains(id),
        }
    }
}

impl BookingRequest {
    pub fn resources(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        resources_of(&self.professional, &self.room, &self.machines)
    }

    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            professional: self.professional,
            room: self.room,
            machines: self.machines,
            interval: self.interval,
        }
    }
}

impl From<&Appointment> for BookingRequest {
    fn from(appointment: &Appointment) -> Self {
        Self {
            professional: appointment.professional.clone(),
            room: appointment.room,
            machines: appointment.machines.clone(),
            interval: appointment.interval,
        }
    }
}

fn resources_of<'a>(
    professional: &'a ProfessionalId,
    room: &'a RoomKey,
    machines: &'a BTreeSet<MachineId>,
) -> impl Iterator<Item = ResourceKey> + 'a {
    std::iter::once(ResourceKey::Professional(professional.clone()))
        .chain(std::iter::once(ResourceKey::Room(*room)))
        .chain(machines.iter().cloned().map(ResourceKey::Machine))
}
