//! Bookable resources: professionals, rooms (camilles) and machines.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, Result};

/// Opaque professional identifier (e.g. `"1"` for Glòria).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfessionalId(pub String);

/// Opaque machine identifier (e.g. `"m2"` for Indiba).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(pub String);

impl ProfessionalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl MachineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfessionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two physical areas rooms are split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "Dins", alias = "Inside")]
    Inside,
    #[serde(rename = "Fora", alias = "Outside")]
    Outside,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Inside => f.write_str("Dins"),
            Zone::Outside => f.write_str("Fora"),
        }
    }
}

impl std::str::FromStr for Zone {
    type Err = AgendaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dins" | "inside" => Ok(Zone::Inside),
            "fora" | "outside" => Ok(Zone::Outside),
            other => Err(AgendaError::InvalidRequest(format!(
                "unknown zone '{other}' (expected Dins or Fora)"
            ))),
        }
    }
}

/// A numbered camilla within a zone. Numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRoom")]
pub struct RoomKey {
    pub zone: Zone,
    pub number: u32,
}

#[derive(Deserialize)]
struct RawRoom {
    zone: Zone,
    #[serde(alias = "camilla")]
    number: u32,
}

impl TryFrom<RawRoom> for RoomKey {
    type Error = AgendaError;

    fn try_from(raw: RawRoom) -> Result<Self> {
        RoomKey::new(raw.zone, raw.number)
    }
}

impl RoomKey {
    /// # Errors
    /// Returns `AgendaError::InvalidRequest` for room number 0.
    pub fn new(zone: Zone, number: u32) -> Result<Self> {
        if number == 0 {
            return Err(AgendaError::InvalidRequest(
                "room numbers start at 1".to_string(),
            ));
        }
        Ok(Self { zone, number })
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} camilla {}", self.zone, self.number)
    }
}

/// One of the three independent conflict dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceAxis {
    Professional,
    Room,
    Machine,
}

/// A concrete resource value on one of the axes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "axis", content = "id")]
pub enum ResourceKey {
    Professional(ProfessionalId),
    Room(RoomKey),
    Machine(MachineId),
}

impl ResourceKey {
    pub fn axis(&self) -> ResourceAxis {
        match self {
            ResourceKey::Professional(_) => ResourceAxis::Professional,
            ResourceKey::Room(_) => ResourceAxis::Room,
            ResourceKey::Machine(_) => ResourceAxis::Machine,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Professional(id) => write!(f, "professional {id}"),
            ResourceKey::Room(room) => write!(f, "{room}"),
            ResourceKey::Machine(id) => write!(f, "machine {id}"),
        }
    }
}

impl From<ProfessionalId> for ResourceKey {
    fn from(id: ProfessionalId) -> Self {
        ResourceKey::Professional(id)
    }
}

impl From<RoomKey> for ResourceKey {
    fn from(room: RoomKey) -> Self {
        ResourceKey::Room(room)
    }
}

impl From<MachineId> for ResourceKey {
    fn from(id: MachineId) -> Self {
        ResourceKey::Machine(id)
    }
}
