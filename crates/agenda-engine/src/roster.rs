//! The clinic's static roster: professionals, machines, session types, rooms and hours.
//!
//! Passed explicitly to whatever needs it instead of living in global state, so
//! tests and other clinics can supply their own. [`Roster::default`] is the
//! clinic's own configuration.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::BookingRequest;
use crate::error::{AgendaError, Result};
use crate::grid::GridLayout;
use crate::resource::{MachineId, ProfessionalId, ResourceKey, RoomKey, Zone};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: ProfessionalId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionType {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub requires_machine: bool,
}

/// Opening hours, whole hours in the roster's timezone. `close_hour` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub professionals: Vec<Professional>,
    pub machines: Vec<Machine>,
    pub session_types: Vec<SessionType>,
    /// Camilles per zone, numbered from 1.
    pub rooms_per_zone: u32,
    pub hours: ClinicHours,
    pub timezone: Tz,
}

impl Default for Roster {
    fn default() -> Self {
        let professional = |id: &str, name: &str| Professional {
            id: ProfessionalId::new(id),
            name: name.to_string(),
        };
        let machine = |id: &str, name: &str| Machine {
            id: MachineId::new(id),
            name: name.to_string(),
        };
        let session = |id: &str, name: &str, duration_minutes: u32, requires_machine: bool| {
            SessionType {
                id: id.to_string(),
                name: name.to_string(),
                duration_minutes,
                requires_machine,
            }
        };

        Self {
            professionals: vec![
                professional("1", "Glòria"),
                professional("2", "Ester"),
                professional("3", "Sílvia"),
                professional("4", "Iván"),
                professional("5", "Maria"),
            ],
            machines: vec![
                machine("m1", "Magneto"),
                machine("m2", "Indiba"),
                machine("m3", "TENS"),
                machine("m4", "Làser"),
                machine("m5", "Ultrasons"),
            ],
            session_types: vec![
                session("s1", "Privat 1h", 60, false),
                session("s2", "Privat 30", 30, false),
                session("s3", "Semi-privat", 60, true),
                session("s4", "Exercicis", 30, false),
                session("s5", "Grup manteniment", 50, false),
                session("s6", "Domicilis", 90, false),
                session("s7", "Màquina sola", 30, true),
            ],
            rooms_per_zone: 4,
            hours: ClinicHours {
                open_hour: 8,
                close_hour: 21,
            },
            timezone: chrono_tz::Europe::Madrid,
        }
    }
}

impl Roster {
    /// Parse and validate a roster from JSON.
    ///
    /// # Errors
    /// `AgendaError::Json` for malformed JSON, `AgendaError::Roster` when validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let roster: Roster = serde_json::from_str(json)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Read a roster JSON file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading roster");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject duplicate ids, zero durations, zero rooms and inverted hours.
    pub fn validate(&self) -> Result<()> {
        ensure_unique("professional", self.professionals.iter().map(|p| p.id.as_str()))?;
        ensure_unique("machine", self.machines.iter().map(|m| m.id.as_str()))?;
        ensure_unique("session type", self.session_types.iter().map(|s| s.id.as_str()))?;

        if let Some(s) = self.session_types.iter().find(|s| s.duration_minutes == 0) {
            return Err(AgendaError::Roster(format!(
                "session type '{}' has a zero duration",
                s.name
            )));
        }
        if self.rooms_per_zone == 0 {
            return Err(AgendaError::Roster("rooms_per_zone must be at least 1".to_string()));
        }
        if self.hours.open_hour >= self.hours.close_hour || self.hours.close_hour > 24 {
            return Err(AgendaError::Roster(format!(
                "invalid opening hours {}..{}",
                self.hours.open_hour, self.hours.close_hour
            )));
        }
        Ok(())
    }

    pub fn professional(&self, id: &ProfessionalId) -> Option<&Professional> {
        self.professionals.iter().find(|p| &p.id == id)
    }

    pub fn machine(&self, id: &MachineId) -> Option<&Machine> {
        self.machines.iter().find(|m| &m.id == id)
    }

    pub fn session_type(&self, id: &str) -> Option<&SessionType> {
        self.session_types.iter().find(|s| s.id == id)
    }

    pub fn professional_by_name(&self, name: &str) -> Option<&Professional> {
        self.professionals.iter().find(|p| same_name(&p.name, name))
    }

    pub fn machine_by_name(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| same_name(&m.name, name))
    }

    pub fn session_type_by_name(&self, name: &str) -> Option<&SessionType> {
        self.session_types.iter().find(|s| same_name(&s.name, name))
    }

    /// Column order of the agenda view: one column per professional, roster order.
    pub fn professional_axis(&self) -> Vec<ResourceKey> {
        self.professionals
            .iter()
            .map(|p| ResourceKey::Professional(p.id.clone()))
            .collect()
    }

    /// Column order of the machine view.
    pub fn machine_axis(&self) -> Vec<ResourceKey> {
        self.machines
            .iter()
            .map(|m| ResourceKey::Machine(m.id.clone()))
            .collect()
    }

    pub fn has_room(&self, room: &RoomKey) -> bool {
        room.number >= 1 && room.number <= self.rooms_per_zone
    }

    /// Every room of a zone, ascending.
    pub fn rooms(&self, zone: Zone) -> Vec<RoomKey> {
        (1..=self.rooms_per_zone)
            .map(|number| RoomKey { zone, number })
            .collect()
    }

    /// Fail when the request references a professional, room or machine this
    /// roster doesn't define.
    ///
    /// The conflict engine never matches unknown ids, so an unchecked typo would
    /// silently report a free slot.
    pub fn check_known(&self, request: &BookingRequest) -> Result<()> {
        for resource in request.resources() {
            let known = match &resource {
                ResourceKey::Professional(id) => self.professional(id).is_some(),
                ResourceKey::Room(room) => self.has_room(room),
                ResourceKey::Machine(id) => self.machine(id).is_some(),
            };
            if !known {
                return Err(AgendaError::UnknownResource(resource.to_string()));
            }
        }
        Ok(())
    }

    /// Candidate start instants for `date`, every `step_minutes` from opening time
    /// up to (not including) closing time.
    ///
    /// Local wall-clock times that don't exist on that date (DST gap) are skipped.
    ///
    /// # Errors
    /// Returns `AgendaError::InvalidRequest` when `step_minutes` is 0.
    pub fn candidate_slots(
        &self,
        date: NaiveDate,
        step_minutes: u32,
    ) -> Result<Vec<DateTime<Utc>>> {
        if step_minutes == 0 {
            return Err(AgendaError::InvalidRequest(
                "slot step must be greater than zero minutes".to_string(),
            ));
        }

        let open = self.hours.open_hour * 60;
        let close = self.hours.close_hour * 60;
        let slots = (open..close)
            .step_by(step_minutes as usize)
            .filter_map(|minute| {
                let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)?;
                self.timezone
                    .from_local_datetime(&date.and_time(time))
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
            })
            .collect();
        Ok(slots)
    }

    /// Grid layout starting at opening time, in the roster's timezone.
    pub fn grid_layout(&self, slot_minutes: u32) -> Result<GridLayout> {
        GridLayout::new(self.hours.open_hour * 60, slot_minutes, self.timezone)
    }

    /// Number of `slot_minutes` rows between opening and closing time.
    ///
    /// A trailing partial row is kept so the last minutes before closing still
    /// have a row to render in.
    pub fn grid_rows(&self, slot_minutes: u32) -> u32 {
        if slot_minutes == 0 {
            return 0;
        }
        let open_minutes = self.hours.close_hour.saturating_sub(self.hours.open_hour) * 60;
        open_minutes.div_ceil(slot_minutes)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn ensure_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AgendaError::Roster(format!("duplicate {kind} id '{id}'")));
        }
    }
    Ok(())
}
