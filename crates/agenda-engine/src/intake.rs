//! Turn a natural-language booking extraction into a validated [`BookingRequest`].
//!
//! The extraction model returns loosely-filled fields (names, "HH:MM", optional
//! date). [`BookingDraft::resolve`] matches those names against the [`Roster`] and
//! either produces a complete request or says exactly what is missing, with the
//! follow-up question the assistant should ask.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::appointment::BookingRequest;
use crate::error::AgendaError;
use crate::interval::TimeInterval;
use crate::resource::RoomKey;
use crate::roster::Roster;

/// Fields extracted from a spoken or typed booking request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingDraft {
    pub client_name: Option<String>,
    pub professional_name: Option<String>,
    pub session_type_name: Option<String>,
    pub machine_name: Option<String>,
    /// `HH:MM`, local to the roster's timezone.
    pub time: Option<String>,
    /// `YYYY-MM-DD`; the caller's selected day when absent.
    pub date: Option<String>,
    pub is_mutua: Option<bool>,
}

/// A required draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingField {
    Client,
    Professional,
    SessionType,
    Time,
}

impl MissingField {
    /// Follow-up question for the user, in Catalan.
    pub fn question(self) -> &'static str {
        match self {
            MissingField::Client => "Per a quin client és la cita?",
            MissingField::Professional => "Amb quin professional?",
            MissingField::SessionType => "Quin tipus de sessió?",
            MissingField::Time => "A quina hora?",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingField::Client => "client",
            MissingField::Professional => "professional",
            MissingField::SessionType => "session type",
            MissingField::Time => "time",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("missing fields: {}", join(.0))]
    Missing(Vec<MissingField>),

    #[error("unknown {field}: '{value}'")]
    Unknown { field: &'static str, value: String },

    #[error("malformed {field}: '{value}'")]
    Malformed { field: &'static str, value: String },

    #[error("session type '{0}' requires a machine")]
    MachineRequired(String),

    #[error(transparent)]
    Engine(#[from] AgendaError),
}

impl IntakeError {
    /// The question to put back to the user when fields are missing.
    pub fn question(&self) -> Option<String> {
        match self {
            IntakeError::Missing(fields) => Some(
                fields
                    .iter()
                    .map(|f| f.question())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            IntakeError::MachineRequired(_) => Some("Quina màquina?".to_string()),
            _ => None,
        }
    }
}

fn join(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBooking {
    pub client_name: String,
    /// Session type id from the roster.
    pub session_type: String,
    pub is_mutua: bool,
    pub request: BookingRequest,
}

impl BookingDraft {
    /// Fields that are absent or blank, in a fixed order.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        [
            (MissingField::Client, &self.client_name),
            (MissingField::Professional, &self.professional_name),
            (MissingField::SessionType, &self.session_type_name),
            (MissingField::Time, &self.time),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(field, _)| field)
        .collect()
    }

    /// Resolve names against `roster` and build the booking request.
    ///
    /// `default_date` is used when the draft carries no date. The room isn't
    /// something the assistant extracts, so the caller picks it.
    ///
    /// # Errors
    /// - `IntakeError::Missing` listing every absent required field
    /// - `IntakeError::Unknown` for a name the roster doesn't have
    /// - `IntakeError::Malformed` for an unparsable time or date
    /// - `IntakeError::MachineRequired` when the session type needs a machine
    pub fn resolve(
        &self,
        roster: &Roster,
        default_date: NaiveDate,
        room: RoomKey,
    ) -> Result<ResolvedBooking, IntakeError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            debug!(?missing, "booking draft incomplete");
            return Err(IntakeError::Missing(missing));
        }

        let client_name = present(&self.client_name).unwrap_or_default().to_string();
        let professional_name = present(&self.professional_name).unwrap_or_default();
        let session_name = present(&self.session_type_name).unwrap_or_default();
        let time_text = present(&self.time).unwrap_or_default();

        let professional = roster
            .professional_by_name(professional_name)
            .ok_or_else(|| IntakeError::Unknown {
                field: "professional",
                value: professional_name.to_string(),
            })?;
        let session = roster
            .session_type_by_name(session_name)
            .ok_or_else(|| IntakeError::Unknown {
                field: "session type",
                value: session_name.to_string(),
            })?;

        let mut machines = BTreeSet::new();
        if let Some(name) = present(&self.machine_name) {
            let machine = roster.machine_by_name(name).ok_or_else(|| IntakeError::Unknown {
                field: "machine",
                value: name.to_string(),
            })?;
            machines.insert(machine.id.clone());
        }
        if session.requires_machine && machines.is_empty() {
            return Err(IntakeError::MachineRequired(session.name.clone()));
        }

        let time = NaiveTime::parse_from_str(time_text, "%H:%M").map_err(|_| {
            IntakeError::Malformed {
                field: "time",
                value: time_text.to_string(),
            }
        })?;
        let date = match present(&self.date) {
            Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                IntakeError::Malformed {
                    field: "date",
                    value: text.to_string(),
                }
            })?,
            None => default_date,
        };
        let start = roster
            .timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| IntakeError::Malformed {
                field: "time",
                value: format!("{date} {time_text}"),
            })?
            .with_timezone(&Utc);

        let request = BookingRequest {
            professional: professional.id.clone(),
            room,
            machines,
            interval: TimeInterval::new(start, session.duration_minutes)?,
        };
        roster.check_known(&request)?;

        debug!(
            professional = %request.professional,
            session = %session.id,
            start = %start,
            "booking draft resolved"
        );
        Ok(ResolvedBooking {
            client_name,
            session_type: session.id.clone(),
            is_mutua: self.is_mutua.unwrap_or(false),
            request,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
