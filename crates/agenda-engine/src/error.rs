//! Error types for agenda-engine operations.

use thiserror::Error;

use crate::conflict::ConflictResult;

#[derive(Error, Debug)]
pub enum AgendaError {
    /// The request itself is malformed (zero duration, room 0, zero slot width...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A request references an identifier the roster doesn't know.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// A grid lookup for a resource that has no column in the axis order.
    #[error("Resource not in axis: {0}")]
    ResourceNotInAxis(String),

    #[error("Invalid roster: {0}")]
    Roster(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    /// The ledger refused a booking because it conflicts with a stored appointment.
    #[error("Booking rejected: {}", .0.reason().unwrap_or("conflict"))]
    Rejected(ConflictResult),

    #[error("Ledger lock poisoned")]
    Poisoned,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgendaError>;
