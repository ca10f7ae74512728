//! # agenda-engine
//!
//! Resource-conflict detection and slot availability for a physiotherapy clinic.
//!
//! Every appointment occupies one professional, one camilla (a numbered room in
//! the "Dins" or "Fora" zone) and zero or more machines for a half-open time
//! interval. The engine answers whether a new booking clashes with a day's
//! appointments on any of those axes, which start times and rooms are still
//! free, and where each appointment sits in the agenda grid.
//!
//! ## Modules
//!
//! - [`interval`] — `TimeInterval` and the half-open overlap rule
//! - [`resource`] — professional, room and machine identifiers
//! - [`appointment`] — `Appointment` and `BookingRequest`
//! - [`conflict`] — First-conflict check in professional → room → machine order
//! - [`availability`] — Per-slot, per-room and per-machine availability
//! - [`grid`] — Row/column placement for the agenda and machine views
//! - [`roster`] — The clinic's professionals, machines, session types and hours
//! - [`day`] — Calendar-day filtering
//! - [`intake`] — Validate natural-language booking extractions
//! - [`ledger`] — One day's appointments with serialized writes
//! - [`error`] — Error types

pub mod appointment;
pub mod availability;
pub mod conflict;
pub mod day;
pub mod error;
pub mod grid;
pub mod intake;
pub mod interval;
pub mod ledger;
pub mod resource;
pub mod roster;

pub use appointment::{Appointment, AppointmentId, BookingRequest};
pub use availability::{available_machines, available_rooms, available_slots};
pub use conflict::{check_conflict, check_conflict_excluding, find_all_conflicts, ConflictResult};
pub use error::AgendaError;
pub use grid::{grid_blocks, grid_position, occupied_cells, GridLayout, GridPosition};
pub use intake::{BookingDraft, IntakeError};
pub use interval::TimeInterval;
pub use ledger::DayLedger;
pub use resource::{MachineId, ProfessionalId, ResourceAxis, ResourceKey, RoomKey, Zone};
pub use roster::Roster;
