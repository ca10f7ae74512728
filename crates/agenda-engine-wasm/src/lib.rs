//! WASM bindings for agenda-engine.
//!
//! Exposes the conflict check, the booking pickers and grid placement to the web
//! agenda via `wasm-bindgen`. All complex types are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p agenda-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/agenda_engine_wasm.wasm
//! ```

use std::collections::BTreeSet;

use agenda_engine::availability::SlotAvailability;
use agenda_engine::grid::GridBlock;
use agenda_engine::intake::ResolvedBooking;
use agenda_engine::{
    Appointment, AppointmentId, BookingDraft, BookingRequest, GridLayout, GridPosition, MachineId,
    ProfessionalId, ResourceKey, RoomKey, Roster, Zone,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Naive datetimes are clinic wall-clock times in `tz`.
fn parse_datetime(s: &str, tz: Tz) -> Result<DateTime<Utc>, JsValue> {
    // RFC 3339 carries its own offset.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Fall back to a naive local time; the earlier instant wins in the autumn overlap.
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| JsValue::from_str(&format!("Nonexistent local time '{}' in {}", s, tz)))
}

/// The given IANA timezone, or the clinic's when absent.
fn parse_timezone(timezone: Option<&str>) -> Result<Tz, JsValue> {
    match timezone {
        Some(name) => name
            .parse()
            .map_err(|_| JsValue::from_str(&format!("Invalid timezone: {}", name))),
        None => Ok(Roster::default().timezone),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn engine_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn layout(day_start_minute: u32, slot_minutes: u32, timezone: &str) -> Result<GridLayout, JsValue> {
    let tz = parse_timezone(Some(timezone))?;
    GridLayout::new(day_start_minute, slot_minutes, tz).map_err(engine_err)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotDto {
    start: String,
    available: bool,
}

impl From<&SlotAvailability> for SlotDto {
    fn from(s: &SlotAvailability) -> Self {
        Self {
            start: s.start.to_rfc3339(),
            available: s.available,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GridPositionDto {
    row_start: i64,
    row_span: u32,
    column: usize,
}

impl From<&GridPosition> for GridPositionDto {
    fn from(p: &GridPosition) -> Self {
        Self {
            row_start: p.row_start,
            row_span: p.row_span,
            column: p.column,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GridBlockDto {
    appointment_id: String,
    resource: ResourceKey,
    row_start: i64,
    row_span: u32,
    column: usize,
}

impl From<&GridBlock> for GridBlockDto {
    fn from(b: &GridBlock) -> Self {
        Self {
            appointment_id: b.appointment_id.to_string(),
            resource: b.resource.clone(),
            row_start: b.position.row_start,
            row_span: b.position.row_span,
            column: b.position.column,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingDto {
    client_name: String,
    session_type: String,
    is_mutua: bool,
    professional: ProfessionalId,
    room: RoomKey,
    machines: BTreeSet<MachineId>,
    start: String,
    duration_minutes: u32,
}

impl From<&ResolvedBooking> for BookingDto {
    fn from(b: &ResolvedBooking) -> Self {
        Self {
            client_name: b.client_name.clone(),
            session_type: b.session_type.clone(),
            is_mutua: b.is_mutua,
            professional: b.request.professional.clone(),
            room: b.request.room,
            machines: b.request.machines.clone(),
            start: b.request.interval.start().to_rfc3339(),
            duration_minutes: b.request.interval.duration_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Check a booking request against the day's appointments.
///
/// `request_json` is a `BookingRequest`, `existing_json` an array of
/// `Appointment`. Pass `exclude_id` when editing an appointment. Returns
/// `{canProceed, conflictAxis?, conflictingAppointmentId?, reason?}`.
#[wasm_bindgen(js_name = "checkConflict")]
pub fn check_conflict(
    request_json: &str,
    existing_json: &str,
    exclude_id: Option<String>,
) -> Result<String, JsValue> {
    let request: BookingRequest = parse_json(request_json, "request")?;
    let existing: Vec<Appointment> = parse_json(existing_json, "appointments")?;
    let exclude = exclude_id.map(AppointmentId::new);

    let result = agenda_engine::check_conflict_excluding(&request, &existing, exclude.as_ref());
    to_json(&result.report())
}

/// Mark candidate start times free or busy for a professional.
///
/// `slots_json` is an array of ISO 8601 strings. Strings without an offset are
/// read in `timezone` (the clinic's when absent). Returns `[{start, available}]`.
#[wasm_bindgen(js_name = "availableSlots")]
pub fn available_slots(
    professional_id: &str,
    duration_minutes: u32,
    slots_json: &str,
    existing_json: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let tz = parse_timezone(timezone.as_deref())?;
    let raw: Vec<String> = parse_json(slots_json, "slots")?;
    let slots = raw
        .iter()
        .map(|s| parse_datetime(s, tz))
        .collect::<Result<Vec<_>, _>>()?;
    let existing: Vec<Appointment> = parse_json(existing_json, "appointments")?;

    let table = agenda_engine::available_slots(
        &ProfessionalId::new(professional_id),
        duration_minutes,
        &slots,
        &existing,
    )
    .map_err(engine_err)?;

    let dtos: Vec<SlotDto> = table.iter().map(SlotDto::from).collect();
    to_json(&dtos)
}

/// Mark camilles `1..=room_count` of `zone` ("Dins"/"Fora") free or busy.
///
/// A `slot_start` without an offset is read in `timezone`, as in `availableSlots`.
/// Returns `[{number, available}]`.
#[wasm_bindgen(js_name = "availableRooms")]
pub fn available_rooms(
    zone: &str,
    room_count: u32,
    slot_start: &str,
    duration_minutes: u32,
    existing_json: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let zone: Zone = zone.parse().map_err(engine_err)?;
    let start = parse_datetime(slot_start, parse_timezone(timezone.as_deref())?)?;
    let existing: Vec<Appointment> = parse_json(existing_json, "appointments")?;

    let table = agenda_engine::available_rooms(zone, room_count, start, duration_minutes, &existing)
        .map_err(engine_err)?;
    to_json(&table)
}

/// Place one appointment in the column of one resource.
///
/// Returns `{rowStart, rowSpan, column}` (0-based rows and columns).
#[wasm_bindgen(js_name = "gridPosition")]
pub fn grid_position(
    appointment_json: &str,
    resource_json: &str,
    axis_json: &str,
    day_start_minute: u32,
    slot_minutes: u32,
    timezone: &str,
) -> Result<String, JsValue> {
    let appointment: Appointment = parse_json(appointment_json, "appointment")?;
    let resource: ResourceKey = parse_json(resource_json, "resource")?;
    let axis: Vec<ResourceKey> = parse_json(axis_json, "axis")?;
    let layout = layout(day_start_minute, slot_minutes, timezone)?;

    let position =
        agenda_engine::grid_position(&appointment, &resource, &axis, &layout).map_err(engine_err)?;
    to_json(&GridPositionDto::from(&position))
}

/// Lay out every appointment with a column in the axis.
///
/// Returns `[{appointmentId, resource, rowStart, rowSpan, column}]`.
#[wasm_bindgen(js_name = "gridBlocks")]
pub fn grid_blocks(
    appointments_json: &str,
    axis_json: &str,
    day_start_minute: u32,
    slot_minutes: u32,
    timezone: &str,
) -> Result<String, JsValue> {
    let appointments: Vec<Appointment> = parse_json(appointments_json, "appointments")?;
    let axis: Vec<ResourceKey> = parse_json(axis_json, "axis")?;
    let layout = layout(day_start_minute, slot_minutes, timezone)?;

    let blocks = agenda_engine::grid_blocks(&appointments, &axis, &layout);
    let dtos: Vec<GridBlockDto> = blocks.iter().map(GridBlockDto::from).collect();
    to_json(&dtos)
}

/// Resolve the assistant's extraction into a booking.
///
/// `roster_json` falls back to the clinic's default roster when absent.
/// Returns `{ready: true, booking: {clientName, sessionType, isMutua,
/// professional, room, machines, start, durationMinutes}}`. Incomplete drafts
/// come back as `{ready: false, question}` rather than an error so the
/// assistant can ask the user.
#[wasm_bindgen(js_name = "resolveDraft")]
pub fn resolve_draft(
    draft_json: &str,
    roster_json: Option<String>,
    default_date: &str,
    zone: &str,
    camilla: u32,
) -> Result<String, JsValue> {
    let draft: BookingDraft = parse_json(draft_json, "draft")?;
    let roster = match roster_json {
        Some(json) => Roster::from_json(&json).map_err(engine_err)?,
        None => Roster::default(),
    };
    let date = NaiveDate::parse_from_str(default_date, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", default_date, e)))?;
    let zone: Zone = zone.parse().map_err(engine_err)?;
    let room = RoomKey::new(zone, camilla).map_err(engine_err)?;

    match draft.resolve(&roster, date, room) {
        Ok(resolved) => to_json(&serde_json::json!({
            "ready": true,
            "booking": BookingDto::from(&resolved),
        })),
        Err(err) => match err.question() {
            Some(question) => to_json(&serde_json::json!({
                "ready": false,
                "question": question,
                "error": err.to_string(),
            })),
            None => Err(engine_err(err)),
        },
    }
}
