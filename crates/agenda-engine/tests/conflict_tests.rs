//! Tests for booking-request conflict detection.

use std::collections::BTreeSet;

use agenda_engine::conflict::{find_all_conflicts, ResourceConflict};
use agenda_engine::{
    check_conflict, check_conflict_excluding, Appointment, AppointmentId, BookingRequest,
    ConflictResult, MachineId, ProfessionalId, ResourceAxis, ResourceKey, RoomKey, TimeInterval,
    Zone,
};
use chrono::{TimeZone, Utc};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn interval(start_hour: u32, start_min: u32, duration: u32) -> TimeInterval {
    let start = Utc
        .with_ymd_and_hms(2026, 3, 2, start_hour, start_min, 0)
        .unwrap();
    TimeInterval::new(start, duration).unwrap()
}

fn room(zone: Zone, number: u32) -> RoomKey {
    RoomKey::new(zone, number).unwrap()
}

fn machines(ids: &[&str]) -> BTreeSet<MachineId> {
    ids.iter().map(|id| MachineId::new(*id)).collect()
}

fn appointment(
    id: &str,
    professional: &str,
    room: RoomKey,
    machine_ids: &[&str],
    interval: TimeInterval,
) -> Appointment {
    Appointment {
        id: AppointmentId::new(id),
        professional: ProfessionalId::new(professional),
        room,
        machines: machines(machine_ids),
        interval,
    }
}

fn request(
    professional: &str,
    room: RoomKey,
    machine_ids: &[&str],
    interval: TimeInterval,
) -> BookingRequest {
    BookingRequest {
        professional: ProfessionalId::new(professional),
        room,
        machines: machines(machine_ids),
        interval,
    }
}

fn conflict_id(result: &ConflictResult) -> Option<&str> {
    match result {
        ConflictResult::Clear => None,
        ConflictResult::Conflict { appointment_id, .. } => Some(appointment_id.as_str()),
    }
}

// ── Basic outcomes ──────────────────────────────────────────────────────────

#[test]
fn empty_day_is_clear() {
    let req = request("P1", room(Zone::Inside, 1), &[], interval(9, 0, 60));
    let result = check_conflict(&req, &[]);
    assert!(result.can_proceed());
    assert_eq!(result.axis(), None);
    assert_eq!(result.reason(), None);
}

#[test]
fn same_professional_overlap_conflicts() {
    // Existing: P1 09:00-10:00 in Dins 1. Request: P1 09:30-09:45 in Dins 2.
    let existing = vec![appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60))];
    let req = request("P1", room(Zone::Inside, 2), &[], interval(9, 30, 15));

    let result = check_conflict(&req, &existing);

    assert!(!result.can_proceed());
    assert_eq!(result.axis(), Some(ResourceAxis::Professional));
    assert_eq!(conflict_id(&result), Some("a1"));
}

#[test]
fn different_professional_same_time_is_clear() {
    let existing = vec![appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60))];
    let req = request("P2", room(Zone::Inside, 2), &[], interval(9, 30, 15));

    assert_eq!(check_conflict(&req, &existing), ConflictResult::Clear);
}

#[test]
fn adjacent_appointments_do_not_conflict() {
    // Existing ends at 10:00, request starts at 10:00 on every shared resource.
    let existing = vec![appointment(
        "a1",
        "P1",
        room(Zone::Inside, 1),
        &["m1"],
        interval(9, 0, 60),
    )];
    let req = request("P1", room(Zone::Inside, 1), &["m1"], interval(10, 0, 30));

    assert!(check_conflict(&req, &existing).can_proceed());
}

#[test]
fn request_ending_when_existing_starts_is_clear() {
    let existing = vec![appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(10, 0, 60))];
    let req = request("P1", room(Zone::Inside, 1), &[], interval(9, 0, 60));

    assert!(check_conflict(&req, &existing).can_proceed());
}

// ── Axis priority ───────────────────────────────────────────────────────────

#[test]
fn professional_wins_over_room() {
    // Professional busy 10:00-11:00 (Dins 3); room Dins 1 busy 10:30-11:30 by P2.
    // Request P1 in Dins 1 at 10:30-11:00 clashes on both; professional is reported.
    let existing = vec![
        appointment("room-busy", "P2", room(Zone::Inside, 1), &[], interval(10, 30, 60)),
        appointment("prof-busy", "P1", room(Zone::Inside, 3), &[], interval(10, 0, 60)),
    ];
    let req = request("P1", room(Zone::Inside, 1), &[], interval(10, 30, 30));

    let result = check_conflict(&req, &existing);

    assert_eq!(result.axis(), Some(ResourceAxis::Professional));
    assert_eq!(conflict_id(&result), Some("prof-busy"));
    assert_eq!(
        result.reason(),
        Some("El professional ja està ocupat a aquesta hora.")
    );
}

#[test]
fn room_wins_over_machine() {
    let existing = vec![
        appointment("machine-busy", "P3", room(Zone::Outside, 4), &["m2"], interval(11, 0, 60)),
        appointment("room-busy", "P2", room(Zone::Outside, 1), &[], interval(11, 0, 60)),
    ];
    let req = request("P1", room(Zone::Outside, 1), &["m2"], interval(11, 15, 30));

    let result = check_conflict(&req, &existing);

    assert_eq!(result.axis(), Some(ResourceAxis::Room));
    assert_eq!(conflict_id(&result), Some("room-busy"));
    assert_eq!(
        result.reason(),
        Some("La camilla ja està en ús en aquest horari.")
    );
}

#[test]
fn machine_conflict_reported_when_other_axes_free() {
    let existing = vec![appointment(
        "a2",
        "P2",
        room(Zone::Inside, 2),
        &["m2"],
        interval(10, 30, 60),
    )];
    let req = request("P1", room(Zone::Inside, 1), &["m2"], interval(11, 0, 30));

    let result = check_conflict(&req, &existing);

    assert_eq!(
        result,
        ConflictResult::Conflict {
            axis: ResourceAxis::Machine,
            resource: ResourceKey::Machine(MachineId::new("m2")),
            appointment_id: AppointmentId::new("a2"),
        }
    );
    assert_eq!(
        result.reason(),
        Some("La màquina ja està en ús en aquest horari.")
    );
}

#[test]
fn lowest_machine_id_reported_first() {
    let existing = vec![
        appointment("uses-m4", "P2", room(Zone::Inside, 2), &["m4"], interval(9, 0, 60)),
        appointment("uses-m1", "P3", room(Zone::Inside, 3), &["m1"], interval(9, 0, 60)),
    ];
    let req = request("P1", room(Zone::Inside, 1), &["m4", "m1"], interval(9, 0, 30));

    let result = check_conflict(&req, &existing);

    assert_eq!(conflict_id(&result), Some("uses-m1"));
}

#[test]
fn same_room_number_in_other_zone_is_clear() {
    let existing = vec![appointment("a1", "P2", room(Zone::Outside, 1), &[], interval(9, 0, 60))];
    let req = request("P1", room(Zone::Inside, 1), &[], interval(9, 0, 60));

    assert!(check_conflict(&req, &existing).can_proceed());
}

#[test]
fn first_matching_appointment_in_input_order_wins() {
    let existing = vec![
        appointment("first", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60)),
        appointment("second", "P1", room(Zone::Inside, 2), &[], interval(9, 30, 60)),
    ];
    let req = request("P1", room(Zone::Inside, 3), &[], interval(9, 45, 15));

    assert_eq!(conflict_id(&check_conflict(&req, &existing)), Some("first"));
}

// ── Adjacent same-professional scenario ─────────────────────────────────────

#[test]
fn professional_booked_in_exact_slot_conflicts() {
    // P1 has 09:00-09:30 and 09:30-10:00; a new 09:30-10:00 for P1 clashes with the second.
    let existing = vec![
        appointment("early", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 30)),
        appointment("late", "P1", room(Zone::Inside, 2), &[], interval(9, 30, 30)),
    ];
    let same_prof = request("P1", room(Zone::Outside, 3), &["m5"], interval(9, 30, 30));
    let other_prof = request("P2", room(Zone::Outside, 3), &["m5"], interval(9, 30, 30));

    let result = check_conflict(&same_prof, &existing);
    assert_eq!(result.axis(), Some(ResourceAxis::Professional));
    assert_eq!(conflict_id(&result), Some("late"));

    assert!(check_conflict(&other_prof, &existing).can_proceed());
}

// ── Editing ─────────────────────────────────────────────────────────────────

#[test]
fn excluded_appointment_does_not_conflict_with_itself() {
    let existing = vec![appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60))];
    // Extend a1 by 30 minutes in place.
    let edit = request("P1", room(Zone::Inside, 1), &[], interval(9, 0, 90));

    assert!(!check_conflict(&edit, &existing).can_proceed());
    assert!(
        check_conflict_excluding(&edit, &existing, Some(&AppointmentId::new("a1"))).can_proceed()
    );
}

#[test]
fn exclusion_only_skips_the_named_appointment() {
    let existing = vec![
        appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60)),
        appointment("a2", "P1", room(Zone::Inside, 2), &[], interval(10, 0, 60)),
    ];
    let edit = request("P1", room(Zone::Inside, 1), &[], interval(9, 30, 60));

    let result = check_conflict_excluding(&edit, &existing, Some(&AppointmentId::new("a1")));
    assert_eq!(conflict_id(&result), Some("a2"));
}

// ── Report shape ────────────────────────────────────────────────────────────

#[test]
fn report_serializes_for_the_ui() {
    let existing = vec![appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60))];
    let req = request("P1", room(Zone::Inside, 2), &[], interval(9, 30, 15));

    let json = serde_json::to_value(check_conflict(&req, &existing).report()).unwrap();
    assert_eq!(json["canProceed"], false);
    assert_eq!(json["conflictAxis"], "Professional");
    assert_eq!(json["conflictingAppointmentId"], "a1");

    let clear = serde_json::to_value(ConflictResult::Clear.report()).unwrap();
    assert_eq!(clear, serde_json::json!({ "canProceed": true }));
}

// ── find_all_conflicts ──────────────────────────────────────────────────────

#[test]
fn all_conflicts_listed_in_priority_order() {
    let existing = vec![
        appointment("a1", "P1", room(Zone::Inside, 1), &["m1"], interval(9, 0, 60)),
        appointment("a2", "P2", room(Zone::Inside, 2), &["m2"], interval(9, 30, 60)),
    ];
    let req = request("P1", room(Zone::Inside, 2), &["m2"], interval(9, 45, 30));

    let conflicts = find_all_conflicts(&req, &existing, None);

    assert_eq!(
        conflicts,
        vec![
            ResourceConflict {
                resource: ResourceKey::Professional(ProfessionalId::new("P1")),
                appointment_id: AppointmentId::new("a1"),
                overlap_minutes: 15,
            },
            ResourceConflict {
                resource: ResourceKey::Room(room(Zone::Inside, 2)),
                appointment_id: AppointmentId::new("a2"),
                overlap_minutes: 30,
            },
            ResourceConflict {
                resource: ResourceKey::Machine(MachineId::new("m2")),
                appointment_id: AppointmentId::new("a2"),
                overlap_minutes: 30,
            },
        ]
    );
}

#[test]
fn check_is_deterministic() {
    let existing = vec![
        appointment("a1", "P1", room(Zone::Inside, 1), &[], interval(9, 0, 60)),
        appointment("a2", "P2", room(Zone::Inside, 2), &["m1"], interval(9, 0, 60)),
    ];
    let req = request("P3", room(Zone::Inside, 2), &["m1"], interval(9, 15, 30));

    assert_eq!(check_conflict(&req, &existing), check_conflict(&req, &existing));
}
