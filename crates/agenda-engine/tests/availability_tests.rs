//! Tests for slot, room and machine availability tables.

use std::collections::BTreeSet;

use agenda_engine::availability::{MachineAvailability, RoomAvailability};
use agenda_engine::{
    available_machines, available_rooms, available_slots, AgendaError, Appointment, AppointmentId,
    MachineId, ProfessionalId, RoomKey, TimeInterval, Zone,
};
use chrono::{DateTime, TimeZone, Utc};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
}

fn appointment(
    id: &str,
    professional: &str,
    zone: Zone,
    camilla: u32,
    machines: &[&str],
    start: DateTime<Utc>,
    duration: u32,
) -> Appointment {
    Appointment {
        id: AppointmentId::new(id),
        professional: ProfessionalId::new(professional),
        room: RoomKey::new(zone, camilla).unwrap(),
        machines: machines
            .iter()
            .map(|m| MachineId::new(*m))
            .collect::<BTreeSet<_>>(),
        interval: TimeInterval::new(start, duration).unwrap(),
    }
}

/// Half-hour candidates from 09:00 to 11:30.
fn morning_slots() -> Vec<DateTime<Utc>> {
    vec![at(9, 0), at(9, 30), at(10, 0), at(10, 30), at(11, 0), at(11, 30)]
}

// ── available_slots ─────────────────────────────────────────────────────────

#[test]
fn no_appointments_every_slot_free() {
    let slots = available_slots(&ProfessionalId::new("1"), 60, &morning_slots(), &[]).unwrap();

    assert_eq!(slots.len(), 6);
    assert!(slots.iter().all(|s| s.available));
    let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
    assert_eq!(starts, morning_slots());
}

#[test]
fn busy_professional_blocks_overlapping_slots() {
    // Professional 1 busy 10:00-11:00. A 60-minute session can't start at
    // 09:30, 10:00 or 10:30; 09:00 ends exactly at 10:00 and 11:00 starts at 11:00.
    let existing = vec![appointment("a1", "1", Zone::Inside, 1, &[], at(10, 0), 60)];

    let slots =
        available_slots(&ProfessionalId::new("1"), 60, &morning_slots(), &existing).unwrap();

    let flags: Vec<bool> = slots.iter().map(|s| s.available).collect();
    assert_eq!(flags, vec![true, false, false, false, true, true]);
}

#[test]
fn other_professionals_and_rooms_are_ignored() {
    // Professional 2 occupies every resource; professional 1 is still free.
    let existing = vec![appointment(
        "a1",
        "2",
        Zone::Inside,
        1,
        &["m1"],
        at(9, 0),
        180,
    )];

    let slots =
        available_slots(&ProfessionalId::new("1"), 30, &morning_slots(), &existing).unwrap();

    assert!(slots.iter().all(|s| s.available));
}

#[test]
fn zero_duration_slots_rejected() {
    let err = available_slots(&ProfessionalId::new("1"), 0, &morning_slots(), &[]).unwrap_err();
    assert!(matches!(err, AgendaError::InvalidRequest(_)));

    let err = available_slots(&ProfessionalId::new("1"), 0, &[], &[]).unwrap_err();
    assert!(matches!(err, AgendaError::InvalidRequest(_)));
}

#[test]
fn slot_order_follows_input_order() {
    let shuffled = vec![at(11, 0), at(9, 0), at(10, 0)];
    let existing = vec![appointment("a1", "1", Zone::Inside, 1, &[], at(9, 0), 30)];

    let slots = available_slots(&ProfessionalId::new("1"), 30, &shuffled, &existing).unwrap();

    assert_eq!(slots[0].start, at(11, 0));
    assert!(slots[0].available);
    assert_eq!(slots[1].start, at(9, 0));
    assert!(!slots[1].available);
    assert_eq!(slots[2].start, at(10, 0));
    assert!(slots[2].available);
}

#[test]
fn slots_idempotent() {
    let existing = vec![
        appointment("a1", "1", Zone::Inside, 1, &[], at(9, 0), 60),
        appointment("a2", "1", Zone::Outside, 2, &[], at(11, 0), 30),
    ];
    let pro = ProfessionalId::new("1");

    let first = available_slots(&pro, 30, &morning_slots(), &existing).unwrap();
    let second = available_slots(&pro, 30, &morning_slots(), &existing).unwrap();

    assert_eq!(first, second);
}

// ── available_rooms ─────────────────────────────────────────────────────────

#[test]
fn rooms_listed_ascending_with_occupancy() {
    let existing = vec![
        appointment("a1", "1", Zone::Inside, 2, &[], at(10, 0), 60),
        appointment("a2", "2", Zone::Inside, 4, &[], at(9, 0), 60),
    ];

    let rooms = available_rooms(Zone::Inside, 4, at(10, 30), 30, &existing).unwrap();

    assert_eq!(
        rooms,
        vec![
            RoomAvailability { number: 1, available: true },
            RoomAvailability { number: 2, available: false },
            RoomAvailability { number: 3, available: true },
            // a2 ends at 10:00, before the 10:30 slot.
            RoomAvailability { number: 4, available: true },
        ]
    );
}

#[test]
fn rooms_in_other_zone_do_not_count() {
    let existing = vec![appointment("a1", "1", Zone::Outside, 1, &[], at(10, 0), 60)];

    let rooms = available_rooms(Zone::Inside, 4, at(10, 0), 60, &existing).unwrap();

    assert!(rooms.iter().all(|r| r.available));
}

#[test]
fn room_adjacent_to_booking_is_free() {
    let existing = vec![appointment("a1", "1", Zone::Inside, 1, &[], at(9, 0), 60)];

    let rooms = available_rooms(Zone::Inside, 1, at(10, 0), 30, &existing).unwrap();

    assert!(rooms[0].available);
}

#[test]
fn zero_rooms_gives_empty_table() {
    let rooms = available_rooms(Zone::Inside, 0, at(10, 0), 30, &[]).unwrap();
    assert!(rooms.is_empty());
}

#[test]
fn zero_duration_rooms_rejected() {
    assert!(available_rooms(Zone::Inside, 4, at(10, 0), 0, &[]).is_err());
}

// ── available_machines ──────────────────────────────────────────────────────

#[test]
fn machines_marked_in_given_order() {
    let existing = vec![appointment(
        "a1",
        "2",
        Zone::Inside,
        2,
        &["m2", "m3"],
        at(10, 30),
        60,
    )];
    let machines = vec![MachineId::new("m3"), MachineId::new("m1"), MachineId::new("m2")];

    let table = available_machines(&machines, at(11, 0), 30, &existing).unwrap();

    assert_eq!(
        table,
        vec![
            MachineAvailability { machine: MachineId::new("m3"), available: false },
            MachineAvailability { machine: MachineId::new("m1"), available: true },
            MachineAvailability { machine: MachineId::new("m2"), available: false },
        ]
    );
}
