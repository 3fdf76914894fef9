// libs/appointment-cell/tests/slots_test.rs
use appointment_cell::{Appointment, AppointmentLedger, Date, SlotGrid, TimeSlot};

fn booked(date: Date, hour: u32, minute: u32) -> Appointment {
    Appointment {
        patient_name: "Patient".to_string(),
        illness_note: "note".to_string(),
        date,
        slot: TimeSlot::new(hour, minute),
    }
}

#[test]
fn test_empty_ledger_offers_every_default_slot() {
    let grid = SlotGrid::default();
    let ledger = AppointmentLedger::new();

    let available = grid.available_slots(&ledger, &Date::new(2, 11, 2026));
    let rendered: Vec<String> = available.iter().map(|s| s.to_string()).collect();

    assert_eq!(
        rendered,
        vec![
            "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "13:00",
            "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00",
        ]
    );
}

#[test]
fn test_availability_matches_occupancy_exactly() {
    let grid = SlotGrid::default();
    let date = Date::new(2, 11, 2026);
    let other_day = Date::new(3, 11, 2026);
    let occupied = [TimeSlot::new(9, 0), TimeSlot::new(12, 30), TimeSlot::new(17, 0)];

    let mut appointments: Vec<Appointment> = occupied
        .iter()
        .map(|s| booked(date, s.hour, s.minute))
        .collect();
    appointments.push(booked(other_day, 10, 0));
    let ledger = AppointmentLedger::from_appointments(appointments);

    for slot in grid.slots() {
        assert_eq!(
            grid.is_slot_available(&ledger, &date, &slot),
            !occupied.contains(&slot),
            "slot {}",
            slot
        );
    }
    assert!(grid.is_slot_available(&ledger, &date, &TimeSlot::new(10, 0)));
    assert!(!grid.is_slot_available(&ledger, &other_day, &TimeSlot::new(10, 0)));
    assert_eq!(grid.available_slots(&ledger, &date).len(), grid.slots_per_day() - 3);
}

#[test]
fn test_off_grid_slots_are_never_available() {
    let grid = SlotGrid::default();
    let ledger = AppointmentLedger::new();
    let date = Date::new(2, 11, 2026);

    for slot in [
        TimeSlot::new(8, 30),
        TimeSlot::new(17, 30),
        TimeSlot::new(18, 0),
        TimeSlot::new(10, 15),
        TimeSlot::new(10, 99),
        TimeSlot::new(99, 0),
    ] {
        assert!(!grid.is_slot_available(&ledger, &date, &slot), "slot {}", slot);
    }
}

#[test]
fn test_fully_booked_day_has_no_slots() {
    let grid = SlotGrid::default();
    let date = Date::new(2, 11, 2026);
    let ledger = AppointmentLedger::from_appointments(
        grid.slots().into_iter().map(|s| booked(date, s.hour, s.minute)),
    );

    assert!(grid.available_slots(&ledger, &date).is_empty());
    assert_eq!(grid.available_slots(&ledger, &Date::new(3, 11, 2026)).len(), 17);
}
