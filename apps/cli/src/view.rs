use std::fmt::Write;

use appointment_cell::{Appointment, Date, TimeSlot};

const RULE: &str = "---------------------------------------------------------------";

pub fn appointment_table<'a, I>(title: &str, appointments: I) -> String
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let mut out = String::new();
    let _ = writeln!(out, "\n===== {} =====", title);
    let _ = writeln!(out, "{:<20} {:<20} {:<12} {:<10}", "Name", "Illness", "Date", "Time");
    let _ = writeln!(out, "{}", RULE);
    for a in appointments {
        let _ = writeln!(
            out,
            "{:<20} {:<20} {}  {}",
            a.patient_name, a.illness_note, a.date, a.slot
        );
    }
    out
}

pub fn appointment_details(appointment: &Appointment) -> String {
    format!(
        "Name: {}\nIllness: {}\nDate: {}\nTime: {}",
        appointment.patient_name, appointment.illness_note, appointment.date, appointment.slot
    )
}

pub fn slot_list(date: &Date, slots: &[TimeSlot]) -> String {
    let mut out = String::new();
    match date.weekday() {
        Some(weekday) => {
            let _ = writeln!(out, "\n===== AVAILABLE SLOTS FOR {} {} =====", weekday, date);
        }
        None => {
            let _ = writeln!(out, "\n===== AVAILABLE SLOTS FOR {} =====", date);
        }
    }

    if slots.is_empty() {
        out.push_str("No available slots for this date.\n");
    }
    for slot in slots {
        let _ = writeln!(out, "{}", slot);
    }
    out
}
