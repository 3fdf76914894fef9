// libs/appointment-cell/src/models.rs
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use shared_models::error::AppError;

use crate::services::calendar;

/// Longest name or illness note, in bytes, that fits a stored record.
pub const MAX_TEXT_LEN: usize = 49;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A calendar date as entered. Nothing about it is checked on construction;
/// run it through [`calendar::validate_date`] before booking against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Date {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl Date {
    pub fn new(day: u32, month: u32, year: i32) -> Self {
        Self { day, month, year }
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }
    }

    /// `None` when the date does not exist in the calendar.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.to_naive().map(|d| d.weekday())
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Self) -> Ordering {
        calendar::compare(self, other)
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

/// Start of a bookable interval within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub hour: u32,
    pub minute: u32,
}

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Identity of an appointment in the ledger. Field order gives the
/// chronological ordering: date first, then time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppointmentKey {
    pub date: Date,
    pub slot: TimeSlot,
}

impl AppointmentKey {
    pub fn new(date: Date, slot: TimeSlot) -> Self {
        Self { date, slot }
    }
}

impl fmt::Display for AppointmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.date, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub patient_name: String,
    pub illness_note: String,
    pub date: Date,
    pub slot: TimeSlot,
}

impl Appointment {
    pub fn key(&self) -> AppointmentKey {
        AppointmentKey::new(self.date, self.slot)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_name: String,
    pub illness_note: String,
    pub date: Date,
    pub slot: TimeSlot,
}

impl From<BookAppointmentRequest> for Appointment {
    fn from(request: BookAppointmentRequest) -> Self {
        Self {
            patient_name: request.patient_name,
            illness_note: request.illness_note,
            date: request.date,
            slot: request.slot,
        }
    }
}

/// The two kinds of change a patient may make to an existing booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentPatch {
    Reschedule { date: Date, slot: TimeSlot },
    IllnessNote(String),
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateValidationError {
    #[error("Invalid month {0}. Please enter a month between 1 and 12.")]
    InvalidMonth(u32),

    #[error("Invalid day {day} for month {month} of {year}.")]
    InvalidDay { day: u32, month: u32, year: i32 },

    #[error("Cannot book appointments for past dates ({0}).")]
    InPast(Date),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("No appointment found on {0}")]
    NotFound(AppointmentKey),

    #[error("The slot on {0} is already booked")]
    SlotOccupied(AppointmentKey),

    #[error("{0} is not a bookable slot")]
    InvalidSlot(TimeSlot),

    #[error("{0}")]
    InvalidDate(#[from] DateValidationError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid scheduling configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::NotFound(_) => AppError::NotFound(message),
            AppointmentError::SlotOccupied(_) => AppError::Conflict(message),
            AppointmentError::InvalidSlot(_)
            | AppointmentError::InvalidDate(_)
            | AppointmentError::ValidationError(_) => AppError::ValidationError(message),
            AppointmentError::InvalidConfiguration(_) => AppError::Internal(message),
            AppointmentError::Storage(_) => AppError::Database(message),
        }
    }
}
