// libs/appointment-cell/src/services/calendar.rs
use std::cmp::Ordering;

use chrono::Local;

use crate::models::{Date, DateValidationError};

/// Source of "today" for date validation.
pub trait Clock {
    fn today(&self) -> Date;
}

/// Reads the local system date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Date::from_naive(Local::now().date_naive())
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> Date {
        (**self).today()
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, or `None` for a month outside 1..=12.
pub fn days_in_month(month: u32, year: i32) -> Option<u32> {
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return None,
    };
    Some(days)
}

/// Chronological order: year, then month, then day.
pub fn compare(a: &Date, b: &Date) -> Ordering {
    a.year
        .cmp(&b.year)
        .then(a.month.cmp(&b.month))
        .then(a.day.cmp(&b.day))
}

/// Checks that the date exists in the calendar, ignoring "today".
pub fn check_calendar(date: &Date) -> Result<(), DateValidationError> {
    let max_day =
        days_in_month(date.month, date.year).ok_or(DateValidationError::InvalidMonth(date.month))?;

    if date.day < 1 || date.day > max_day {
        return Err(DateValidationError::InvalidDay {
            day: date.day,
            month: date.month,
            year: date.year,
        });
    }

    Ok(())
}

/// A date is bookable when it exists and is not earlier than `today`.
pub fn validate_date(date: &Date, today: &Date) -> Result<(), DateValidationError> {
    check_calendar(date)?;

    if compare(date, today) == Ordering::Less {
        return Err(DateValidationError::InPast(*date));
    }

    Ok(())
}

pub fn is_valid_date(date: &Date, today: &Date) -> bool {
    validate_date(date, today).is_ok()
}
