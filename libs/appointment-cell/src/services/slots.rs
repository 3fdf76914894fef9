// libs/appointment-cell/src/services/slots.rs
use shared_config::AppConfig;

use crate::models::{AppointmentError, AppointmentKey, Date, TimeSlot};
use crate::services::ledger::AppointmentLedger;

/// The bookable slots of a day: every `slot_minutes` step from `open_hour:00`
/// up to and including `close_hour:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            open_hour: shared_config::DEFAULT_OPEN_HOUR,
            close_hour: shared_config::DEFAULT_CLOSE_HOUR,
            slot_minutes: shared_config::DEFAULT_SLOT_MINUTES,
        }
    }
}

impl SlotGrid {
    pub fn new(open_hour: u32, close_hour: u32, slot_minutes: u32) -> Result<Self, AppointmentError> {
        if open_hour >= close_hour || close_hour > 23 {
            return Err(AppointmentError::InvalidConfiguration(format!(
                "opening hour {} must be before closing hour {} (at most 23)",
                open_hour, close_hour
            )));
        }
        if slot_minutes == 0 || 60 % slot_minutes != 0 {
            return Err(AppointmentError::InvalidConfiguration(format!(
                "slot length of {} minutes does not divide an hour",
                slot_minutes
            )));
        }

        Ok(Self {
            open_hour,
            close_hour,
            slot_minutes,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppointmentError> {
        Self::new(config.open_hour, config.close_hour, config.slot_minutes)
    }

    pub fn open_hour(&self) -> u32 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u32 {
        self.close_hour
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// All slots of a day in ascending order.
    pub fn slots(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::with_capacity(self.slots_per_day());
        for hour in self.open_hour..=self.close_hour {
            for minute in (0..60).step_by(self.slot_minutes as usize) {
                if hour == self.close_hour && minute > 0 {
                    break;
                }
                slots.push(TimeSlot::new(hour, minute));
            }
        }
        slots
    }

    pub fn slots_per_day(&self) -> usize {
        ((self.close_hour - self.open_hour) * (60 / self.slot_minutes) + 1) as usize
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        if slot.hour < self.open_hour || slot.hour > self.close_hour {
            return false;
        }
        if slot.hour == self.close_hour {
            return slot.minute == 0;
        }
        slot.minute < 60 && slot.minute % self.slot_minutes == 0
    }

    /// True iff `slot` is on the grid and no appointment holds it on `date`.
    /// Off-grid slots are simply unavailable.
    pub fn is_slot_available(&self, ledger: &AppointmentLedger, date: &Date, slot: &TimeSlot) -> bool {
        self.contains(slot) && ledger.get(&AppointmentKey::new(*date, *slot)).is_none()
    }

    pub fn available_slots(&self, ledger: &AppointmentLedger, date: &Date) -> Vec<TimeSlot> {
        self.slots()
            .into_iter()
            .filter(|slot| self.is_slot_available(ledger, date, slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_grid_runs_nine_to_five() {
        let grid = SlotGrid::default();
        let slots = grid.slots();

        assert_eq!(slots.len(), 17);
        assert_eq!(slots.len(), grid.slots_per_day());
        assert_eq!(slots.first(), Some(&TimeSlot::new(9, 0)));
        assert_eq!(slots[1], TimeSlot::new(9, 30));
        assert_eq!(slots.last(), Some(&TimeSlot::new(17, 0)));
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_contains_boundaries() {
        let grid = SlotGrid::default();

        assert!(grid.contains(&TimeSlot::new(9, 0)));
        assert!(grid.contains(&TimeSlot::new(16, 30)));
        assert!(grid.contains(&TimeSlot::new(17, 0)));
        assert!(!grid.contains(&TimeSlot::new(17, 30)));
        assert!(!grid.contains(&TimeSlot::new(8, 30)));
        assert!(!grid.contains(&TimeSlot::new(10, 15)));
        assert!(!grid.contains(&TimeSlot::new(10, 60)));
        assert!(!grid.contains(&TimeSlot::new(24, 0)));
    }

    #[test]
    fn test_custom_grid() {
        let grid = SlotGrid::new(8, 10, 20).unwrap();
        let rendered: Vec<String> = grid.slots().iter().map(|s| s.to_string()).collect();

        assert_eq!(
            rendered,
            vec!["08:00", "08:20", "08:40", "09:00", "09:20", "09:40", "10:00"]
        );
        assert_eq!(grid.slots_per_day(), 7);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        assert_matches!(SlotGrid::new(17, 9, 30), Err(AppointmentError::InvalidConfiguration(_)));
        assert_matches!(SlotGrid::new(9, 24, 30), Err(AppointmentError::InvalidConfiguration(_)));
        assert_matches!(SlotGrid::new(9, 17, 0), Err(AppointmentError::InvalidConfiguration(_)));
        assert_matches!(SlotGrid::new(9, 17, 45), Err(AppointmentError::InvalidConfiguration(_)));
    }
}
