// libs/appointment-cell/src/services/booking.rs
use shared_database::StorageError;
use tracing::{debug, error, info, warn};

use crate::models::{
    Appointment, AppointmentError, AppointmentKey, AppointmentPatch, BookAppointmentRequest, Date,
    TimeSlot, MAX_TEXT_LEN,
};
use crate::services::calendar::{self, Clock};
use crate::services::ledger::AppointmentLedger;
use crate::services::slots::SlotGrid;
use crate::services::storage::AppointmentStore;

/// Booking workflow over the ledger: validates input, applies the change and
/// flushes the whole book to the store. A failed flush rolls the in-memory
/// ledger back so it never drifts from what is on disk.
pub struct AppointmentBookingService<S, C> {
    ledger: AppointmentLedger,
    grid: SlotGrid,
    store: S,
    clock: C,
}

impl<S: AppointmentStore, C: Clock> AppointmentBookingService<S, C> {
    pub fn load(store: S, clock: C, grid: SlotGrid) -> Result<Self, AppointmentError> {
        let loaded = store.load_all().map_err(storage_error)?;
        let record_count = loaded.len();
        let ledger = AppointmentLedger::from_appointments(loaded);

        if ledger.len() < record_count {
            warn!(
                "{} stored appointments shared a slot with an earlier record and were skipped",
                record_count - ledger.len()
            );
        }
        info!("Loaded {} appointments", ledger.len());

        Ok(Self {
            ledger,
            grid,
            store,
            clock,
        })
    }

    pub fn ledger(&self) -> &AppointmentLedger {
        &self.ledger
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.ledger.appointments()
    }

    /// Checks that `date` exists and is not in the past.
    pub fn validate_date(&self, date: &Date) -> Result<(), AppointmentError> {
        calendar::validate_date(date, &self.clock.today())?;
        Ok(())
    }

    pub fn is_slot_available(&self, date: &Date, slot: &TimeSlot) -> bool {
        self.grid.is_slot_available(&self.ledger, date, slot)
    }

    pub fn available_slots(&self, date: &Date) -> Result<Vec<TimeSlot>, AppointmentError> {
        self.validate_date(date)?;
        Ok(self.grid.available_slots(&self.ledger, date))
    }

    pub fn search_by_name(&self, name: &str) -> Vec<&Appointment> {
        debug!("Searching appointments by patient name");
        self.ledger.find_by_name(name)
    }

    pub fn book(&mut self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment on {} at {}", request.date, request.slot);

        validate_text("Name", &request.patient_name)?;
        validate_text("Illness", &request.illness_note)?;
        self.validate_date(&request.date)?;
        self.ensure_on_grid(&request.slot)?;

        let booked = self.commit(|ledger| ledger.insert(request.into()).cloned())?;
        info!("Appointment booked for {}", booked.key());
        Ok(booked)
    }

    pub fn cancel(&mut self, key: &AppointmentKey) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment {}", key);

        let removed = self.commit(|ledger| {
            ledger
                .remove(key)
                .ok_or(AppointmentError::NotFound(*key))
        })?;
        info!("Appointment {} cancelled", key);
        Ok(removed)
    }

    pub fn reschedule(
        &mut self,
        key: &AppointmentKey,
        date: Date,
        slot: TimeSlot,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Rescheduling appointment {} to {} at {}", key, date, slot);

        if self.ledger.get(key).is_none() {
            return Err(AppointmentError::NotFound(*key));
        }
        self.validate_date(&date)?;
        self.ensure_on_grid(&slot)?;

        let moved = self.commit(|ledger| {
            ledger
                .update(key, AppointmentPatch::Reschedule { date, slot })
                .cloned()
        })?;
        info!("Appointment {} moved to {}", key, moved.key());
        Ok(moved)
    }

    pub fn update_illness(
        &mut self,
        key: &AppointmentKey,
        illness_note: String,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating illness details of appointment {}", key);

        validate_text("Illness", &illness_note)?;
        let updated = self.commit(|ledger| {
            ledger
                .update(key, AppointmentPatch::IllnessNote(illness_note))
                .cloned()
        })?;
        info!("Illness details of appointment {} updated", key);
        Ok(updated)
    }

    fn ensure_on_grid(&self, slot: &TimeSlot) -> Result<(), AppointmentError> {
        if self.grid.contains(slot) {
            Ok(())
        } else {
            warn!("Rejected off-grid slot {}", slot);
            Err(AppointmentError::InvalidSlot(*slot))
        }
    }

    fn commit<T, F>(&mut self, change: F) -> Result<T, AppointmentError>
    where
        F: FnOnce(&mut AppointmentLedger) -> Result<T, AppointmentError>,
    {
        let snapshot = self.ledger.clone();

        let outcome = change(&mut self.ledger).map_err(|e| {
            warn!("Appointment change rejected: {}", e);
            e
        })?;

        if let Err(e) = self.store.save_all(self.ledger.appointments()) {
            error!("Failed to persist appointments, reverting change: {}", e);
            self.ledger = snapshot;
            return Err(storage_error(e));
        }

        Ok(outcome)
    }
}

/// Name and illness text must be non-empty, free of NUL and fit a record field.
pub fn validate_text(field: &str, value: &str) -> Result<(), AppointmentError> {
    if value.trim().is_empty() {
        return Err(AppointmentError::ValidationError(format!("{} must not be empty", field)));
    }
    if value.len() > MAX_TEXT_LEN {
        return Err(AppointmentError::ValidationError(format!(
            "{} must be at most {} bytes",
            field, MAX_TEXT_LEN
        )));
    }
    if value.contains('\0') {
        return Err(AppointmentError::ValidationError(format!(
            "{} must not contain NUL characters",
            field
        )));
    }
    Ok(())
}

fn storage_error(e: StorageError) -> AppointmentError {
    AppointmentError::Storage(e.to_string())
}
