// libs/appointment-cell/src/services/ledger.rs
use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentError, AppointmentKey, AppointmentPatch};

/// The appointment book, kept sorted by (date, hour, minute) with at most one
/// appointment per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentLedger {
    appointments: Vec<Appointment>,
}

impl AppointmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from a loaded sequence in any order. Records that
    /// repeat an already-seen key are dropped.
    pub fn from_appointments<I>(appointments: I) -> Self
    where
        I: IntoIterator<Item = Appointment>,
    {
        let mut ledger = Self::new();
        for appointment in appointments {
            if let Err(e) = ledger.insert(appointment) {
                warn!("Dropping loaded appointment: {}", e);
            }
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Appointment> {
        self.appointments.iter()
    }

    /// The full ordered sequence, as handed to storage.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, key: &AppointmentKey) -> Option<&Appointment> {
        self.position(key).ok().map(|idx| &self.appointments[idx])
    }

    /// Every appointment whose patient name equals `name`, in ledger order.
    pub fn find_by_name(&self, name: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.patient_name == name)
            .collect()
    }

    /// Inserts before the first appointment with a strictly greater key.
    pub fn insert(&mut self, appointment: Appointment) -> Result<&Appointment, AppointmentError> {
        let key = appointment.key();
        let idx = match self.position(&key) {
            Ok(_) => return Err(AppointmentError::SlotOccupied(key)),
            Err(idx) => idx,
        };

        debug!("Inserting appointment {} at position {}", key, idx);
        self.appointments.insert(idx, appointment);
        Ok(&self.appointments[idx])
    }

    pub fn remove(&mut self, key: &AppointmentKey) -> Option<Appointment> {
        let idx = self.position(key).ok()?;
        Some(self.appointments.remove(idx))
    }

    /// Applies `patch` to the appointment at `key`. A reschedule moves the
    /// record through remove and insert; when the target slot is taken the
    /// original record is put back untouched.
    pub fn update(
        &mut self,
        key: &AppointmentKey,
        patch: AppointmentPatch,
    ) -> Result<&Appointment, AppointmentError> {
        let idx = self
            .position(key)
            .map_err(|_| AppointmentError::NotFound(*key))?;

        match patch {
            AppointmentPatch::IllnessNote(note) => {
                self.appointments[idx].illness_note = note;
                Ok(&self.appointments[idx])
            }
            AppointmentPatch::Reschedule { date, slot } => {
                let target = AppointmentKey::new(date, slot);
                if target == *key {
                    return Ok(&self.appointments[idx]);
                }
                if self.position(&target).is_ok() {
                    return Err(AppointmentError::SlotOccupied(target));
                }

                let mut moved = self.appointments.remove(idx);
                moved.date = date;
                moved.slot = slot;
                self.insert(moved)
            }
        }
    }

    fn position(&self, key: &AppointmentKey) -> Result<usize, usize> {
        self.appointments.binary_search_by(|a| a.key().cmp(key))
    }
}

impl<'a> IntoIterator for &'a AppointmentLedger {
    type Item = &'a Appointment;
    type IntoIter = std::slice::Iter<'a, Appointment>;

    fn into_iter(self) -> Self::IntoIter {
        self.appointments.iter()
    }
}
