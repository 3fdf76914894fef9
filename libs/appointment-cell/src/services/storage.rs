// libs/appointment-cell/src/services/storage.rs
use std::path::PathBuf;

use shared_config::AppConfig;
use shared_database::codec::{get_i32, get_text, put_i32, put_text};
use shared_database::{RecordCodec, RecordFile, StorageError};
use shared_utils::DisplayObfuscation;

use crate::models::{Appointment, AppointmentError, Date, TimeSlot};

const TEXT_WIDTH: usize = 50;
const NAME_OFFSET: usize = 0;
const ILLNESS_OFFSET: usize = NAME_OFFSET + TEXT_WIDTH;
const HOUR_OFFSET: usize = ILLNESS_OFFSET + TEXT_WIDTH;
const MINUTE_OFFSET: usize = HOUR_OFFSET + 4;
const DAY_OFFSET: usize = MINUTE_OFFSET + 4;
const MONTH_OFFSET: usize = DAY_OFFSET + 4;
const YEAR_OFFSET: usize = MONTH_OFFSET + 4;

/// Load and persist the whole appointment book at once.
#[cfg_attr(test, mockall::automock)]
pub trait AppointmentStore {
    fn load_all(&self) -> Result<Vec<Appointment>, StorageError>;

    fn save_all(&self, appointments: &[Appointment]) -> Result<(), StorageError>;
}

/// 120-byte appointment record: obfuscated name and illness note (50 bytes
/// each, NUL padded) followed by hour, minute, day, month and year.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentRecordCodec {
    obfuscation: DisplayObfuscation,
}

impl AppointmentRecordCodec {
    pub fn new(obfuscation: DisplayObfuscation) -> Self {
        Self { obfuscation }
    }

    fn decode_text(&self, buf: &[u8], offset: usize, field: &str) -> Result<String, StorageError> {
        self.obfuscation
            .decode(get_text(buf, offset, TEXT_WIDTH))
            .map_err(|e| corrupt(format!("{}: {}", field, e)))
    }
}

impl RecordCodec for AppointmentRecordCodec {
    type Item = Appointment;

    const RECORD_SIZE: usize = YEAR_OFFSET + 4;

    fn encode(&self, item: &Appointment, buf: &mut [u8]) -> Result<(), StorageError> {
        put_text(
            buf,
            NAME_OFFSET,
            TEXT_WIDTH,
            "name",
            &self.obfuscation.encode(&item.patient_name),
        )?;
        put_text(
            buf,
            ILLNESS_OFFSET,
            TEXT_WIDTH,
            "illness",
            &self.obfuscation.encode(&item.illness_note),
        )?;
        put_i32(buf, HOUR_OFFSET, to_stored("hour", item.slot.hour)?);
        put_i32(buf, MINUTE_OFFSET, to_stored("minute", item.slot.minute)?);
        put_i32(buf, DAY_OFFSET, to_stored("day", item.date.day)?);
        put_i32(buf, MONTH_OFFSET, to_stored("month", item.date.month)?);
        put_i32(buf, YEAR_OFFSET, item.date.year);
        Ok(())
    }

    fn decode(&self, buf: &[u8]) -> Result<Appointment, StorageError> {
        Ok(Appointment {
            patient_name: self.decode_text(buf, NAME_OFFSET, "name")?,
            illness_note: self.decode_text(buf, ILLNESS_OFFSET, "illness")?,
            date: Date::new(
                from_stored("day", get_i32(buf, DAY_OFFSET))?,
                from_stored("month", get_i32(buf, MONTH_OFFSET))?,
                get_i32(buf, YEAR_OFFSET),
            ),
            slot: TimeSlot::new(
                from_stored("hour", get_i32(buf, HOUR_OFFSET))?,
                from_stored("minute", get_i32(buf, MINUTE_OFFSET))?,
            ),
        })
    }
}

fn corrupt(reason: String) -> StorageError {
    StorageError::CorruptRecord { index: 0, reason }
}

fn to_stored(field: &str, value: u32) -> Result<i32, StorageError> {
    i32::try_from(value).map_err(|_| corrupt(format!("{} {} does not fit a record", field, value)))
}

fn from_stored(field: &str, value: i32) -> Result<u32, StorageError> {
    u32::try_from(value).map_err(|_| corrupt(format!("negative {} {}", field, value)))
}

/// Appointment book kept in a flat record file.
pub struct FileAppointmentStore {
    file: RecordFile<AppointmentRecordCodec>,
}

impl FileAppointmentStore {
    pub fn new(path: impl Into<PathBuf>, obfuscation: DisplayObfuscation) -> Self {
        Self {
            file: RecordFile::new(path, AppointmentRecordCodec::new(obfuscation)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppointmentError> {
        let obfuscation = DisplayObfuscation::from_config(config)
            .map_err(|e| AppointmentError::InvalidConfiguration(e.to_string()))?;
        Ok(Self::new(config.appointments_path(), obfuscation))
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl AppointmentStore for FileAppointmentStore {
    fn load_all(&self) -> Result<Vec<Appointment>, StorageError> {
        self.file.load_all()
    }

    fn save_all(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        self.file.save_all(appointments)
    }
}
