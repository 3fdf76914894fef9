pub mod booking;
pub mod calendar;
pub mod ledger;
pub mod slots;
pub mod storage;

pub use booking::{validate_text, AppointmentBookingService};
pub use calendar::{Clock, FixedClock, SystemClock};
pub use ledger::AppointmentLedger;
pub use slots::SlotGrid;
pub use storage::{AppointmentRecordCodec, AppointmentStore, FileAppointmentStore};
