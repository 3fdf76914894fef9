pub mod accounts;
pub mod storage;

pub use accounts::AccountStore;
pub use storage::UserRecordCodec;
