pub mod codec;
pub mod error;
pub mod flatfile;

pub use codec::RecordCodec;
pub use error::StorageError;
pub use flatfile::RecordFile;
