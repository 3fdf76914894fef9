use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Field {field} is {len} bytes, at most {max} fit in a record")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Field {field} contains a NUL byte")]
    FieldContainsNul { field: &'static str },

    #[error("Record {index} is corrupt: {reason}")]
    CorruptRecord { index: usize, reason: String },
}
