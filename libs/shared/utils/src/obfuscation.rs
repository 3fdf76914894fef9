//! Reversible byte shift applied to free-text fields before they are written
//! to disk. This only keeps names and notes from being readable at a glance
//! in the data file; it offers no confidentiality.

use shared_config::{AppConfig, MAX_OBFUSCATION_SHIFT};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ObfuscationError {
    #[error("Stored text is not valid UTF-8 after reversing the shift")]
    InvalidText,

    #[error("Obfuscation shift {0} can turn stored text into NUL bytes (at most {max} is allowed)", max = MAX_OBFUSCATION_SHIFT)]
    UnsafeShift(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayObfuscation {
    shift: u8,
}

impl Default for DisplayObfuscation {
    fn default() -> Self {
        Self {
            shift: shared_config::DEFAULT_OBFUSCATION_SHIFT,
        }
    }
}

impl DisplayObfuscation {
    /// Rejects shifts that could map a byte of valid text to NUL, which would
    /// collide with the record padding.
    pub fn new(shift: u8) -> Result<Self, ObfuscationError> {
        if shift > MAX_OBFUSCATION_SHIFT {
            return Err(ObfuscationError::UnsafeShift(shift));
        }
        Ok(Self { shift })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ObfuscationError> {
        Self::new(config.obfuscation_shift)
    }

    /// Shifts every UTF-8 byte of `text` forward, wrapping at 255.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.bytes().map(|b| b.wrapping_add(self.shift)).collect()
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, ObfuscationError> {
        let plain: Vec<u8> = bytes.iter().map(|b| b.wrapping_sub(self.shift)).collect();
        String::from_utf8(plain).map_err(|_| ObfuscationError::InvalidText)
    }
}
