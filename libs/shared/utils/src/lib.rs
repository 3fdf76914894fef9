pub mod obfuscation;

pub use obfuscation::{DisplayObfuscation, ObfuscationError};
