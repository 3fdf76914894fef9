use thiserror::Error;

use shared_models::error::AppError;

/// Longest username or password, in bytes, that fits a stored record.
pub const MAX_CREDENTIAL_LEN: usize = 49;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Username {0} already exists. Please choose a different username.")]
    UsernameTaken(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials => AppError::Auth(message),
            AuthError::UsernameTaken(_) => AppError::Conflict(message),
            AuthError::PasswordMismatch | AuthError::InvalidInput(_) => {
                AppError::ValidationError(message)
            }
            AuthError::Storage(_) => AppError::Database(message),
        }
    }
}

/// Confirms that the password was typed the same way twice.
pub fn passwords_match(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password == confirmation {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}
