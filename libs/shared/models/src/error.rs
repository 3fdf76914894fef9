use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Whether the session can carry on by re-prompting the user.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// The message shown on the console, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg)
            | AppError::Database(msg)
            | AppError::ValidationError(msg)
            | AppError::Conflict(msg) => msg,
        }
    }

    pub fn log(&self) {
        if self.is_recoverable() {
            tracing::warn!("{}", self);
        } else {
            tracing::error!("{}", self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_and_internal_errors_are_not_recoverable() {
        assert!(!AppError::Database("disk full".into()).is_recoverable());
        assert!(!AppError::Internal("bug".into()).is_recoverable());
        assert!(AppError::NotFound("appointment".into()).is_recoverable());
        assert!(AppError::Conflict("slot taken".into()).is_recoverable());
    }

    #[test]
    fn test_message_strips_category() {
        let err = AppError::ValidationError("Invalid month".into());
        assert_eq!(err.message(), "Invalid month");
        assert_eq!(err.to_string(), "Validation error: Invalid month");
    }
}
