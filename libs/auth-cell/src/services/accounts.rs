use std::path::PathBuf;

use shared_config::AppConfig;
use shared_database::{RecordFile, StorageError};
use shared_models::auth::{Role, Session, User};
use tracing::{debug, error, info, warn};

use crate::models::{AuthError, MAX_CREDENTIAL_LEN};
use crate::services::storage::UserRecordCodec;

/// Registered accounts, persisted in registration order after every change.
pub struct AccountStore {
    users: Vec<User>,
    file: RecordFile<UserRecordCodec>,
}

impl AccountStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let file = RecordFile::new(path, UserRecordCodec);
        let users = file.load_all().map_err(storage_error)?;
        debug!("Loaded {} user accounts", users.len());

        Ok(Self { users, file })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        Self::load(config.users_path())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Creates the bootstrap administrator when no account exists yet.
    /// Returns whether an account was created.
    pub fn ensure_admin(&mut self, username: &str, password: &str) -> Result<bool, AuthError> {
        if !self.users.is_empty() {
            return Ok(false);
        }

        self.register(username, password, Role::Admin)?;
        info!("No users found, created administrator account {}", username);
        Ok(true)
    }

    pub fn register(&mut self, username: &str, password: &str, role: Role) -> Result<Session, AuthError> {
        debug!("Registering {} account {}", role, username);

        validate_username(username)?;
        validate_password(password)?;
        if self.find(username).is_some() {
            warn!("Rejected sign-up for existing username {}", username);
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let user = User {
            username: username.to_string(),
            password: password.to_string(),
            role,
        };
        let session = Session::from(&user);
        self.users.push(user);

        if let Err(e) = self.file.save_all(&self.users) {
            error!("Failed to persist user accounts: {}", e);
            self.users.pop();
            return Err(storage_error(e));
        }

        info!("User account {} created", username);
        Ok(session)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        match self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
        {
            Some(user) => {
                info!("User {} signed in", username);
                Ok(Session::from(user))
            }
            None => {
                warn!("Failed sign-in attempt for {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidInput("username must not be empty".to_string()));
    }
    if username.chars().any(|c| c.is_whitespace() || c == '\0') {
        return Err(AuthError::InvalidInput(
            "username must not contain spaces".to_string(),
        ));
    }
    if username.len() > MAX_CREDENTIAL_LEN {
        return Err(AuthError::InvalidInput(format!(
            "username must be at most {} bytes",
            MAX_CREDENTIAL_LEN
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password must not be empty".to_string()));
    }
    if password.contains('\0') {
        return Err(AuthError::InvalidInput(
            "password must not contain NUL characters".to_string(),
        ));
    }
    if password.len() > MAX_CREDENTIAL_LEN {
        return Err(AuthError::InvalidInput(format!(
            "password must be at most {} bytes",
            MAX_CREDENTIAL_LEN
        )));
    }
    Ok(())
}

fn storage_error(e: StorageError) -> AuthError {
    AuthError::Storage(e.to_string())
}
