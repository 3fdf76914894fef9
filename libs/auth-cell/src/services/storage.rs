use shared_database::codec::{get_i32, get_text, put_i32, put_text};
use shared_database::{RecordCodec, StorageError};
use shared_models::auth::{Role, User};

const TEXT_WIDTH: usize = 50;
const USERNAME_OFFSET: usize = 0;
const PASSWORD_OFFSET: usize = USERNAME_OFFSET + TEXT_WIDTH;
const ADMIN_FLAG_OFFSET: usize = PASSWORD_OFFSET + TEXT_WIDTH;

/// 104-byte user record: username and password (50 bytes each, NUL padded)
/// and an integer admin flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRecordCodec;

impl RecordCodec for UserRecordCodec {
    type Item = User;

    const RECORD_SIZE: usize = ADMIN_FLAG_OFFSET + 4;

    fn encode(&self, item: &User, buf: &mut [u8]) -> Result<(), StorageError> {
        put_text(buf, USERNAME_OFFSET, TEXT_WIDTH, "username", item.username.as_bytes())?;
        put_text(buf, PASSWORD_OFFSET, TEXT_WIDTH, "password", item.password.as_bytes())?;
        put_i32(buf, ADMIN_FLAG_OFFSET, i32::from(item.role.is_admin()));
        Ok(())
    }

    fn decode(&self, buf: &[u8]) -> Result<User, StorageError> {
        let text = |offset: usize, field: &str| {
            String::from_utf8(get_text(buf, offset, TEXT_WIDTH).to_vec()).map_err(|_| {
                StorageError::CorruptRecord {
                    index: 0,
                    reason: format!("{} is not valid UTF-8", field),
                }
            })
        };

        let role = if get_i32(buf, ADMIN_FLAG_OFFSET) != 0 {
            Role::Admin
        } else {
            Role::Patient
        };

        Ok(User {
            username: text(USERNAME_OFFSET, "username")?,
            password: text(PASSWORD_OFFSET, "password")?,
            role,
        })
    }
}
