use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_OPEN_HOUR: u32 = 9;
pub const DEFAULT_CLOSE_HOUR: u32 = 17;
pub const DEFAULT_SLOT_MINUTES: u32 = 30;
pub const DEFAULT_OBFUSCATION_SHIFT: u8 = 3;
/// Largest shift that never turns a UTF-8 byte into NUL. Only bytes
/// 0xF5..=0xFF would wrap to zero, and those never occur in UTF-8.
pub const MAX_OBFUSCATION_SHIFT: u8 = 11;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub appointments_file: String,
    pub users_file: String,
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_minutes: u32,
    pub obfuscation_shift: u8,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            appointments_file: "appointments.dat".to_string(),
            users_file: "users.dat".to_string(),
            open_hour: DEFAULT_OPEN_HOUR,
            close_hour: DEFAULT_CLOSE_HOUR,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            obfuscation_shift: DEFAULT_OBFUSCATION_SHIFT,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset keys fall
    /// back to their defaults; unparsable numeric values are reported and
    /// replaced by the default as well.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut config = Self {
            data_dir: lookup("CLINIC_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            appointments_file: lookup("CLINIC_APPOINTMENTS_FILE")
                .unwrap_or(defaults.appointments_file),
            users_file: lookup("CLINIC_USERS_FILE")
                .unwrap_or(defaults.users_file),
            open_hour: parse_or_default(&lookup, "CLINIC_OPEN_HOUR", defaults.open_hour),
            close_hour: parse_or_default(&lookup, "CLINIC_CLOSE_HOUR", defaults.close_hour),
            slot_minutes: parse_or_default(&lookup, "CLINIC_SLOT_MINUTES", defaults.slot_minutes),
            obfuscation_shift: parse_or_default(
                &lookup,
                "CLINIC_OBFUSCATION_SHIFT",
                defaults.obfuscation_shift,
            ),
            admin_username: lookup("CLINIC_ADMIN_USERNAME")
                .unwrap_or(defaults.admin_username),
            admin_password: lookup("CLINIC_ADMIN_PASSWORD")
                .unwrap_or(defaults.admin_password),
        };

        if config.obfuscation_shift > MAX_OBFUSCATION_SHIFT {
            warn!(
                "CLINIC_OBFUSCATION_SHIFT {} exceeds {}, using default {}",
                config.obfuscation_shift, MAX_OBFUSCATION_SHIFT, DEFAULT_OBFUSCATION_SHIFT
            );
            config.obfuscation_shift = DEFAULT_OBFUSCATION_SHIFT;
        }

        if !config.has_valid_business_hours() {
            warn!(
                "Business hours {}:00-{}:00 with {} minute slots are not a usable grid",
                config.open_hour, config.close_hour, config.slot_minutes
            );
        }

        config
    }

    pub fn appointments_path(&self) -> PathBuf {
        self.data_dir.join(&self.appointments_file)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn has_valid_business_hours(&self) -> bool {
        self.open_hour < self.close_hour
            && self.close_hour <= 23
            && self.slot_minutes > 0
            && 60 % self.slot_minutes == 0
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.open_hour, 9);
        assert_eq!(config.close_hour, 17);
        assert_eq!(config.slot_minutes, 30);
        assert_eq!(config.obfuscation_shift, 3);
        assert_eq!(config.appointments_path(), PathBuf::from("./appointments.dat"));
        assert_eq!(config.users_path(), PathBuf::from("./users.dat"));
        assert!(config.has_valid_business_hours());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLINIC_DATA_DIR", "/var/lib/clinic"),
            ("CLINIC_OPEN_HOUR", "8"),
            ("CLINIC_CLOSE_HOUR", "12"),
            ("CLINIC_SLOT_MINUTES", "15"),
            ("CLINIC_ADMIN_USERNAME", "root"),
        ]));

        assert_eq!(config.open_hour, 8);
        assert_eq!(config.close_hour, 12);
        assert_eq!(config.slot_minutes, 15);
        assert_eq!(config.admin_username, "root");
        assert_eq!(
            config.appointments_path(),
            PathBuf::from("/var/lib/clinic/appointments.dat")
        );
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLINIC_OPEN_HOUR", "nine"),
            ("CLINIC_OBFUSCATION_SHIFT", "300"),
        ]));

        assert_eq!(config.open_hour, DEFAULT_OPEN_HOUR);
        assert_eq!(config.obfuscation_shift, DEFAULT_OBFUSCATION_SHIFT);
    }

    #[test]
    fn test_shift_that_could_produce_nul_falls_back() {
        let config = AppConfig::from_lookup(lookup_from(&[("CLINIC_OBFUSCATION_SHIFT", "128")]));
        assert_eq!(config.obfuscation_shift, DEFAULT_OBFUSCATION_SHIFT);

        let config = AppConfig::from_lookup(lookup_from(&[("CLINIC_OBFUSCATION_SHIFT", "11")]));
        assert_eq!(config.obfuscation_shift, 11);
    }

    #[test]
    fn test_business_hours_validation() {
        let mut config = AppConfig::default();
        config.slot_minutes = 25;
        assert!(!config.has_valid_business_hours());

        config.slot_minutes = 30;
        config.open_hour = 17;
        assert!(!config.has_valid_business_hours());
    }
}
