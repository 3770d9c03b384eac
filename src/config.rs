use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/historial.csv";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Hex SHA-256 of the admin password, if one was supplied.
    pub password_hash: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!("ignoring invalid PORT value {value:?}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let data_path = lookup("APP_DATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let password_hash = lookup("PASSWORD_HASH")
            .map(|hash| hash.trim().to_ascii_lowercase())
            .filter(|hash| !hash.is_empty());

        Self {
            port,
            data_path,
            password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_with(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/historial.csv"));
        assert_eq!(config.password_hash, None);
    }

    #[test]
    fn values_are_read_and_normalised() {
        let config = config_with(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/planos.csv"),
            ("PASSWORD_HASH", "  ABCDEF\n"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/planos.csv"));
        assert_eq!(config.password_hash.as_deref(), Some("abcdef"));
    }

    #[test]
    fn bad_port_and_blank_hash_fall_back() {
        let config = config_with(&[("PORT", "eighty"), ("PASSWORD_HASH", "   ")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.password_hash, None);
    }
}
