//! Environment configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                          | Default           |
//! |-----------------------------------|-------------------|
//! | `STOCKBOOK_DB_PATH`               | `./stockbook.db`  |
//! | `STOCKBOOK_MAX_CONNECTIONS`       | `5`               |
//! | `STOCKBOOK_CONNECT_TIMEOUT_SECS`  | `30`              |
//! | `STOCKBOOK_RECENT_ORDERS`         | `10`              |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use stockbook_core::DEFAULT_RECENT_ORDERS;

use crate::pool::DbConfig;

pub const DEFAULT_DB_PATH: &str = "./stockbook.db";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Reads `key`, falling back to `default` when unset.
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

impl DbConfig {
    /// Builds a config from `STOCKBOOK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var("STOCKBOOK_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let max_connections: u32 = parse_var("STOCKBOOK_MAX_CONNECTIONS", 5)?;
        let timeout_secs: u64 = parse_var("STOCKBOOK_CONNECT_TIMEOUT_SECS", 30)?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "STOCKBOOK_MAX_CONNECTIONS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(DbConfig::new(path)
            .max_connections(max_connections)
            .connect_timeout(Duration::from_secs(timeout_secs)))
    }
}

/// Reporting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    /// Orders shown on the dashboard.
    pub recent_orders: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            recent_orders: DEFAULT_RECENT_ORDERS,
        }
    }
}

impl ReportSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ReportSettings {
            recent_orders: parse_var("STOCKBOOK_RECENT_ORDERS", DEFAULT_RECENT_ORDERS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable so parallel tests don't race.

    #[test]
    fn test_parse_var_default_when_unset() {
        let value: u32 = parse_var("STOCKBOOK_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("STOCKBOOK_TEST_GARBAGE_VAR", "lots");
        let err = parse_var::<u32>("STOCKBOOK_TEST_GARBAGE_VAR", 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for STOCKBOOK_TEST_GARBAGE_VAR: 'lots'"
        );
    }

    #[test]
    fn test_parse_var_reads_value() {
        env::set_var("STOCKBOOK_TEST_SET_VAR", " 25 ");
        let value: usize = parse_var("STOCKBOOK_TEST_SET_VAR", 10).unwrap();
        assert_eq!(value, 25);
    }

    #[test]
    fn test_report_settings_default() {
        assert_eq!(ReportSettings::default().recent_orders, 10);
    }
}
