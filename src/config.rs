//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

/// Runtime configuration for `entity-store-server`.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Deadline for every key-value backend call.
    pub kv_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: "0.0.0.0:3000".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            kv_timeout: Duration::from_millis(2000),
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Config {
            bind_address: lookup("ENTITY_STORE_BIND").unwrap_or(defaults.bind_address),
            log_level: lookup("ENTITY_STORE_LOG").unwrap_or(defaults.log_level),
            log_json: lookup("ENTITY_STORE_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.log_json),
            kv_timeout: lookup("ENTITY_STORE_KV_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.kv_timeout),
        }
    }
}
