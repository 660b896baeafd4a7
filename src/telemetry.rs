//! Tracing subscriber setup for the server binary.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. An invalid level falls back to
/// `info` with a warning on stderr, since no subscriber exists yet to log it.
pub fn init(cfg: &Config) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: ENTITY_STORE_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
