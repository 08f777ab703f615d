//! Logger setup for hosts that do not install their own.

use crate::config::LogLevel;

/// Install `env_logger` filtered at `level`.
///
/// `RUST_LOG` still overrides the configured level. Calling this more than
/// once, or after another logger was installed, only logs a warning.
pub fn init(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if let Err(e) = result {
        log::warn!("Logger already initialized: {}", e);
    }
}
