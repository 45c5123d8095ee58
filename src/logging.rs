use crate::config::LogLevel;

/// Install an `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` still overrides the given level for individual modules. Calling this more than
/// once is harmless; only the first call installs a logger.
pub fn init(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("logger already initialized, keeping existing one");
    }
}

/// Logger setup for unit tests; output is captured by the test harness.
#[cfg(test)]
pub(crate) fn init_for_tests() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
