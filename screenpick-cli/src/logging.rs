// ============================================================================
// screenpick-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Logger Setup and Helper Functions
//
// The application logs through the standard `log` crate with `env_logger` as
// the backend. Log lines go to stderr so that stdout carries only the
// selection report.
//
// USAGE:
// - default: info
// - --verbose: debug
// - RUST_LOG=...: overrides both (e.g. RUST_LOG=screenpick_core=trace)

use env_logger::Env;

/// Installs env_logger with `info` (or `debug` when verbose) as the default filter.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // try_init: tests may call this more than once per process
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_target(verbose)
        .try_init();
}

/// Returns the current local time formatted as RFC 3339 with seconds precision.
pub fn get_timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
