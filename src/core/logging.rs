//! Logging setup on top of `env_logger`
//!
//! `RUST_LOG` always overrides the default filter.
//!
//! # Example
//! ```
//! tallgrass::core::logging::init();
//! log::info!("Grass field starting");
//! ```

/// Install the logger at `info`. Later calls are no-ops.
pub fn init() {
    init_with_default("info");
}

/// Install the logger with `default_filter` (e.g. `"tallgrass=debug,info"`).
/// Returns false if a logger was already installed.
pub fn init_with_default(default_filter: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
