use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

pub fn get_log_env(log_level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "pagen={log_level},pagen_itertools={log_level}"
    ))
}

/// Install the global fmt subscriber once; later calls are no-ops so tests
/// and the CLI can both request it.
pub fn init_global_logger(log_level: &str) {
    static INIT: OnceLock<()> = OnceLock::new();

    INIT.get_or_init(|| {
        let registry = Registry::default()
            .with(get_log_env(log_level))
            .with(fmt::layer());
        registry.try_init().ok();
    });
}

pub fn global_error_logger() {
    init_global_logger("ERROR")
}

pub fn global_info_logger() {
    init_global_logger("INFO")
}

pub fn global_debug_logger() {
    init_global_logger("DEBUG")
}
