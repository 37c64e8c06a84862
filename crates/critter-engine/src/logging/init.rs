use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "critter_engine=debug,wgpu_core=warn"). When unset, `RUST_LOG` is consulted,
/// then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// Target for fatal setup failures. Enabled at `error` whatever the filter
/// says, so `RUST_LOG=off` still prints why the process exited with `-1`.
pub const SETUP_TARGET: &str = "critter_setup";

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
///
/// Call early in `main`, before the window is opened.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = logger_builder(config, std::env::var("RUST_LOG").ok());

        // A test harness may already own the global logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

fn logger_builder(config: LoggingConfig, rust_log: Option<String>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    if let Some(filter) = config.env_filter.or(rust_log) {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(config.default_level);
        // wgpu is chatty at info.
        builder.filter_module("wgpu_core", log::LevelFilter::Warn);
        builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
        builder.filter_module("naga", log::LevelFilter::Warn);
    }

    builder.filter_module(SETUP_TARGET, log::LevelFilter::Error);
    builder.write_style(config.write_style);
    builder
}
