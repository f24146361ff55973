//! Logging and tracing initialization.
//!
//! Logs go to stderr so command output on stdout stays clean. The configured
//! level applies to clipshape's own crates; everything else is held at
//! `warn`. `RUST_LOG`, when set, replaces the whole filter.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

const OWN_CRATES: &[&str] = &[
    "clipshape_common",
    "clipshape_media_model",
    "clipshape_render_engine",
    "clipshape",
];

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Filter directives for a configured level.
///
/// Unknown levels fall back to `info`.
pub fn directives_for(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    let level = if LEVELS.contains(&level.as_str()) {
        level
    } else {
        "info".to_string()
    };
    std::iter::once("warn".to_string())
        .chain(OWN_CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives_for(&config.level)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        let subscriber = builder
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
    installed
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() -> bool {
    init_logging(&LoggingConfig::default())
}
