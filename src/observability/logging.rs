use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_DIRECTIVE: &str = "tabkit=info";

fn env_filter() -> EnvFilter {
    // RUST_LOG wins when set
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initializes the logging system with console output and, when enabled,
/// a daily-rolling JSON file under `config.dir`.
///
/// Console output goes to stderr so exported CSV on stdout stays clean.
pub fn init_logging(config: &LoggingConfig) {
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let file_layer = if config.json_file {
        if let Err(e) = fs::create_dir_all(&config.dir) {
            eprintln!("⚠️  Could not create log dir {}: {}", config.dir, e);
        }
        let file_appender = tracing_appender::rolling::daily(&config.dir, &config.file_prefix);
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        // Keep the worker alive for the process lifetime so logs flush on exit
        std::mem::forget(guard);
        Some(fmt::layer().json().with_writer(non_blocking_writer))
    } else {
        None
    };

    // A second call in the same process keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init();
}
