//! Rotating log system
//!
//! Logs to both console and rotating files in the configured directory.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize console + daily rotating file logs.
///
/// Keep the returned guard alive for as long as file logging should flush.
pub fn init_logging(log_dir: &str) -> anyhow::Result<WorkerGuard> {
    let log_path = Path::new(log_dir);
    if !log_path.exists() {
        std::fs::create_dir_all(log_path)?;
    }

    // Rotates daily: spiral_shapes.log.YYYY-MM-DD
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "spiral_shapes.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Default to INFO, overridable with RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spiral_shapes=debug,eframe=warn,egui=warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!("Logging initialized. Log directory: {}", log_dir);
    Ok(guard)
}

/// Log an error with context
#[macro_export]
macro_rules! log_error {
    ($msg:expr) => {
        tracing::error!(error = %$msg, "Error occurred");
    };
    ($msg:expr, $($field:tt)*) => {
        tracing::error!(error = %$msg, $($field)*, "Error occurred");
    };
}
