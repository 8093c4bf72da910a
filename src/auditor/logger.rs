//! Logging setup for the audit binary.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::setting::Settings;
use super::utility::get_folder_path;

/// Log level constants (compatible with the settings file)
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;

/// Convert integer log level to tracing Level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=10 => Level::DEBUG,
        11..=20 => Level::INFO,
        21..=30 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Initialize the global subscriber from `log.*` settings.
///
/// `RUST_LOG` directives are honoured on top of `log.level`. A log file that
/// cannot be opened downgrades to console-only logging.
pub fn init_logger(settings: &Settings) {
    let log_level = settings.get_int("log.level").unwrap_or(INFO as i64) as i32;
    let log_console = settings.get_bool("log.console").unwrap_or(true);
    let log_file = settings.get_bool("log.file").unwrap_or(false);

    let level = level_from_int(log_level);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let console_layer = log_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .with_ansi(true)
    });

    let file = if log_file { open_log_file() } else { None };
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn open_log_file() -> Option<File> {
    let log_path = get_log_file_path();
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("cannot open log file {}: {}", log_path.display(), e);
            None
        }
    }
}

/// Get the log file path for today
fn get_log_file_path() -> PathBuf {
    let log_folder = get_folder_path("log");
    let today = Local::now().format("%Y%m%d").to_string();
    log_folder.join(format!("audit_{}.log", today))
}
