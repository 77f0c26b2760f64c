//! Logging setup for programs embedding the scaler.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::Result;
use crate::setting::{ScalerSetting, LOG_CONSOLE, LOG_FILE, LOG_JSON, LOG_LEVEL};

/// Log level constants (compatible with Python logging module)
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;
pub const CRITICAL: i32 = 50;

/// Convert integer log level to tracing Level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=10 => Level::DEBUG,
        11..=20 => Level::INFO,
        21..=30 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Install the global tracing subscriber described by `setting`.
///
/// `RUST_LOG` directives are honoured on top of `log.level`. An empty
/// `log.file` disables the file layer. Calling this more than once keeps
/// the first subscriber.
pub fn init_logger(setting: &ScalerSetting) -> Result<()> {
    let log_level = setting.get_int(LOG_LEVEL).unwrap_or(INFO as i64) as i32;
    let log_console = setting.get_bool(LOG_CONSOLE).unwrap_or(true);
    let log_json = setting.get_bool(LOG_JSON).unwrap_or(false);
    let log_file = setting
        .get_string(LOG_FILE)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from);

    let filter = EnvFilter::from_default_env().add_directive(level_from_int(log_level).into());

    let console_layer = log_console.then(|| {
        if log_json {
            fmt::layer().json().with_target(true).boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(true)
                .boxed()
        }
    });

    let file_layer = match log_file {
        Some(log_path) => {
            if let Some(parent) = log_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    // A subscriber may already be installed by the host program.
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        tracing::debug!(error = %e, "tracing subscriber already installed, log settings ignored");
    }

    Ok(())
}

/// Named logger that tags every event with its name.
#[derive(Debug, Clone)]
pub struct Logger {
    pub name: String,
}

impl Logger {
    /// Create a new logger with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Log a debug message
    pub fn debug(&self, msg: &str) {
        tracing::debug!(logger = %self.name, "{}", msg);
    }

    /// Log an info message
    pub fn info(&self, msg: &str) {
        tracing::info!(logger = %self.name, "{}", msg);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("ExpandingScaler")
    }
}
