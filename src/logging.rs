//! # Logging Setup
//!
//! Inizializzazione del sistema di logging con `tracing`.
//!
//! ## Responsabilità:
//! - Console: WARN/ERROR su stderr, il resto su stdout (tutto su stderr in modalità `--json`)
//! - File di log opzionale `log_YYYYMMDD-HHMMSS.log` scritto in modo non bloccante
//! - `LogGuard`: tenuto in vita da `main`, al drop scrive la chiusura e fa il flush del file
//!
//! Il livello è INFO, DEBUG con `--verbose`; `RUST_LOG` ha la precedenza su entrambi.

use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Keeps the log file writer alive for the duration of the run
pub struct LogGuard {
    file: Option<(PathBuf, WorkerGuard)>,
}

impl LogGuard {
    /// Path of the log file, if one was opened
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        info!("--");
        info!("Finished processing.");
    }
}

/// Name of the log file for a run started now
pub fn log_file_name() -> String {
    Local::now().format("log_%Y%m%d-%H%M%S.log").to_string()
}

/// Install the global subscriber.
///
/// `log_dir` enables the log file; the directory is created if needed.
pub fn init(verbose: bool, json_mode: bool, log_dir: Option<&Path>) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let console_stderr = json_mode.then(|| fmt::layer().with_writer(std::io::stderr));
    let console_split = (!json_mode).then(|| {
        fmt::layer().with_writer(
            std::io::stderr
                .with_max_level(Level::WARN)
                .or_else(std::io::stdout),
        )
    });

    let (file_layer, file) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let name = log_file_name();
            let stem = name.trim_end_matches(".log").to_string();
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(stem)
                .filename_suffix("log")
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some((dir.join(name), guard)))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_stderr)
        .with(console_split)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    let guard = LogGuard { file };
    if let Some(path) = guard.log_file() {
        info!("Log file opened at {}", path.display());
        info!("--");
    }
    Ok(guard)
}
