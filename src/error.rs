//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `StripError` enum per categorizzare tutti gli errori possibili
//! - Distingue errori per-file (recuperabili) da errori di configurazione (fatali)
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Identify` / `Remux`: mkvmerge terminato con exit code non zero
//! - `Timeout`: mkvmerge non ha terminato entro il timeout configurato
//! - `NoMatchingAudio`: nessuna traccia audio nelle lingue richieste
//! - `InvalidFileName`: nome file non compatibile con il rename del titolo
//! - `Timestamp` / `Replace`: errori durante la sostituzione del file originale
//! - `MissingDependency`: mkvmerge non trovato
//! - `Config`: configurazione non valida
//! - `Io`: errori di I/O generici
//!
//! ## Esempio:
//! ```rust,ignore
//! if retained.audio.is_empty() {
//!     return Err(StripError::NoMatchingAudio(path.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for track stripping
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to identify {path}: {output}")]
    Identify { path: PathBuf, output: String },

    #[error("Remux of {path} failed: {command}\n{output}")]
    Remux {
        path: PathBuf,
        command: String,
        output: String,
    },

    #[error("{tool} did not finish within {secs}s for {path}")]
    Timeout {
        tool: String,
        secs: u64,
        path: PathBuf,
    },

    #[error("No audio tracks matching specified language(s) for {0}")]
    NoMatchingAudio(PathBuf),

    #[error("File name does not match the expected container extension: {0}")]
    InvalidFileName(PathBuf),

    #[error("Failed to preserve timestamp of {path}: {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Renaming of {from} to {to} failed: {source}")]
    Replace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StripError {
    /// Whether the error only affects the current file.
    ///
    /// Configuration and dependency errors abort the whole run; everything
    /// else is logged and the next file is processed.
    pub fn is_per_file(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::MissingDependency(_))
    }
}

pub type Result<T> = std::result::Result<T, StripError>;
