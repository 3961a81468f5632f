//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso da altri programmi.
//!
//! ## Responsabilità:
//! - Emette un messaggio JSON per riga su stdout (`--json`)
//! - Riusa `FileOutcome` e `StripStats` così il formato segue il codice
//!
//! ## Tipi di messaggi:
//! - `start`: inizio esecuzione, directory e file trovati
//! - `file_complete`: esito di un singolo file
//! - `complete`: fine esecuzione con le statistiche finali

use crate::config::{Config, RenameMode};
use crate::stats::StripStats;
use crate::stripper::FileOutcome;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio dell'esecuzione
    Start {
        directory: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Fine elaborazione di un file
    FileComplete { path: PathBuf, outcome: FileOutcome },

    /// Esecuzione completata
    Complete {
        stats: StripStats,
        duration_seconds: f64,
    },
}

/// Configurazione riportata nel messaggio `start`
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub dry_run: bool,
    pub audio_languages: BTreeSet<String>,
    pub subtitle_languages: BTreeSet<String>,
    pub rename: RenameMode,
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            dry_run: config.dry_run,
            audio_languages: config.audio_languages.clone(),
            subtitle_languages: config.subtitle_languages.clone(),
            rename: config.rename,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_complete_shape() {
        let message = JsonMessage::FileComplete {
            path: PathBuf::from("/m/a.mkv"),
            outcome: FileOutcome::Skipped {
                reason: "no matching audio".to_string(),
            },
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["path"], "/m/a.mkv");
        assert_eq!(value["outcome"]["status"], "skipped");
        assert_eq!(value["outcome"]["reason"], "no matching audio");
    }

    #[test]
    fn test_complete_message() {
        let mut stats = StripStats::new(3);
        stats.add_remuxed();
        let message = JsonMessage::Complete {
            stats,
            duration_seconds: 1.5,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["stats"]["files_found"], 3);
        assert_eq!(value["stats"]["files_remuxed"], 1);
        assert_eq!(value["duration_seconds"], 1.5);
    }

    #[test]
    fn test_start_config() {
        let config = Config::default();
        let message = JsonMessage::Start {
            directory: PathBuf::from("/m"),
            total_files: 0,
            config: JsonConfig::from(&config),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["config"]["rename"], "none");
        assert_eq!(value["config"]["audio_languages"][0], "eng");
    }
}
