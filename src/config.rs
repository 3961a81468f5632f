//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` immutabile, costruita una sola volta all'avvio
//! - Stratifica: default → file JSON opzionale → override da command line
//! - Valida i parametri prima che qualsiasi file venga toccato
//!
//! ## Parametri di configurazione:
//! - `mkvmerge_bin`: path o nome del binario mkvmerge (default: "mkvmerge")
//! - `directory`: directory da processare ricorsivamente
//! - `log` / `log_dir`: scrittura del log anche su file
//! - `dry_run`: simula senza modificare file (default: false)
//! - `preserve_timestamp`: mantiene atime/mtime dell'originale (default: true)
//! - `audio_languages`: lingue audio da mantenere (default: eng, und)
//! - `subtitle_languages`: lingue sottotitoli da mantenere (default: eng, und, può essere vuota)
//! - `log_missing_subtitle`: warning se non resta nessun sottotitolo (default: true)
//! - `rename`: riscrittura del titolo (`none`, `tv`, `movie`)
//! - `tool_timeout_secs`: timeout per ogni invocazione di mkvmerge (default: nessuno)
//!
//! ## Validazione:
//! - Almeno una lingua audio
//! - Codici lingua di tre lettere minuscole
//! - `--rename-tv` e `--rename-movie` mutuamente esclusivi
//! - La directory deve esistere
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config::load(None).await?.with_overrides(overrides)?;
//! config.validate()?;
//! ```

use crate::error::StripError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Title rewrite mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameMode {
    /// Leave the title alone
    #[default]
    None,
    /// `<parent directory>: <file name>`
    Tv,
    /// `<file name>`
    Movie,
}

/// Configuration for track stripping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or name of the mkvmerge executable
    pub mkvmerge_bin: PathBuf,
    /// Directory to process
    pub directory: Option<PathBuf>,
    /// Log to file in addition to stdout/stderr
    pub log: bool,
    /// Directory for log files (None = platform data directory)
    pub log_dir: Option<PathBuf>,
    /// Dry run - don't actually remux or replace files
    pub dry_run: bool,
    /// Copy the original access/modification times onto the remuxed file
    pub preserve_timestamp: bool,
    /// Audio languages to retain
    pub audio_languages: BTreeSet<String>,
    /// Subtitle languages to retain (may be empty)
    pub subtitle_languages: BTreeSet<String>,
    /// Warn when a file keeps no subtitle track
    pub log_missing_subtitle: bool,
    /// Title rewrite mode
    pub rename: RenameMode,
    /// Timeout for a single mkvmerge invocation
    pub tool_timeout_secs: Option<u64>,
    /// Emit newline-delimited JSON events on stdout
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mkvmerge_bin: PathBuf::from("mkvmerge"),
            directory: None,
            log: true,
            log_dir: None,
            dry_run: false,
            preserve_timestamp: true,
            audio_languages: languages(["eng", "und"]),
            subtitle_languages: languages(["eng", "und"]),
            log_missing_subtitle: true,
            rename: RenameMode::None,
            tool_timeout_secs: None,
            json_output: false,
        }
    }
}

/// Values given explicitly on the command line.
///
/// `None` keeps the value from the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mkvmerge_bin: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub log: Option<bool>,
    pub log_dir: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub preserve_timestamp: Option<bool>,
    pub audio_languages: Option<Vec<String>>,
    pub subtitle_languages: Option<Vec<String>>,
    pub log_missing_subtitle: Option<bool>,
    pub rename_tv: Option<bool>,
    pub rename_movie: Option<bool>,
    pub tool_timeout_secs: Option<u64>,
    pub json_output: Option<bool>,
}

impl Config {
    /// Layer explicit overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(bin) = overrides.mkvmerge_bin {
            self.mkvmerge_bin = bin;
        }
        if let Some(dir) = overrides.directory {
            self.directory = Some(dir);
        }
        if let Some(log) = overrides.log {
            self.log = log;
        }
        if let Some(dir) = overrides.log_dir {
            self.log_dir = Some(dir);
        }
        if let Some(dry_run) = overrides.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(preserve) = overrides.preserve_timestamp {
            self.preserve_timestamp = preserve;
        }
        if let Some(audio) = overrides.audio_languages {
            self.audio_languages = audio.into_iter().collect();
        }
        if let Some(subtitles) = overrides.subtitle_languages {
            self.subtitle_languages = subtitles.into_iter().collect();
        }
        if let Some(log_missing) = overrides.log_missing_subtitle {
            self.log_missing_subtitle = log_missing;
        }
        if let Some(secs) = overrides.tool_timeout_secs {
            self.tool_timeout_secs = Some(secs);
        }
        if let Some(json) = overrides.json_output {
            self.json_output = json;
        }

        self.rename = match (overrides.rename_tv, overrides.rename_movie) {
            (Some(true), Some(true)) => {
                return Err(StripError::Config(
                    "renaming for TV and movies at the same time is not allowed".to_string(),
                )
                .into());
            }
            (Some(true), _) => RenameMode::Tv,
            (_, Some(true)) => RenameMode::Movie,
            (Some(false), _) if self.rename == RenameMode::Tv => RenameMode::None,
            (_, Some(false)) if self.rename == RenameMode::Movie => RenameMode::None,
            _ => self.rename,
        };

        Ok(self)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.audio_languages.is_empty() {
            return Err(StripError::Config(
                "at least one audio language to retain must be specified".to_string(),
            )
            .into());
        }

        for code in self.audio_languages.iter().chain(&self.subtitle_languages) {
            if !is_language_code(code) {
                return Err(StripError::Config(format!(
                    "invalid language code '{}' (expected three lowercase letters, e.g. 'eng')",
                    code
                ))
                .into());
            }
        }

        if self.tool_timeout_secs == Some(0) {
            return Err(StripError::Config("timeout must be greater than 0".to_string()).into());
        }

        let directory = self
            .directory
            .as_ref()
            .ok_or_else(|| StripError::Config("no directory to process was given".to_string()))?;
        if !directory.exists() {
            return Err(anyhow::anyhow!("Directory does not exist: {}", directory.display()));
        }
        if !directory.is_dir() {
            return Err(anyhow::anyhow!("Path is not a directory: {}", directory.display()));
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mkvstrip").join("config.json"))
    }

    /// Load configuration from an explicit file, or from the default location.
    ///
    /// A missing default file yields the built-in defaults; a missing explicit
    /// file is an error.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
                }
                Self::from_file(path).await
            }
            None => match Self::default_path() {
                Some(path) => Self::from_file(&path).await,
                None => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Directory where log files are written
    pub fn log_directory(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join("mkvstrip"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn tool_timeout(&self) -> Option<std::time::Duration> {
        self.tool_timeout_secs.map(std::time::Duration::from_secs)
    }

    /// Log the effective configuration
    pub fn log_summary(&self) {
        info!("MKVMERGE_BIN = {}", self.mkvmerge_bin.display());
        if let Some(ref dir) = self.directory {
            info!("DIR = {}", dir.display());
        }
        info!("DRY_RUN = {}", self.dry_run);
        info!("PRESERVE_TIMESTAMP = {}", self.preserve_timestamp);
        info!("AUDIO_LANG = {:?}", self.audio_languages);
        info!("SUBTITLE_LANG = {:?}", self.subtitle_languages);
        info!("LOG_MISSING_SUBTITLE = {}", self.log_missing_subtitle);
        info!("RENAME = {:?}", self.rename);
        if let Some(secs) = self.tool_timeout_secs {
            info!("TIMEOUT = {}s", secs);
        }
    }
}

fn languages<const N: usize>(codes: [&str; N]) -> BTreeSet<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

fn is_language_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_lowercase())
}
