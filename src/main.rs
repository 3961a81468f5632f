//! # mkvstrip - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Caricamento della configurazione (default → file → override CLI)
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione dello stripper e avvio del processo
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Carica il file di configurazione e applica gli override
//! 3. Configura il logging (console + file opzionale)
//! 4. Valida la configurazione e risolve mkvmerge
//! 5. Processa tutti i file MKV della directory, uno alla volta
//!
//! ## Esempio di utilizzo:
//! ```bash
//! mkvstrip -d /mnt/tank/TV -a eng -a und -s eng --rename-tv --dry-run
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use mkvstrip::{logging, Config, ConfigOverrides, MkvStripper};

#[derive(Parser)]
#[command(name = "mkvstrip")]
#[command(about = "Strips unnecessary tracks from MKV files.")]
struct Args {
    /// Directory to process
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log to file in addition to STDOUT and STDERR
    #[arg(short, long, overrides_with = "no_log")]
    log: bool,

    #[arg(long, overrides_with = "log")]
    no_log: bool,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Show what would be done without changing any file
    #[arg(short = 'y', long, overrides_with = "no_dry_run")]
    dry_run: bool,

    #[arg(long, overrides_with = "dry_run")]
    no_dry_run: bool,

    /// Keep the timestamps of the original file
    #[arg(short, long, overrides_with = "no_preserve_timestamp")]
    preserve_timestamp: bool,

    #[arg(long, overrides_with = "preserve_timestamp")]
    no_preserve_timestamp: bool,

    /// Audio languages to retain. May be specified multiple times.
    #[arg(short, long = "audio-language")]
    audio_language: Vec<String>,

    /// Subtitle languages to retain. May be specified multiple times.
    #[arg(short, long = "subtitle-language")]
    subtitle_language: Vec<String>,

    /// Retain no subtitle tracks at all
    #[arg(long, conflicts_with = "subtitle_language")]
    no_subtitle_languages: bool,

    /// Log if stripped file doesn't have a subtitle track
    #[arg(short = 'm', long, overrides_with = "no_log_subtitle")]
    log_subtitle: bool,

    #[arg(long, overrides_with = "log_subtitle")]
    no_log_subtitle: bool,

    /// Rename the title to "<parent directory>: <file name>"
    #[arg(short, long, overrides_with = "no_rename_tv")]
    rename_tv: bool,

    #[arg(long, overrides_with = "rename_tv")]
    no_rename_tv: bool,

    /// Rename the title to the file name
    #[arg(short = 'e', long, overrides_with = "no_rename_movie")]
    rename_movie: bool,

    #[arg(long, overrides_with = "rename_movie")]
    no_rename_movie: bool,

    /// Path to mkvmerge binary
    #[arg(short = 'b', long)]
    mkvmerge_bin: Option<PathBuf>,

    /// Give up on a single mkvmerge invocation after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Emit newline-delimited JSON events on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let subtitle_languages = if self.no_subtitle_languages {
            Some(Vec::new())
        } else {
            (!self.subtitle_language.is_empty()).then(|| self.subtitle_language.clone())
        };

        ConfigOverrides {
            mkvmerge_bin: self.mkvmerge_bin.clone(),
            directory: self.dir.clone(),
            log: flag(self.log, self.no_log),
            log_dir: self.log_dir.clone(),
            dry_run: flag(self.dry_run, self.no_dry_run),
            preserve_timestamp: flag(self.preserve_timestamp, self.no_preserve_timestamp),
            audio_languages: (!self.audio_language.is_empty()).then(|| self.audio_language.clone()),
            subtitle_languages,
            log_missing_subtitle: flag(self.log_subtitle, self.no_log_subtitle),
            rename_tv: flag(self.rename_tv, self.no_rename_tv),
            rename_movie: flag(self.rename_movie, self.no_rename_movie),
            tool_timeout_secs: self.timeout,
            json_output: self.json.then_some(true),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())
        .await?
        .with_overrides(args.overrides())?;

    let log_dir = config.log.then(|| config.log_directory());
    let _log_guard = logging::init(args.verbose, config.json_output, log_dir.as_deref())?;

    info!("Running mkvstrip with configuration:");
    config.log_summary();

    let stripper = MkvStripper::new(config)?;
    stripper.run().await?;

    Ok(())
}
