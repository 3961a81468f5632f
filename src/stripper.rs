//! # Stripper Orchestrator Module
//!
//! Questo è il modulo che orchestra tutto il processo di stripping.
//!
//! ## Responsabilità:
//! - Discovery dei file MKV nella directory configurata
//! - Per ogni file, in sequenza: identify → parse → retention → plan → remux → sostituzione
//! - Logging dettagliato di cosa viene rimosso e mantenuto
//! - Statistiche e report finale
//!
//! ## Processing pipeline per file:
//! 1. `mkvmerge --identify-verbose` (errore → file saltato)
//! 2. Parsing dell'inventario in tracce
//! 3. Retention di audio e sottotitoli per lingua
//! 4. Planning: nessun audio mantenuto → file saltato; niente da fare → file invariato
//! 5. Remux in `<file>.tmp` (errore → `.tmp` eliminato, originale intatto)
//! 6. Preservazione timestamp (opzionale) e sostituzione dell'originale
//!
//! ## Error handling:
//! - Errori per singoli file non bloccano l'operazione
//! - Solo errori di configurazione interrompono l'esecuzione, prima di toccare file
//!
//! ## Dry run mode:
//! - Identifica e decide come sempre, logga il comando che verrebbe eseguito
//! - Non invoca il remux e non modifica nessun file

use crate::{
    config::Config,
    error::StripError,
    file_manager::FileManager,
    inventory::{InventoryParser, VerboseIdentifyParser},
    json_output::{JsonConfig, JsonMessage},
    mkvmerge::MkvMerge,
    planner,
    retention,
    stats::StripStats,
    track::Track,
};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Remuxed and replaced (or would have been, in dry run)
    Remuxed {
        title: Option<String>,
        audio_tracks: Vec<u32>,
        subtitle_tracks: Vec<u32>,
        dry_run: bool,
    },
    /// Already matches the configuration
    Unchanged,
    /// Deliberately left alone
    Skipped { reason: String },
    /// Identify, remux or replacement failed
    Failed { error: String },
}

/// Main orchestrator
pub struct MkvStripper<P = VerboseIdentifyParser> {
    config: Config,
    directory: PathBuf,
    mkvmerge: MkvMerge,
    parser: P,
}

impl MkvStripper {
    /// Create a stripper using the verbose identification parser
    pub fn new(config: Config) -> Result<Self> {
        Self::with_parser(config, VerboseIdentifyParser::new())
    }
}

impl<P: InventoryParser> MkvStripper<P> {
    /// Validate the configuration and resolve mkvmerge
    pub fn with_parser(config: Config, parser: P) -> Result<Self> {
        config.validate()?;

        let directory = config
            .directory
            .clone()
            .ok_or_else(|| StripError::Config("no directory to process was given".to_string()))?;
        let mkvmerge = MkvMerge::resolve(&config.mkvmerge_bin, config.tool_timeout())?;

        Ok(Self {
            config,
            directory,
            mkvmerge,
            parser,
        })
    }

    /// Process every MKV file below the configured directory
    pub async fn run(&self) -> Result<StripStats> {
        info!("Processing directory: {}", self.directory.display());
        info!("Using mkvmerge at {}", self.mkvmerge.binary().display());
        if self.config.dry_run {
            info!("Dry run mode: no files will be modified");
        }

        let files = FileManager::find_mkv_files(&self.directory);
        info!("Found {} MKV files to process", files.len());

        let start_time = Instant::now();
        let mut stats = StripStats::new(files.len());

        if self.config.json_output {
            JsonMessage::Start {
                directory: self.directory.clone(),
                total_files: files.len(),
                config: JsonConfig::from(&self.config),
            }
            .emit();
        }

        for path in &files {
            let outcome = match self.process_file(path).await {
                Ok(outcome) => outcome,
                Err(e) if !e.is_per_file() => return Err(e.into()),
                Err(e) => report_failure(path, e),
            };

            match outcome {
                FileOutcome::Remuxed { .. } => stats.add_remuxed(),
                FileOutcome::Unchanged => stats.add_unchanged(),
                FileOutcome::Skipped { .. } => stats.add_skipped(),
                FileOutcome::Failed { .. } => stats.add_error(),
            }

            if self.config.json_output {
                JsonMessage::FileComplete {
                    path: path.clone(),
                    outcome,
                }
                .emit();
            }
        }

        info!("============");
        info!("{}", stats.format_summary());

        if self.config.json_output {
            JsonMessage::Complete {
                stats: stats.clone(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            }
            .emit();
        }

        Ok(stats)
    }

    /// Identify, decide and (if needed) remux a single file
    pub async fn process_file(&self, path: &Path) -> crate::error::Result<FileOutcome> {
        info!("============");
        info!("Identifying {}", path.display());
        let inventory = self.mkvmerge.identify(path).await?;

        info!("Searching for video, audio, and subtitle tracks...");
        let tracks = self.parser.parse(&inventory);
        log_tracks("Found video track(s):", &tracks.video);
        log_tracks("Found audio track(s):", &tracks.audio);
        log_tracks("Found subtitle track(s):", &tracks.subtitles);

        info!("Filtering audio track(s)...");
        let audio = retention::filter(&tracks.audio, &self.config.audio_languages);
        info!("Removing audio language(s): {}", audio.removed_languages());
        info!("Retaining audio language(s): {}", audio.retained_languages());

        info!("Filtering subtitle track(s)...");
        let subtitles = retention::filter(&tracks.subtitles, &self.config.subtitle_languages);
        info!("Removing subtitle language(s): {}", subtitles.removed_languages());
        info!("Retaining subtitle language(s): {}", subtitles.retained_languages());

        if subtitles.retained.is_empty() && self.config.log_missing_subtitle {
            warn!(
                "WARNING: No subtitle tracks matching specified language(s) for {}",
                path.display()
            );
        }

        let retained = retention::retained_tracks(&tracks, &audio, &subtitles);
        let plan = planner::plan(&tracks, &retained, self.config.rename, path)?;

        info!("Number of audio tracks retained: {}", retained.audio.len());
        log_tracks("Remuxing with the following audio track(s):", &retained.audio);
        info!("Number of subtitle tracks retained: {}", retained.subtitles.len());
        log_tracks("Remuxing with the following subtitle track(s):", &retained.subtitles);

        if !plan.required {
            info!("Nothing to do for {}", path.display());
            return Ok(FileOutcome::Unchanged);
        }

        let target = FileManager::temp_path(path);
        let args = plan.args(path, &target);
        let outcome = FileOutcome::Remuxed {
            title: plan.title.clone(),
            audio_tracks: plan.audio_track_ids.clone(),
            subtitle_tracks: plan.subtitle_track_ids.clone(),
            dry_run: self.config.dry_run,
        };

        info!("Processing {}...", path.display());
        if self.config.dry_run {
            info!("Dry run: would run {}", self.mkvmerge.command_line(&args));
            if self.config.preserve_timestamp {
                info!("Preserving timestamp of {}", path.display());
            }
            return Ok(outcome);
        }

        if let Err(e) = self.mkvmerge.remux(path, &args).await {
            FileManager::discard(&target);
            return Err(e);
        }
        info!("Remux of {} successful.", path.display());

        if self.config.preserve_timestamp {
            info!("Preserving timestamp of {}", path.display());
            if let Err(e) = FileManager::preserve_timestamp(path, &target) {
                FileManager::discard(&target);
                return Err(e);
            }
        }

        FileManager::replace_file(path, &target)?;
        Ok(outcome)
    }
}

/// Log a per-file error and turn it into the reported outcome
fn report_failure(path: &Path, err: StripError) -> FileOutcome {
    match err {
        StripError::NoMatchingAudio(_) | StripError::InvalidFileName(_) => {
            error!("ERROR: {} ... Skipping.", err);
            FileOutcome::Skipped {
                reason: err.to_string(),
            }
        }
        err => {
            error!("Processing of {} failed: {}", path.display(), err);
            FileOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}

fn log_tracks(header: &str, tracks: &[Track]) {
    info!("{}", header);
    for track in tracks {
        info!("    {}", track);
    }
}
