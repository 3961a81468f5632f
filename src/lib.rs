//! # mkvstrip Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//!
//! ## Architettura dei moduli:
//! - `track`: Modello delle tracce (video, audio, sottotitoli)
//! - `inventory`: Parsing dell'output di `mkvmerge --identify-verbose`
//! - `retention`: Filtro delle tracce per lingua
//! - `planner`: Decisione di remux e argomenti per mkvmerge
//! - `mkvmerge`: Invocazione del tool esterno
//! - `file_manager`: Discovery dei file e sostituzione sicura
//! - `stripper`: Orchestratore del processo
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `logging`: Setup di console e file di log
//! - `stats` / `json_output`: Statistiche e output strutturato
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use mkvstrip::{Config, MkvStripper};
//!
//! let config = Config { directory: Some(path), ..Default::default() };
//! let stripper = MkvStripper::new(config)?;
//! stripper.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod inventory;
pub mod json_output;
pub mod logging;
pub mod mkvmerge;
pub mod planner;
pub mod retention;
pub mod stats;
pub mod stripper;
pub mod track;

pub use config::{Config, ConfigOverrides, RenameMode};
pub use error::StripError;
pub use inventory::{InventoryParser, VerboseIdentifyParser};
pub use planner::RemuxPlan;
pub use retention::RetentionResult;
pub use stripper::{FileOutcome, MkvStripper};
pub use track::{FileTracks, Track, TrackKind};
