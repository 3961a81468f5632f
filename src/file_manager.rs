//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery dei file MKV.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva dei file `.mkv` in una directory (case-insensitive)
//! - Path del file temporaneo `<originale>.tmp` accanto all'originale
//! - Preservazione di access/modification time sul file rimuxato
//! - Sostituzione dell'originale con il file temporaneo
//!
//! ## Sicurezza operazioni:
//! - L'originale non viene mai sovrascritto direttamente: il remux scrive sul `.tmp`
//! - La sostituzione è un `rename` atomico sullo stesso filesystem
//! - Se la sostituzione fallisce il `.tmp` viene eliminato e l'originale resta intatto
//!
//! ## Esempio:
//! ```rust,ignore
//! for file in FileManager::find_mkv_files(dir) {
//!     let tmp = FileManager::temp_path(&file);
//!     // remux into tmp...
//!     FileManager::replace_file(&file, &tmp)?;
//! }
//! ```

use crate::error::{Result, StripError};
use filetime::FileTime;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all MKV files below `dir`, sorted by path
    pub fn find_mkv_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Cannot read directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Self::is_mkv(path))
            .collect();

        files.sort();
        files
    }

    /// Check if a file has the `.mkv` extension
    pub fn is_mkv(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("mkv"))
            .unwrap_or(false)
    }

    /// `<path>.tmp`, next to the original
    pub fn temp_path(path: &Path) -> PathBuf {
        let mut name: OsString = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Copy access and modification time of `source` onto `target`
    pub fn preserve_timestamp(source: &Path, target: &Path) -> Result<()> {
        let metadata = std::fs::metadata(source).map_err(|source_err| StripError::Timestamp {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let atime = FileTime::from_last_access_time(&metadata);
        let mtime = FileTime::from_last_modification_time(&metadata);

        filetime::set_file_times(target, atime, mtime).map_err(|e| StripError::Timestamp {
            path: target.to_path_buf(),
            source: e,
        })
    }

    /// Replace `original` with `replacement`.
    ///
    /// On failure the replacement is discarded and the original is left as it was.
    pub fn replace_file(original: &Path, replacement: &Path) -> Result<()> {
        match std::fs::rename(replacement, original) {
            Ok(()) => Ok(()),
            Err(e) => {
                Self::discard(replacement);
                Err(StripError::Replace {
                    from: replacement.to_path_buf(),
                    to: original.to_path_buf(),
                    source: e,
                })
            }
        }
    }

    /// Remove a temporary file if it exists
    pub fn discard(path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed temporary file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_mkv_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("Show S01")).unwrap();
        std::fs::write(root.join("Show S01/E02.mkv"), b"").unwrap();
        std::fs::write(root.join("Show S01/E01.MKV"), b"").unwrap();
        std::fs::write(root.join("movie.mp4"), b"").unwrap();
        std::fs::write(root.join("notes.mkv.txt"), b"").unwrap();
        std::fs::create_dir_all(root.join("dir.mkv")).unwrap();

        let files = FileManager::find_mkv_files(root);
        assert_eq!(
            files,
            vec![root.join("Show S01/E01.MKV"), root.join("Show S01/E02.mkv")]
        );
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            FileManager::temp_path(Path::new("/tv/Show/E01.mkv")),
            PathBuf::from("/tv/Show/E01.mkv.tmp")
        );
    }

    #[test]
    fn test_preserve_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("a.mkv");
        let target = temp_dir.path().join("a.mkv.tmp");
        std::fs::write(&original, b"original").unwrap();
        std::fs::write(&target, b"remuxed").unwrap();

        let past = FileTime::from_unix_time(1_400_000_000, 0);
        filetime::set_file_times(&original, past, past).unwrap();

        FileManager::preserve_timestamp(&original, &target).unwrap();
        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&metadata), past);
    }

    #[test]
    fn test_replace_file() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("a.mkv");
        let tmp = FileManager::temp_path(&original);
        std::fs::write(&original, b"original").unwrap();
        std::fs::write(&tmp, b"remuxed").unwrap();

        FileManager::replace_file(&original, &tmp).unwrap();
        assert_eq!(std::fs::read(&original).unwrap(), b"remuxed");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_replace_failure_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("a.mkv");
        let missing_tmp = FileManager::temp_path(&original);
        std::fs::write(&original, b"original").unwrap();

        let err = FileManager::replace_file(&original, &missing_tmp).unwrap_err();
        assert!(matches!(err, StripError::Replace { .. }));
        assert_eq!(std::fs::read(&original).unwrap(), b"original");
        assert!(!missing_tmp.exists());
    }
}
