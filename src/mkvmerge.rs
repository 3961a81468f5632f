//! # mkvmerge Module
//!
//! Questo modulo incapsula tutte le invocazioni del tool esterno `mkvmerge`.
//!
//! ## Responsabilità:
//! - Risoluzione del binario (path esplicito o ricerca nel `PATH`)
//! - `identify()`: `mkvmerge --identify-verbose <file>` → testo dell'inventario
//! - `remux()`: `mkvmerge --output <tmp> ... <file>` con gli argomenti del planner
//! - Timeout opzionale per ogni invocazione (il processo viene terminato)
//!
//! ## Gestione errori:
//! - Exit code non zero → `StripError::Identify` / `StripError::Remux`
//! - Binario non trovato → `StripError::MissingDependency` (fatale all'avvio)
//!
//! mkvmerge scrive i propri messaggi di errore su stdout, quindi nell'errore
//! vengono riportati sia stdout che stderr.

use crate::error::{Result, StripError};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Handle on the mkvmerge executable
#[derive(Debug, Clone)]
pub struct MkvMerge {
    bin: PathBuf,
    timeout: Option<Duration>,
}

impl MkvMerge {
    pub fn new(bin: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    /// Resolve the configured binary, failing if it cannot be found
    pub fn resolve(bin: &Path, timeout: Option<Duration>) -> Result<Self> {
        let resolved = resolve_binary(bin).ok_or_else(|| {
            StripError::MissingDependency(format!(
                "mkvmerge not found at '{}'. {}",
                bin.display(),
                install_instructions()
            ))
        })?;
        debug!("Using mkvmerge: {}", resolved.display());
        Ok(Self::new(resolved, timeout))
    }

    pub fn binary(&self) -> &Path {
        &self.bin
    }

    /// Run `--identify-verbose` and return its standard output
    pub async fn identify(&self, path: &Path) -> Result<String> {
        let args: Vec<OsString> = vec!["--identify-verbose".into(), path.into()];
        let output = self.run(&args, path).await?;

        if !output.status.success() {
            return Err(StripError::Identify {
                path: path.to_path_buf(),
                output: combined_output(&output),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a remux with the given arguments
    pub async fn remux(&self, path: &Path, args: &[OsString]) -> Result<()> {
        let output = self.run(args, path).await?;

        if !output.status.success() {
            return Err(StripError::Remux {
                path: path.to_path_buf(),
                command: self.command_line(args),
                output: combined_output(&output),
            });
        }

        Ok(())
    }

    /// Human-readable command line, for logs
    pub fn command_line(&self, args: &[OsString]) -> String {
        std::iter::once(self.bin.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, args: &[OsString], path: &Path) -> Result<Output> {
        debug!("Running: {}", self.command_line(args));

        let mut cmd = Command::new(&self.bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start_time = std::time::Instant::now();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| StripError::Timeout {
                    tool: "mkvmerge".to_string(),
                    secs: limit.as_secs(),
                    path: path.to_path_buf(),
                })??,
            None => cmd.output().await?,
        };
        debug!(
            "mkvmerge exited with {} after {:.1}s",
            output.status,
            start_time.elapsed().as_secs_f64()
        );

        Ok(output)
    }
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = [stdout.trim_end(), stderr.trim_end()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    if combined.is_empty() {
        format!("exited with {}", output.status)
    } else {
        combined
    }
}

fn quote(arg: &OsStr) -> String {
    let arg = arg.to_string_lossy();
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        arg.into_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Find the executable: explicit paths are used as-is, bare names are
/// searched on `PATH`.
pub fn resolve_binary(bin: &Path) -> Option<PathBuf> {
    if bin.components().count() > 1 || bin.is_absolute() {
        return bin.is_file().then(|| bin.to_path_buf());
    }
    find_in_system_path(bin.as_os_str())
}

fn find_in_system_path(tool_name: &OsStr) -> Option<PathBuf> {
    let mut tool_with_ext = tool_name.to_os_string();
    if cfg!(windows) && Path::new(tool_name).extension().is_none() {
        tool_with_ext.push(".exe");
    }

    env::split_paths(&env::var_os("PATH")?)
        .map(|dir| dir.join(&tool_with_ext))
        .find(|path| path.is_file())
}

fn install_instructions() -> &'static str {
    if cfg!(target_os = "linux") {
        "Install it with: sudo apt-get install mkvtoolnix"
    } else if cfg!(target_os = "macos") {
        "Install it with: brew install mkvtoolnix"
    } else {
        "Install MKVToolNix from https://mkvtoolnix.download/ or pass --mkvmerge-bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line_quoting() {
        let mkvmerge = MkvMerge::new("/usr/bin/mkvmerge", None);
        let args: Vec<OsString> = vec![
            "--output".into(),
            "/tv/Show S01/E01.mkv.tmp".into(),
            "--title".into(),
            "It's".into(),
        ];
        assert_eq!(
            mkvmerge.command_line(&args),
            r"/usr/bin/mkvmerge --output '/tv/Show S01/E01.mkv.tmp' --title 'It'\''s'"
        );
    }

    #[test]
    fn test_resolve_missing_binary() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("mkvmerge");
        assert!(resolve_binary(&missing).is_none());
        let err = MkvMerge::resolve(&missing, None).unwrap_err();
        assert!(matches!(err, StripError::MissingDependency(_)));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("mkvmerge");
        std::fs::write(&bin, "").unwrap();
        assert_eq!(resolve_binary(&bin), Some(bin));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("mkvmerge");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_identify_returns_stdout() {
            let dir = TempDir::new().unwrap();
            let bin = script(&dir, r#"echo "identify $1 $2""#);
            let out = MkvMerge::new(bin, None)
                .identify(Path::new("/m/a.mkv"))
                .await
                .unwrap();
            assert_eq!(out.trim(), "identify --identify-verbose /m/a.mkv");
        }

        #[tokio::test]
        async fn test_identify_failure() {
            let dir = TempDir::new().unwrap();
            let bin = script(&dir, "echo 'Error: not a Matroska file'; exit 2");
            let err = MkvMerge::new(bin, None)
                .identify(Path::new("/m/a.mkv"))
                .await
                .unwrap_err();
            match err {
                StripError::Identify { output, .. } => {
                    assert_eq!(output, "Error: not a Matroska file")
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_remux_timeout() {
            let dir = TempDir::new().unwrap();
            let bin = script(&dir, "sleep 5");
            let err = MkvMerge::new(bin, Some(Duration::from_millis(200)))
                .remux(Path::new("/m/a.mkv"), &[])
                .await
                .unwrap_err();
            assert!(matches!(err, StripError::Timeout { .. }));
        }
    }
}
