//! # Remux Planner
//!
//! Decide se un file va rimuxato e costruisce gli argomenti per mkvmerge.
//!
//! ## Regole:
//! - Nessuna traccia audio mantenuta → `NoMatchingAudio`, il file va saltato
//! - Remux necessario se cambia il numero di tracce audio o sottotitoli,
//!   oppure se è attivo un rename del titolo
//! - La prima traccia audio mantenuta diventa default, tutte le altre no
//! - Nessun sottotitolo viene mai marcato come default
//!
//! ## Titolo:
//! - `Tv`: `"<directory padre>: <nome file senza .mkv>"`
//! - `Movie`: `"<nome file senza .mkv>"`

use crate::config::RenameMode;
use crate::error::{Result, StripError};
use crate::track::{FileTracks, Track};
use regex::Regex;
use std::ffi::OsString;
use std::path::Path;
use std::sync::OnceLock;

/// Decision for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxPlan {
    /// Whether any change is needed
    pub required: bool,
    pub title: Option<String>,
    /// Retained audio ids in original order, the first one becomes default
    pub audio_track_ids: Vec<u32>,
    /// Retained subtitle ids in original order, none becomes default
    pub subtitle_track_ids: Vec<u32>,
}

/// Compute the remux plan for `path`.
pub fn plan(
    original: &FileTracks,
    retained: &FileTracks,
    rename: RenameMode,
    path: &Path,
) -> Result<RemuxPlan> {
    if retained.audio.is_empty() {
        return Err(StripError::NoMatchingAudio(path.to_path_buf()));
    }

    let required = original.audio.len() != retained.audio.len()
        || original.subtitles.len() != retained.subtitles.len()
        || rename != RenameMode::None;

    Ok(RemuxPlan {
        required,
        title: title_for(rename, path)?,
        audio_track_ids: ids(&retained.audio),
        subtitle_track_ids: ids(&retained.subtitles),
    })
}

fn ids(tracks: &[Track]) -> Vec<u32> {
    tracks.iter().map(|t| t.id).collect()
}

/// Title override for the given rename mode
pub fn title_for(rename: RenameMode, path: &Path) -> Result<Option<String>> {
    match rename {
        RenameMode::None => Ok(None),
        RenameMode::Movie => Ok(Some(file_stem(path)?)),
        RenameMode::Tv => {
            let parent = path
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Some(format!("{}: {}", parent, file_stem(path)?)))
        }
    }
}

/// File name without its `.mkv` extension (case-insensitive)
fn file_stem(path: &Path) -> Result<String> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let name_re = NAME_RE.get_or_init(|| Regex::new(r"(?i)^(.+)\.mkv$").unwrap());

    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name_re.captures(name))
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| StripError::InvalidFileName(path.to_path_buf()))
}

impl RemuxPlan {
    /// Arguments for `mkvmerge`, excluding the binary itself
    pub fn args(&self, source: &Path, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--output".into(), target.into()];

        if let Some(ref title) = self.title {
            args.push("--title".into());
            args.push(title.into());
        }

        args.push("--audio-tracks".into());
        args.push(join_ids(&self.audio_track_ids).into());
        for (index, id) in self.audio_track_ids.iter().enumerate() {
            let flag = if index == 0 { 1 } else { 0 };
            args.push("--default-track".into());
            args.push(format!("{}:{}", id, flag).into());
        }

        if self.subtitle_track_ids.is_empty() {
            args.push("--no-subtitles".into());
        } else {
            args.push("--subtitle-tracks".into());
            args.push(join_ids(&self.subtitle_track_ids).into());
            for id in &self.subtitle_track_ids {
                args.push("--default-track".into());
                args.push(format!("{}:0", id).into());
            }
        }

        args.push(source.into());
        args
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackKind;
    use std::path::PathBuf;

    fn track(kind: TrackKind, id: u32, lang: &str) -> Track {
        Track::new(kind, &id.to_string(), "codec", lang, None).unwrap()
    }

    fn tracks(audio: &[(u32, &str)], subtitles: &[(u32, &str)]) -> FileTracks {
        FileTracks {
            video: vec![track(TrackKind::Video, 0, "und")],
            audio: audio.iter().map(|&(id, l)| track(TrackKind::Audio, id, l)).collect(),
            subtitles: subtitles
                .iter()
                .map(|&(id, l)| track(TrackKind::Subtitle, id, l))
                .collect(),
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_no_matching_audio() {
        let original = tracks(&[(1, "fre")], &[]);
        let retained = tracks(&[], &[]);
        let err = plan(&original, &retained, RenameMode::None, Path::new("/m/a.mkv")).unwrap_err();
        assert!(matches!(err, StripError::NoMatchingAudio(_)));
    }

    #[test]
    fn test_nothing_to_do() {
        let original = tracks(&[(1, "eng")], &[(2, "eng")]);
        let retained = original.clone();
        let path = Path::new("/m/a.mkv");

        let first = plan(&original, &retained, RenameMode::None, path).unwrap();
        let second = plan(&original, &retained, RenameMode::None, path).unwrap();
        assert!(!first.required);
        assert_eq!(first, second);
        assert_eq!(first.title, None);
    }

    #[test]
    fn test_required_when_counts_differ() {
        let original = tracks(&[(1, "eng"), (2, "fre")], &[(3, "eng")]);
        let retained = tracks(&[(1, "eng")], &[(3, "eng")]);
        assert!(plan(&original, &retained, RenameMode::None, Path::new("a.mkv")).unwrap().required);

        let original = tracks(&[(1, "eng")], &[(3, "eng"), (4, "ger")]);
        let retained = tracks(&[(1, "eng")], &[(3, "eng")]);
        assert!(plan(&original, &retained, RenameMode::None, Path::new("a.mkv")).unwrap().required);
    }

    #[test]
    fn test_required_when_renaming() {
        let original = tracks(&[(1, "eng")], &[]);
        let plan = plan(&original, &original, RenameMode::Movie, Path::new("/m/Heat (1995).mkv")).unwrap();
        assert!(plan.required);
        assert_eq!(plan.title.as_deref(), Some("Heat (1995)"));
    }

    #[test]
    fn test_tv_title() {
        let path = PathBuf::from("/tv/Breaking Bad S01/Breaking Bad S01E02.mkv");
        let title = title_for(RenameMode::Tv, &path).unwrap();
        assert_eq!(title.as_deref(), Some("Breaking Bad S01: Breaking Bad S01E02"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let title = title_for(RenameMode::Movie, Path::new("/m/Alien.MKV")).unwrap();
        assert_eq!(title.as_deref(), Some("Alien"));

        let title = title_for(RenameMode::Movie, Path::new("/m/archive.mkv.MkV")).unwrap();
        assert_eq!(title.as_deref(), Some("archive.mkv"));
    }

    #[test]
    fn test_invalid_file_name() {
        let original = tracks(&[(1, "eng")], &[]);
        for name in ["/m/clip.mp4", "/m/.mkv", "/m/mkv"] {
            let err = plan(&original, &original, RenameMode::Movie, Path::new(name)).unwrap_err();
            assert!(matches!(err, StripError::InvalidFileName(_)), "{}", name);
        }
        // Without renaming the name is never inspected
        assert!(plan(&original, &original, RenameMode::None, Path::new("/m/clip.mp4")).is_ok());
    }

    #[test]
    fn test_default_flags_follow_retained_order() {
        let original = tracks(&[(4, "eng"), (2, "und"), (6, "fre")], &[(3, "eng"), (5, "ger")]);
        let retained = tracks(&[(4, "eng"), (2, "und")], &[(3, "eng")]);
        let plan = plan(&original, &retained, RenameMode::None, Path::new("/m/a.mkv")).unwrap();

        let args = strings(&plan.args(Path::new("/m/a.mkv"), Path::new("/m/a.mkv.tmp")));
        assert_eq!(
            args,
            vec![
                "--output",
                "/m/a.mkv.tmp",
                "--audio-tracks",
                "4,2",
                "--default-track",
                "4:1",
                "--default-track",
                "2:0",
                "--subtitle-tracks",
                "3",
                "--default-track",
                "3:0",
                "/m/a.mkv",
            ]
        );
    }

    #[test]
    fn test_args_with_title_and_no_subtitles() {
        let original = tracks(&[(1, "eng")], &[(2, "spa")]);
        let retained = tracks(&[(1, "eng")], &[]);
        let path = Path::new("/tv/Show S02/Show S02E05.mkv");
        let plan = plan(&original, &retained, RenameMode::Tv, path).unwrap();

        let args = strings(&plan.args(path, Path::new("/tv/Show S02/Show S02E05.mkv.tmp")));
        assert_eq!(
            args,
            vec![
                "--output",
                "/tv/Show S02/Show S02E05.mkv.tmp",
                "--title",
                "Show S02: Show S02E05",
                "--audio-tracks",
                "1",
                "--default-track",
                "1:1",
                "--no-subtitles",
                "/tv/Show S02/Show S02E05.mkv",
            ]
        );
    }
}
