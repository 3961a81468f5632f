//! # Track Model
//!
//! Rappresentazione immutabile di una traccia (video, audio, sottotitoli)
//! letta dall'output di `mkvmerge --identify-verbose`.
//!
//! ## Responsabilità:
//! - `TrackKind`: tipo di traccia (un solo record con discriminante, niente gerarchia)
//! - `Track`: id, lingua, nome opzionale, flag default/forced
//! - `FileTracks`: tracce di un file raggruppate per tipo, nell'ordine di apparizione
//!
//! Gli id NON vengono reindicizzati: corrispondono esattamente agli id
//! riportati da mkvmerge e vengono riusati negli argomenti del remux.

use serde::Serialize;
use std::fmt;

/// Kind of stream inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
        };
        f.write_str(label)
    }
}

/// One stream of a media container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: u32,
    pub kind: TrackKind,
    /// Codec label as printed between parentheses, e.g. `AC3/EAC3`
    pub codec: String,
    /// ISO 639-2 code, `und` when undetermined
    pub language: String,
    pub name: Option<String>,
    /// Present for audio and subtitle tracks only
    pub default: Option<bool>,
    /// Present for subtitle tracks only
    pub forced: Option<bool>,
}

impl Track {
    /// Build a track from raw captured fields.
    ///
    /// Returns `None` when the id does not fit a `u32`.
    pub fn new(
        kind: TrackKind,
        id: &str,
        codec: &str,
        language: &str,
        name: Option<String>,
    ) -> Option<Self> {
        let id = id.parse().ok()?;
        Some(Self {
            id,
            kind,
            codec: codec.to_string(),
            language: language.to_string(),
            name,
            default: None,
            forced: None,
        })
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = Some(forced);
        self
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track #{} ({}): {}",
            self.id,
            self.language,
            self.name.as_deref().unwrap_or("")
        )
    }
}

/// All tracks of one file, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileTracks {
    pub video: Vec<Track>,
    pub audio: Vec<Track>,
    pub subtitles: Vec<Track>,
}

impl FileTracks {
    pub fn push(&mut self, track: Track) {
        match track.kind {
            TrackKind::Video => self.video.push(track),
            TrackKind::Audio => self.audio.push(track),
            TrackKind::Subtitle => self.subtitles.push(track),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty() && self.subtitles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_name() {
        let track = Track::new(TrackKind::Audio, "2", "AC3", "eng", Some("Surround 5.1".into()))
            .unwrap()
            .with_default(true);
        assert_eq!(track.to_string(), "Track #2 (eng): Surround 5.1");
    }

    #[test]
    fn test_display_without_name() {
        let track = Track::new(TrackKind::Subtitle, "5", "SubRip/SRT", "und", None).unwrap();
        assert_eq!(track.to_string(), "Track #5 (und): ");
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!(Track::new(TrackKind::Video, "99999999999", "AVC", "eng", None).is_none());
        assert!(Track::new(TrackKind::Video, "x", "AVC", "eng", None).is_none());
    }

    #[test]
    fn test_push_groups_by_kind() {
        let mut tracks = FileTracks::default();
        assert!(tracks.is_empty());
        tracks.push(Track::new(TrackKind::Video, "0", "AVC", "und", None).unwrap());
        tracks.push(Track::new(TrackKind::Audio, "1", "AC3", "eng", None).unwrap());
        tracks.push(Track::new(TrackKind::Subtitle, "2", "PGS", "eng", None).unwrap());
        tracks.push(Track::new(TrackKind::Audio, "3", "DTS", "fre", None).unwrap());

        assert_eq!(tracks.video.len(), 1);
        assert_eq!(
            tracks.audio.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(tracks.subtitles.len(), 1);
    }
}
