//! # Inventory Parser
//!
//! Converte l'output testuale di `mkvmerge --identify-verbose` in tracce strutturate.
//!
//! ## Responsabilità:
//! - Riconosce le righe `Track ID ...` con tre grammatiche (audio, sottotitoli, video)
//! - Ignora silenziosamente ogni riga che non corrisponde
//! - Decodifica i nomi delle tracce (escape di mkvmerge)
//!
//! ## Precedenza:
//! Per ogni riga si prova prima audio, poi sottotitoli, poi video; una riga
//! produce al massimo una traccia.
//!
//! ## Esempio riga:
//! ```text
//! Track ID 1: audio (AC3/EAC3) [number:2 uid:42 codec_id:A_AC3 codec_private_length:0 language:eng track_name:Surround\s5.1 default_track:1 forced_track:0]
//! ```
//!
//! La grammatica è dietro il trait `InventoryParser`, così un cambio di formato
//! dell'output di mkvmerge non tocca la logica di retention o di planning.

use crate::track::{FileTracks, Track, TrackKind};
use regex::{Captures, Regex};
use tracing::debug;

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| Regex::new($re).unwrap())
    }};
}

/// Turns identification output into tracks
pub trait InventoryParser {
    fn parse(&self, inventory: &str) -> FileTracks;
}

/// Parser for the line oriented `--identify-verbose` format
#[derive(Debug, Default, Clone, Copy)]
pub struct VerboseIdentifyParser;

impl VerboseIdentifyParser {
    pub fn new() -> Self {
        Self
    }

    fn audio_re() -> &'static Regex {
        regex!(
            r"^Track ID (?P<id>\d+): audio \((?P<codec>[^)]+)\) \[number:\d+ uid:\d+ codec_id:\S+ codec_private_length:\d+ (?:codec_private_data:[a-f\d]+ )?language:(?P<language>[a-z]{3})(?: track_name:(?P<name>.+?))? default_track:(?P<default>[01])"
        )
    }

    fn subtitle_re() -> &'static Regex {
        regex!(
            r"^Track ID (?P<id>\d+): subtitles \((?P<codec>[^)]+)\) \[number:\d+ uid:\d+ codec_id:\S+ codec_private_length:\d+ (?:codec_private_data:[a-f\d]+ )?language:(?P<language>[a-z]{3})(?: track_name:(?P<name>.+?))? default_track:(?P<default>[01]) forced_track:(?P<forced>[01])"
        )
    }

    fn video_re() -> &'static Regex {
        regex!(
            r"^Track ID (?P<id>\d+): video \((?P<codec>[^)]+)\) \[number:\d+ uid:\d+ codec_id:\S+ codec_private_length:\d+ (?:codec_private_data:[a-f\d]+ )?language:(?P<language>[a-z]{3})(?: track_name:(?P<name>.+?))? pixel_dimensions:"
        )
    }

    fn parse_line(line: &str) -> Option<Track> {
        if let Some(caps) = Self::audio_re().captures(line) {
            return Self::build(TrackKind::Audio, &caps)
                .map(|t| t.with_default(&caps["default"] == "1"));
        }
        if let Some(caps) = Self::subtitle_re().captures(line) {
            return Self::build(TrackKind::Subtitle, &caps).map(|t| {
                t.with_default(&caps["default"] == "1")
                    .with_forced(&caps["forced"] == "1")
            });
        }
        if let Some(caps) = Self::video_re().captures(line) {
            return Self::build(TrackKind::Video, &caps);
        }
        None
    }

    fn build(kind: TrackKind, caps: &Captures<'_>) -> Option<Track> {
        let name = caps.name("name").map(|m| unescape(m.as_str()));
        let track = Track::new(kind, &caps["id"], &caps["codec"], &caps["language"], name);
        if track.is_none() {
            debug!("Ignoring {} track with out of range id: {}", kind, &caps["id"]);
        }
        track
    }
}

impl InventoryParser for VerboseIdentifyParser {
    fn parse(&self, inventory: &str) -> FileTracks {
        let mut tracks = FileTracks::default();
        for track in inventory.lines().filter_map(Self::parse_line) {
            tracks.push(track);
        }
        tracks
    }
}

/// Undo mkvmerge's escaping of free-form values.
///
/// `\s` space, `\2` double quote, `\c` colon, `\h` hash, `\b` open bracket,
/// `\\` backslash. Unknown sequences are kept verbatim.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('2') => out.push('"'),
            Some('c') => out.push(':'),
            Some('h') => out.push('#'),
            Some('b') => out.push('['),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
