//! # Retention Policy
//!
//! Decide quali tracce tenere in base alla lista di lingue consentite.
//!
//! ## Regola:
//! Una traccia è mantenuta se e solo se la sua lingua è presente nella
//! allow-list (match esatto, case-sensitive). L'ordine originale è preservato
//! sia in `retained` che in `removed`.
//!
//! Funzione pura: il logging delle lingue rimosse/mantenute è compito del chiamante.

use crate::track::{FileTracks, Track};
use std::collections::BTreeSet;

/// Partition of a track list by language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionResult {
    pub retained: Vec<Track>,
    pub removed: Vec<Track>,
}

impl RetentionResult {
    /// Sorted unique languages of the retained tracks
    pub fn retained_languages(&self) -> LanguageSummary {
        LanguageSummary::of(&self.retained)
    }

    /// Sorted unique languages of the removed tracks
    pub fn removed_languages(&self) -> LanguageSummary {
        LanguageSummary::of(&self.removed)
    }
}

/// Split `tracks` into retained and removed, keeping the input order.
pub fn filter(tracks: &[Track], allowed_languages: &BTreeSet<String>) -> RetentionResult {
    let (retained, removed): (Vec<Track>, Vec<Track>) = tracks
        .iter()
        .cloned()
        .partition(|track| allowed_languages.contains(&track.language));
    RetentionResult { retained, removed }
}

/// Tracks of a file after audio and subtitle retention.
///
/// Video tracks are always kept.
pub fn retained_tracks(
    original: &FileTracks,
    audio: &RetentionResult,
    subtitles: &RetentionResult,
) -> FileTracks {
    FileTracks {
        video: original.video.clone(),
        audio: audio.retained.clone(),
        subtitles: subtitles.retained.clone(),
    }
}

/// Sorted set of languages, rendered as `{"eng", "und"}` or `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSummary(BTreeSet<String>);

impl LanguageSummary {
    fn of(tracks: &[Track]) -> Self {
        Self(tracks.iter().map(|t| t.language.clone()).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for LanguageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("None");
        }
        write!(f, "{:?}", self.0)
    }
}
