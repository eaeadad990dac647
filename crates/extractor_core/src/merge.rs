use std::collections::HashSet;

use crate::SubtitleTrack;

/// Manifest tracks first, then collector tracks; first occurrence per url wins.
pub fn merge_tracks(
    manifest_tracks: &[SubtitleTrack],
    collector_tracks: &[SubtitleTrack],
) -> Vec<SubtitleTrack> {
    dedupe_by_url(
        manifest_tracks
            .iter()
            .chain(collector_tracks)
            .cloned()
            .collect(),
    )
}

pub(crate) fn dedupe_by_url(tracks: Vec<SubtitleTrack>) -> Vec<SubtitleTrack> {
    let mut seen = HashSet::with_capacity(tracks.len());
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.url.clone()))
        .collect()
}

/// One entry of the user-facing subtitle menu. `url == None` is "Off".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOption {
    pub label: String,
    pub url: Option<String>,
}

pub const OFF_LABEL: &str = "Off";

/// "Off" followed by every merged track.
pub fn selection_catalog(tracks: &[SubtitleTrack]) -> Vec<TrackOption> {
    std::iter::once(TrackOption {
        label: OFF_LABEL.to_string(),
        url: None,
    })
    .chain(tracks.iter().map(|track| TrackOption {
        label: track.label.clone(),
        url: Some(track.url.clone()),
    }))
    .collect()
}
