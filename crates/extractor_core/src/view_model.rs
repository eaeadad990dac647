use std::sync::Arc;

use crate::{active_cue, Cue, ExtractionState, Generation, SubtitleStatus, TrackOption};

/// Snapshot published to the player UI after every visible change.
///
/// Change tracking stays on the session ([`crate::Session::consume_dirty`]);
/// publishing a snapshot is the change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerViewModel {
    pub generation: Generation,
    pub state: ExtractionState,
    /// "Off" first, then the merged tracks. Empty until playing.
    pub subtitle_options: Vec<TrackOption>,
    pub selected_subtitle: Option<String>,
    pub subtitle_status: SubtitleStatus,
    pub discovered_subtitles: usize,
    pub cues: Arc<[Cue]>,
    pub closed: bool,
}

impl PlayerViewModel {
    pub fn active_cue(&self, position_ms: u64) -> Option<&Cue> {
        active_cue(&self.cues, position_ms)
    }
}
