use std::sync::Arc;

use crate::merge::{merge_tracks, selection_catalog};
use crate::view_model::PlayerViewModel;
use crate::{
    Cue, Effect, ExtractionConfig, Generation, RequestId, SignalCollector, StreamInfo,
    SubtitleCandidates, SubtitleTrack,
};

pub const INITIALIZING_MESSAGE: &str = "Initializing player...";
pub const PARSING_MESSAGE: &str = "Parsing stream manifest...";
pub const RETRYING_MESSAGE: &str = "Retrying stream extraction...";
pub const TIMEOUT_MESSAGE: &str =
    "Stream extraction timed out. The website may be blocking automated access.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionState {
    Loading { message: String },
    Playing(StreamInfo),
    Error { message: String },
}

impl ExtractionState {
    pub fn loading(message: impl Into<String>) -> Self {
        ExtractionState::Loading {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ExtractionState::Error {
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ExtractionState::Loading { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleStatus {
    Off,
    Loading,
    Ready { cue_count: usize },
    Failed { message: String },
}

/// Active subtitle selection. Independent of the extraction state, reset on retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubtitleSelection {
    pub(crate) request: RequestId,
    pub(crate) track: Option<SubtitleTrack>,
    pub(crate) status: SubtitleStatus,
    pub(crate) cues: Arc<[Cue]>,
}

impl SubtitleSelection {
    fn off(request: RequestId) -> Self {
        Self {
            request,
            track: None,
            status: SubtitleStatus::Off,
            cues: Arc::from(Vec::new()),
        }
    }
}

/// One playback session: everything that is mutable lives here and is only
/// touched by [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) page_url: String,
    pub(crate) config: ExtractionConfig,
    pub(crate) collector: SignalCollector,
    pub(crate) generation: Generation,
    pub(crate) state: ExtractionState,
    /// First manifest accepted for this generation.
    pub(crate) manifest_url: Option<String>,
    pub(crate) manifest_tracks: Vec<SubtitleTrack>,
    pub(crate) candidates: SubtitleCandidates,
    pub(crate) selection: SubtitleSelection,
    pub(crate) closed: bool,
    dirty: bool,
}

impl Session {
    /// New session in `Loading`, plus the effects that start observing the page.
    pub fn start(page_url: impl Into<String>, config: ExtractionConfig) -> (Self, Vec<Effect>) {
        let session = Self {
            page_url: page_url.into(),
            collector: SignalCollector::new(&config),
            config,
            generation: Generation::INITIAL,
            state: ExtractionState::loading(INITIALIZING_MESSAGE),
            manifest_url: None,
            manifest_tracks: Vec::new(),
            candidates: SubtitleCandidates::new(),
            selection: SubtitleSelection::off(0),
            closed: false,
            dirty: true,
        };
        let effects = session.generation_start_effects();
        (session, effects)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Subtitle candidates collected for the current generation.
    pub fn candidates(&self) -> &SubtitleCandidates {
        &self.candidates
    }

    pub fn cues(&self) -> &[Cue] {
        &self.selection.cues
    }

    pub fn view(&self) -> PlayerViewModel {
        let subtitle_options = match &self.state {
            ExtractionState::Playing(info) => selection_catalog(&info.subtitle_tracks),
            _ => Vec::new(),
        };
        PlayerViewModel {
            generation: self.generation,
            state: self.state.clone(),
            subtitle_options,
            selected_subtitle: self.selection.track.as_ref().map(|t| t.url.clone()),
            subtitle_status: self.selection.status.clone(),
            discovered_subtitles: self.candidates.len(),
            cues: Arc::clone(&self.selection.cues),
            closed: self.closed,
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        !self.closed && generation == self.generation
    }

    pub(crate) fn generation_start_effects(&self) -> Vec<Effect> {
        vec![
            Effect::StartObservation {
                page_url: self.page_url.clone(),
                generation: self.generation,
            },
            Effect::ScheduleTimeout {
                generation: self.generation,
                after: self.config.timeout,
            },
        ]
    }

    /// Supersede the current generation: fresh `Loading`, empty catalog.
    pub(crate) fn begin_next_generation(&mut self) {
        self.generation = self.generation.next();
        self.state = ExtractionState::loading(RETRYING_MESSAGE);
        self.manifest_url = None;
        self.manifest_tracks.clear();
        self.candidates = SubtitleCandidates::new();
        self.selection = SubtitleSelection::off(self.selection.request + 1);
        self.mark_dirty();
    }

    pub(crate) fn merged_tracks(&self) -> Vec<SubtitleTrack> {
        merge_tracks(&self.manifest_tracks, self.candidates.tracks())
    }

    pub(crate) fn next_subtitle_request(&mut self, track: Option<SubtitleTrack>) -> RequestId {
        let request = self.selection.request + 1;
        self.selection = SubtitleSelection::off(request);
        if track.is_some() {
            self.selection.track = track;
            self.selection.status = SubtitleStatus::Loading;
        }
        self.mark_dirty();
        request
    }

    pub(crate) fn finish_subtitle_load(&mut self, result: Result<Vec<Cue>, String>) {
        match result {
            Ok(cues) => {
                self.selection.status = SubtitleStatus::Ready {
                    cue_count: cues.len(),
                };
                self.selection.cues = Arc::from(cues);
            }
            Err(message) => {
                self.selection.status = SubtitleStatus::Failed { message };
                self.selection.cues = Arc::from(Vec::new());
            }
        }
        self.mark_dirty();
    }
}
