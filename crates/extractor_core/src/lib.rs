//! Extractor core: signal classification, playlist and subtitle parsing, and
//! the pure extraction state machine.
mod config;
mod effect;
mod manifest;
mod merge;
mod msg;
mod schedule;
mod signal;
mod state;
mod subtitle;
mod types;
mod update;
mod view_model;

pub use config::ExtractionConfig;
pub use effect::Effect;
pub use manifest::{looks_like_playlist, parse_manifest, segment_uris, ManifestParseError};
pub use merge::{merge_tracks, selection_catalog, TrackOption, OFF_LABEL};
pub use msg::Msg;
pub use schedule::active_cue;
pub use signal::{
    infer_language, ObservationEvent, Signal, SignalCollector, SignalSource, SubtitleCandidates,
};
pub use state::{
    ExtractionState, Session, SubtitleStatus, INITIALIZING_MESSAGE, PARSING_MESSAGE,
    RETRYING_MESSAGE, TIMEOUT_MESSAGE,
};
pub use subtitle::{
    parse_srt, parse_srt_timestamp, parse_subtitles, parse_vtt, parse_vtt_timestamp,
    SubtitleFormat,
};
pub use types::{Cue, Generation, RequestId, StreamInfo, SubtitleTrack, VideoQuality};
pub use update::update;
pub use view_model::PlayerViewModel;
