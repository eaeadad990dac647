use crate::{Generation, ObservationEvent, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page observer delivered a raw event.
    Observed {
        generation: Generation,
        event: ObservationEvent,
    },
    /// Page observer could not observe the page at all.
    ObservationFailed {
        generation: Generation,
        message: String,
    },
    /// Manifest fetch finished: playlist text, or a failure description.
    ManifestFetched {
        generation: Generation,
        url: String,
        result: Result<String, String>,
    },
    /// The loading deadline of `generation` elapsed.
    TimeoutElapsed { generation: Generation },
    /// User asked for a fresh extraction attempt.
    RetryClicked,
    /// User picked a subtitle track; `None` turns subtitles off.
    SubtitleSelected { url: Option<String> },
    /// Subtitle documents for a selection request: one per file or segment.
    SubtitleFetched {
        request: RequestId,
        url: String,
        result: Result<Vec<String>, String>,
    },
    /// Player dismissed; the session is over.
    Dismissed,
    /// Fallback for placeholder wiring.
    NoOp,
}
