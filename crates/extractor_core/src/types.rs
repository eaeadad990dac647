use std::fmt;

/// Session epoch. Every async result and timer carries the generation it was
/// issued under and is dropped when it no longer matches the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Identifier of one subtitle load request; guards against late completions
/// after the user picked another track.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubtitleTrack {
    pub language_code: String,
    pub label: String,
    pub url: String,
}

impl SubtitleTrack {
    pub fn new(
        language_code: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            label: label.into(),
            url: url.into(),
        }
    }
}

/// One `#EXT-X-STREAM-INF` variant. Informational only; the player picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoQuality {
    pub bandwidth: u64,
    pub resolution: Option<String>,
    pub url: String,
}

impl VideoQuality {
    /// Vertical resolution, e.g. `720` for `1280x720`.
    pub fn height(&self) -> Option<u32> {
        self.resolution
            .as_deref()
            .and_then(|r| r.split('x').nth(1))
            .and_then(|h| h.trim().parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamInfo {
    pub stream_url: String,
    pub subtitle_tracks: Vec<SubtitleTrack>,
    pub qualities: Vec<VideoQuality>,
}

impl StreamInfo {
    pub fn new(stream_url: impl Into<String>, subtitle_tracks: Vec<SubtitleTrack>) -> Self {
        Self {
            stream_url: stream_url.into(),
            subtitle_tracks,
            qualities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Cue {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, position_ms: u64) -> bool {
        self.start_ms <= position_ms && position_ms <= self.end_ms
    }
}
