//! Classification of raw page observations into typed signals.
//!
//! The page observer reports every network request it sees and every
//! subtitle track a player script exposes. Most of that traffic is noise;
//! [`SignalCollector::observe`] keeps the manifest and subtitle candidates.

use std::sync::LazyLock;

use engine_logging::{engine_debug, engine_trace};
use regex::Regex;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{ExtractionConfig, SubtitleTrack};

/// Raw event delivered by the page observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservationEvent {
    /// A request issued by the page, as intercepted.
    NetworkRequest { url: String },
    /// A track reported by script-level inspection of the player config.
    ScriptReport {
        language: String,
        label: String,
        url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// `.vtt`/`.srt` request seen on the wire.
    SubtitleFile,
    /// Request to a known subtitle service host.
    SubtitleService,
    /// Reported by the player script.
    ScriptReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    ManifestCandidate {
        url: String,
    },
    SubtitleCandidate {
        language_code: String,
        label: String,
        url: String,
        source: SignalSource,
    },
}

impl Signal {
    /// Track carried by a subtitle candidate; `None` for manifests.
    pub fn subtitle_track(&self) -> Option<SubtitleTrack> {
        match self {
            Signal::ManifestCandidate { .. } => None,
            Signal::SubtitleCandidate {
                language_code,
                label,
                url,
                ..
            } => Some(SubtitleTrack::new(
                language_code.as_str(),
                label.as_str(),
                url.as_str(),
            )),
        }
    }
}

static LANGUAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"[/_-]([a-z]{2})[._-]",
        r"lang[=:]([a-z]{2})",
        r"/([a-z]{2})/",
        r"\.([a-z]{2})\.",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid language pattern"))
    .collect()
});

/// Stateless classifier. Deduplication lives in [`SubtitleCandidates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalCollector {
    subtitle_service_hosts: Vec<String>,
    manifest_suffixes: Vec<String>,
}

impl Default for SignalCollector {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl SignalCollector {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            subtitle_service_hosts: config
                .subtitle_service_hosts
                .iter()
                .map(|host| host.to_ascii_lowercase())
                .collect(),
            manifest_suffixes: config
                .manifest_suffixes
                .iter()
                .map(|suffix| suffix.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn observe(&self, event: ObservationEvent) -> Option<Signal> {
        match event {
            ObservationEvent::NetworkRequest { url } => self.classify_request(url),
            ObservationEvent::ScriptReport {
                language,
                label,
                url,
            } => classify_script_report(language, label, url),
        }
    }

    fn classify_request(&self, url: String) -> Option<Signal> {
        let url = url.trim().to_string();
        if is_unfetchable(&url) {
            engine_debug!("Dropping unfetchable reference: {}", url);
            return None;
        }
        let lowered = url.to_lowercase();

        if self
            .manifest_suffixes
            .iter()
            .any(|suffix| has_path_suffix(&lowered, suffix))
        {
            return Some(Signal::ManifestCandidate { url });
        }

        if self.is_subtitle_service(&url) {
            let language_code = service_language(&url);
            let label = format!("{} - {}", format_tag(&lowered), language_code.to_uppercase());
            return Some(Signal::SubtitleCandidate {
                language_code,
                label,
                url,
                source: SignalSource::SubtitleService,
            });
        }

        if has_path_suffix(&lowered, ".vtt") || has_path_suffix(&lowered, ".srt") {
            let language_code = infer_language(&url);
            let label = format!("{} - {}", format_tag(&lowered), language_code.to_uppercase());
            return Some(Signal::SubtitleCandidate {
                language_code,
                label,
                url,
                source: SignalSource::SubtitleFile,
            });
        }

        engine_trace!("Unrecognized request: {}", url);
        None
    }

    fn is_subtitle_service(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        else {
            return false;
        };
        self.subtitle_service_hosts
            .iter()
            .any(|known| host == *known || host.ends_with(&format!(".{known}")))
    }
}

fn classify_script_report(language: String, label: String, url: String) -> Option<Signal> {
    let url = url.trim().to_string();
    if url.is_empty() || is_unfetchable(&url) {
        engine_debug!("Dropping script-reported track without usable url: {:?}", url);
        return None;
    }
    let language_code = match language.trim() {
        "" => "unknown".to_string(),
        lang => lang.to_string(),
    };
    let label = match label.trim() {
        "" => language_code.to_uppercase(),
        label => label.to_string(),
    };
    Some(Signal::SubtitleCandidate {
        language_code,
        label,
        url,
        source: SignalSource::ScriptReport,
    })
}

/// Two-letter language guess from a subtitle URL, or a stable `track_<hash>`
/// identifier when nothing in the URL looks like a language code.
pub fn infer_language(url: &str) -> String {
    let lowered = url.to_lowercase();
    LANGUAGE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(&lowered))
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str().to_string())
        .unwrap_or_else(|| format!("track_{}", short_hash(url)))
}

fn service_language(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return infer_language(url);
    };
    if let Some((_, lang)) = parsed
        .query_pairs()
        .find(|(key, value)| key == "lang" && !value.is_empty())
    {
        return lang.to_lowercase();
    }
    let mut segments = parsed.path_segments().into_iter().flatten();
    while let Some(segment) = segments.next() {
        if segment == "id" {
            if let Some(id) = segments.next().filter(|id| !id.is_empty()) {
                return format!("track_{id}");
            }
        }
    }
    infer_language(url)
}

fn format_tag(lowered_url: &str) -> &'static str {
    if lowered_url.contains("format=srt") || has_path_suffix(lowered_url, ".srt") {
        "SRT"
    } else if lowered_url.contains("format=vtt") || has_path_suffix(lowered_url, ".vtt") {
        "VTT"
    } else {
        "SUB"
    }
}

/// Suffix match on the path part, ignoring any query string or fragment.
pub(crate) fn has_path_suffix(lowered_url: &str, suffix: &str) -> bool {
    let path_end = lowered_url.find(['?', '#']).unwrap_or(lowered_url.len());
    lowered_url[..path_end].ends_with(suffix)
}

fn is_unfetchable(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    lowered.starts_with("blob:") || lowered.starts_with("data:")
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Per-generation subtitle catalog keyed by language code.
///
/// A later candidate for an already known language replaces the earlier
/// track in place (last write wins, position of first sighting kept).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleCandidates {
    tracks: Vec<SubtitleTrack>,
}

impl SubtitleCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the catalog changed.
    pub fn insert(&mut self, track: SubtitleTrack) -> bool {
        match self
            .tracks
            .iter_mut()
            .find(|existing| existing.language_code == track.language_code)
        {
            Some(existing) if *existing == track => false,
            Some(existing) => {
                *existing = track;
                true
            }
            None => {
                self.tracks.push(track);
                true
            }
        }
    }

    pub fn tracks(&self) -> &[SubtitleTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
