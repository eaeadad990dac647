use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::manifest::parse_manifest;
use crate::state::{ExtractionState, PARSING_MESSAGE, TIMEOUT_MESSAGE};
use crate::subtitle::{parse_subtitles, SubtitleFormat};
use crate::{
    Cue, Effect, Generation, Msg, ObservationEvent, Session, Signal, StreamInfo, SubtitleStatus,
};

/// Pure update function: applies a message to the session and returns any effects.
pub fn update(mut session: Session, msg: Msg) -> (Session, Vec<Effect>) {
    if session.closed {
        engine_debug!("Session closed, dropping {:?}", msg);
        return (session, Vec::new());
    }

    let effects = match msg {
        Msg::Observed { generation, event } => {
            if !session.is_current(generation) {
                log_stale("observation", generation, &session);
                return (session, Vec::new());
            }
            on_observed(&mut session, event)
        }
        Msg::ObservationFailed {
            generation,
            message,
        } => {
            if !session.is_current(generation) {
                log_stale("observation failure", generation, &session);
                return (session, Vec::new());
            }
            // Once a manifest is known a stream can still be established.
            if session.state.is_loading() && session.manifest_url.is_none() {
                engine_warn!("Page observation failed for {}: {}", generation, message);
                session.state = ExtractionState::error(message);
                session.mark_dirty();
                vec![Effect::CancelObservation { generation }]
            } else {
                engine_debug!("Ignoring observation failure after manifest: {}", message);
                Vec::new()
            }
        }
        Msg::ManifestFetched {
            generation,
            url,
            result,
        } => {
            if !session.is_current(generation) {
                log_stale("manifest result", generation, &session);
                return (session, Vec::new());
            }
            on_manifest_fetched(&mut session, url, result);
            Vec::new()
        }
        Msg::TimeoutElapsed { generation } => {
            if !session.is_current(generation) {
                log_stale("timeout", generation, &session);
                return (session, Vec::new());
            }
            if session.state.is_loading() && session.manifest_url.is_none() {
                engine_warn!("No manifest observed within {:?}", session.config.timeout);
                session.state = ExtractionState::error(TIMEOUT_MESSAGE);
                session.mark_dirty();
                vec![Effect::CancelObservation { generation }]
            } else {
                Vec::new()
            }
        }
        Msg::RetryClicked => {
            let previous = session.generation;
            session.begin_next_generation();
            engine_info!("Retrying extraction: {} -> {}", previous, session.generation);
            let mut effects = vec![Effect::CancelObservation {
                generation: previous,
            }];
            effects.extend(session.generation_start_effects());
            effects
        }
        Msg::SubtitleSelected { url } => on_subtitle_selected(&mut session, url),
        Msg::SubtitleFetched {
            request,
            url,
            result,
        } => {
            if request != session.selection.request {
                engine_debug!("Dropping superseded subtitle load #{} for {}", request, url);
                return (session, Vec::new());
            }
            session.finish_subtitle_load(result.and_then(|documents| cues_from(&url, &documents)));
            Vec::new()
        }
        Msg::Dismissed => {
            engine_info!("Session dismissed at {}", session.generation);
            session.closed = true;
            session.mark_dirty();
            vec![Effect::CancelObservation {
                generation: session.generation,
            }]
        }
        Msg::NoOp => Vec::new(),
    };

    (session, effects)
}

fn on_observed(session: &mut Session, event: ObservationEvent) -> Vec<Effect> {
    if matches!(session.state, ExtractionState::Error { .. }) {
        return Vec::new();
    }
    let Some(signal) = session.collector.observe(event) else {
        return Vec::new();
    };

    match signal {
        Signal::ManifestCandidate { url } => {
            if let Some(accepted) = &session.manifest_url {
                // First manifest wins, even if a later one would be the real stream.
                engine_debug!("Ignoring manifest {} (already have {})", url, accepted);
                return Vec::new();
            }
            engine_info!("Manifest candidate for {}: {}", session.generation, url);
            session.manifest_url = Some(url.clone());
            session.state = ExtractionState::loading(PARSING_MESSAGE);
            session.mark_dirty();
            vec![Effect::FetchManifest {
                generation: session.generation,
                url,
            }]
        }
        signal @ Signal::SubtitleCandidate { .. } => {
            let Some(track) = signal.subtitle_track() else {
                return Vec::new();
            };
            engine_debug!("Subtitle candidate {} -> {}", track.language_code, track.url);
            if session.candidates.insert(track) {
                let merged = session.merged_tracks();
                if let ExtractionState::Playing(info) = &mut session.state {
                    info.subtitle_tracks = merged;
                }
                session.mark_dirty();
            }
            Vec::new()
        }
    }
}

fn on_manifest_fetched(session: &mut Session, url: String, result: Result<String, String>) {
    if !session.state.is_loading() {
        engine_debug!("Manifest result after leaving Loading, dropping {}", url);
        return;
    }
    if session.manifest_url.as_deref() != Some(url.as_str()) {
        engine_debug!("Manifest result for unexpected url {}", url);
        return;
    }

    let parsed = result.and_then(|text| parse_manifest(&url, &text).map_err(|err| err.to_string()));
    let info = match parsed {
        Ok(info) => {
            engine_info!(
                "Parsed manifest: {} subtitle tracks, {} variants",
                info.subtitle_tracks.len(),
                info.qualities.len()
            );
            session.manifest_tracks = info.subtitle_tracks;
            StreamInfo {
                stream_url: url,
                subtitle_tracks: session.merged_tracks(),
                qualities: info.qualities,
            }
        }
        Err(message) => {
            engine_warn!("Manifest unusable ({}), playing raw url {}", message, url);
            session.manifest_tracks.clear();
            StreamInfo::new(url, session.merged_tracks())
        }
    };
    session.state = ExtractionState::Playing(info);
    session.mark_dirty();
}

fn on_subtitle_selected(session: &mut Session, url: Option<String>) -> Vec<Effect> {
    let Some(url) = url else {
        if session.selection.track.is_some() {
            session.next_subtitle_request(None);
        }
        return Vec::new();
    };

    let ExtractionState::Playing(info) = &session.state else {
        engine_warn!("Subtitle selected before playback: {}", url);
        return Vec::new();
    };
    let Some(track) = info.subtitle_tracks.iter().find(|t| t.url == url).cloned() else {
        engine_warn!("Unknown subtitle track selected: {}", url);
        return Vec::new();
    };
    if session.selection.track.as_ref() == Some(&track)
        && !matches!(session.selection.status, SubtitleStatus::Failed { .. })
    {
        return Vec::new();
    }

    let request = session.next_subtitle_request(Some(track));
    vec![Effect::LoadSubtitle {
        request,
        generation: session.generation,
        url,
    }]
}

/// Parse every fetched document and merge the cues in start order.
fn cues_from(url: &str, documents: &[String]) -> Result<Vec<Cue>, String> {
    let hint = SubtitleFormat::from_url(url);
    let mut cues: Vec<Cue> = documents
        .iter()
        .flat_map(|document| {
            // Content sniffing overrides the url hint when it finds a WEBVTT header.
            let format = match SubtitleFormat::sniff(document) {
                SubtitleFormat::Vtt => SubtitleFormat::Vtt,
                SubtitleFormat::Srt => hint.unwrap_or(SubtitleFormat::Srt),
            };
            parse_subtitles(document, Some(format))
        })
        .collect();
    if cues.is_empty() {
        return Err(format!("no cues parsed from {url}"));
    }
    cues.sort_by(|a, b| {
        (a.start_ms, a.end_ms, &a.text).cmp(&(b.start_ms, b.end_ms, &b.text))
    });
    cues.dedup();
    engine_info!("Loaded {} subtitle cues from {}", cues.len(), url);
    Ok(cues)
}

fn log_stale(what: &str, generation: Generation, session: &Session) {
    engine_debug!(
        "Discarding stale {} from {} (current {})",
        what,
        generation,
        session.generation
    );
}
