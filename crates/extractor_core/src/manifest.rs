//! HLS playlist inspection.
//!
//! Only what the session needs is read: subtitle renditions and variant
//! streams from a master playlist, segment URIs from a media playlist.
//! Everything else is skipped.

use std::collections::HashMap;

use engine_logging::engine_debug;
use thiserror::Error;
use url::Url;

use crate::merge::dedupe_by_url;
use crate::{StreamInfo, SubtitleTrack, VideoQuality};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManifestParseError {
    #[error("manifest is empty")]
    Empty,
    #[error("missing #EXTM3U header")]
    MissingHeader,
    #[error("playlist declares no variants, renditions or segments")]
    NoMediaContent,
}

/// Parse playlist text fetched from `manifest_url`.
///
/// `stream_url` of the result is always `manifest_url`; variant selection is
/// left to the player.
pub fn parse_manifest(manifest_url: &str, text: &str) -> Result<StreamInfo, ManifestParseError> {
    let mut lines = playlist_lines(text)?;

    let mut subtitle_tracks = Vec::new();
    let mut qualities = Vec::new();
    let mut has_segments = false;
    let mut has_renditions = false;

    while let Some(line) = lines.next() {
        if let Some(rest) = line.strip_prefix("#EXT-X-MEDIA:") {
            has_renditions = true;
            let attrs = parse_attributes(rest);
            if !attrs
                .get("TYPE")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("SUBTITLES"))
            {
                continue;
            }
            if let Some(track) = subtitle_rendition(manifest_url, &attrs) {
                subtitle_tracks.push(track);
            }
        } else if let Some(rest) = line.strip_prefix("#EXT-X-STREAM-INF:") {
            let attrs = parse_attributes(rest);
            let Some(uri_line) = lines.next_if(|next| !next.starts_with('#')) else {
                engine_debug!("Variant without URI line in {}", manifest_url);
                continue;
            };
            qualities.push(VideoQuality {
                bandwidth: attrs
                    .get("BANDWIDTH")
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(0),
                resolution: attrs.get("RESOLUTION").cloned(),
                url: resolve_uri(manifest_url, uri_line),
            });
        } else if !line.starts_with('#') {
            has_segments = true;
        }
    }

    if qualities.is_empty() && !has_renditions && !has_segments {
        return Err(ManifestParseError::NoMediaContent);
    }

    qualities.sort_by(|a, b| b.bandwidth.cmp(&a.bandwidth));

    Ok(StreamInfo {
        stream_url: manifest_url.to_string(),
        subtitle_tracks: dedupe_by_url(subtitle_tracks),
        qualities,
    })
}

/// Segment URIs of a media playlist, resolved against `playlist_url`.
pub fn segment_uris(playlist_url: &str, text: &str) -> Result<Vec<String>, ManifestParseError> {
    let lines = playlist_lines(text)?;
    let uris: Vec<String> = lines
        .filter(|line| !line.starts_with('#'))
        .map(|line| resolve_uri(playlist_url, line))
        .collect();
    if uris.is_empty() {
        return Err(ManifestParseError::NoMediaContent);
    }
    Ok(uris)
}

/// Quick check used before committing to playlist handling.
pub fn looks_like_playlist(text: &str) -> bool {
    text.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with("#EXTM3U")
}

fn playlist_lines(
    text: &str,
) -> Result<std::iter::Peekable<impl Iterator<Item = &str>>, ManifestParseError> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .peekable();
    match lines.next() {
        None => Err(ManifestParseError::Empty),
        Some(first) if first.starts_with("#EXTM3U") => Ok(lines),
        Some(_) => Err(ManifestParseError::MissingHeader),
    }
}

fn subtitle_rendition(manifest_url: &str, attrs: &HashMap<String, String>) -> Option<SubtitleTrack> {
    let Some(uri) = attrs.get("URI").filter(|uri| !uri.is_empty()) else {
        engine_debug!("Subtitle rendition without URI in {}", manifest_url);
        return None;
    };
    let language_code = attrs
        .get("LANGUAGE")
        .filter(|lang| !lang.is_empty())
        .map(|lang| lang.to_lowercase())
        .unwrap_or_else(|| "und".to_string());
    let label = attrs
        .get("NAME")
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| language_code.to_uppercase());
    Some(SubtitleTrack {
        language_code,
        label,
        url: resolve_uri(manifest_url, uri),
    })
}

/// Attribute list per RFC 8216 §4.2: `KEY=VALUE` pairs separated by commas,
/// where quoted values may themselves contain commas.
fn parse_attributes(input: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let key: String = chars.by_ref().take_while(|&c| c != '=').collect();
        let key = key.trim().trim_start_matches(',').trim().to_ascii_uppercase();

        let value = if chars.peek() == Some(&'"') {
            chars.next();
            let quoted: String = chars.by_ref().take_while(|&c| c != '"').collect();
            // Skip to the separator after the closing quote.
            for c in chars.by_ref() {
                if c == ',' {
                    break;
                }
            }
            quoted
        } else {
            chars.by_ref().take_while(|&c| c != ',').collect()
        };

        if !key.is_empty() {
            attrs.insert(key, value.trim().to_string());
        }
    }

    attrs
}

/// Resolve a playlist URI against its playlist. Unresolvable input is kept
/// verbatim rather than failing the whole playlist.
fn resolve_uri(base: &str, uri: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(uri)) {
        Ok(resolved) => resolved.to_string(),
        Err(err) => {
            engine_debug!("Could not resolve {} against {}: {}", uri, base, err);
            uri.to_string()
        }
    }
}
