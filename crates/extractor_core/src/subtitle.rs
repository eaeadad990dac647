//! SubRip and WebVTT parsing into time-ordered cues.
//!
//! Both parsers are block based and forgiving: a block that does not match
//! the grammar is skipped, the rest of the file still parses.

use std::sync::LazyLock;

use regex::Regex;

use crate::signal::has_path_suffix;
use crate::Cue;

const TIMING_SEPARATOR: &str = " --> ";
const VTT_HEADER: &str = "WEBVTT";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// `Vtt` when the content starts with `WEBVTT`, otherwise `Srt`.
    pub fn sniff(content: &str) -> Self {
        if strip_bom(content).starts_with(VTT_HEADER) {
            SubtitleFormat::Vtt
        } else {
            SubtitleFormat::Srt
        }
    }

    /// Hint from a subtitle URL: `format=` parameter first, then path suffix.
    pub fn from_url(url: &str) -> Option<Self> {
        let lowered = url.to_lowercase();
        if lowered.contains("format=vtt") {
            Some(SubtitleFormat::Vtt)
        } else if lowered.contains("format=srt") {
            Some(SubtitleFormat::Srt)
        } else if has_path_suffix(&lowered, ".vtt") {
            Some(SubtitleFormat::Vtt)
        } else if has_path_suffix(&lowered, ".srt") {
            Some(SubtitleFormat::Srt)
        } else {
            None
        }
    }
}

/// Parse with an explicit format, or sniff one when `hint` is `None`.
pub fn parse_subtitles(content: &str, hint: Option<SubtitleFormat>) -> Vec<Cue> {
    match hint.unwrap_or_else(|| SubtitleFormat::sniff(content)) {
        SubtitleFormat::Srt => parse_srt(content),
        SubtitleFormat::Vtt => parse_vtt(content),
    }
}

pub fn parse_srt(content: &str) -> Vec<Cue> {
    let normalized = normalize_newlines(strip_bom(content));
    let mut cues: Vec<Cue> = blocks(&normalized)
        .into_iter()
        .filter_map(|block| {
            // index, timing, text...
            if block.len() < 3 {
                return None;
            }
            let (start_ms, end_ms) = parse_timing(block[1], parse_srt_timestamp)?;
            Some(Cue::new(start_ms, end_ms, block[2..].join("\n")))
        })
        .collect();
    cues.sort_by_key(|cue| cue.start_ms);
    cues
}

pub fn parse_vtt(content: &str) -> Vec<Cue> {
    let content = strip_bom(content);
    if !content.starts_with(VTT_HEADER) {
        return Vec::new();
    }
    let normalized = normalize_newlines(content);
    let mut cues: Vec<Cue> = blocks(&normalized)
        .into_iter()
        .skip(1)
        .filter_map(|block| {
            if block.len() < 2 {
                return None;
            }
            // Optional cue identifier before the timing line.
            let (timing, text_lines) = if block[0].contains(TIMING_SEPARATOR) {
                (block[0], &block[1..])
            } else if block.len() >= 3 {
                (block[1], &block[2..])
            } else {
                return None;
            };
            let (start_ms, end_ms) = parse_timing(timing, parse_vtt_timestamp)?;
            let text = MARKUP_TAG.replace_all(&text_lines.join("\n"), "").into_owned();
            Some(Cue::new(start_ms, end_ms, unescape_entities(&text)))
        })
        .collect();
    cues.sort_by_key(|cue| cue.start_ms);
    cues
}

/// `HH:MM:SS,mmm` (a `.` separator is tolerated).
pub fn parse_srt_timestamp(input: &str) -> Option<u64> {
    let (clock, millis) = input.trim().rsplit_once([',', '.'])?;
    let parts: Vec<&str> = clock.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return None;
    };
    to_millis(hours, minutes, seconds, millis)
}

/// `HH:MM:SS.mmm` or `MM:SS.mmm`.
pub fn parse_vtt_timestamp(input: &str) -> Option<u64> {
    let (clock, millis) = input.trim().rsplit_once('.')?;
    let parts: Vec<&str> = clock.split(':').collect();
    match parts.as_slice() {
        [hours, minutes, seconds] => to_millis(hours, minutes, seconds, millis),
        [minutes, seconds] => to_millis("0", minutes, seconds, millis),
        _ => None,
    }
}

fn to_millis(hours: &str, minutes: &str, seconds: &str, millis: &str) -> Option<u64> {
    let hours = digits(hours, None)?;
    let minutes = digits(minutes, Some(2)).filter(|m| *m < 60)?;
    let seconds = digits(seconds, Some(2)).filter(|s| *s < 60)?;
    let millis = digits(millis, Some(3))?;
    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?
        .checked_mul(1000)?
        .checked_add(millis)
}

fn digits(field: &str, exact_len: Option<usize>) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if exact_len.is_some_and(|len| field.len() != len) {
        return None;
    }
    field.parse().ok()
}

/// Start and end of a timing line. Cue settings after the end timestamp are
/// ignored; cues that end before they start are rejected.
fn parse_timing(line: &str, timestamp: fn(&str) -> Option<u64>) -> Option<(u64, u64)> {
    let parts: Vec<&str> = line.split(TIMING_SEPARATOR).collect();
    let [start, end] = parts.as_slice() else {
        return None;
    };
    let start_ms = timestamp(start)?;
    let end_ms = timestamp(end.split_whitespace().next()?)?;
    (end_ms >= start_ms).then_some((start_ms, end_ms))
}

/// Groups of non-blank lines separated by blank (or whitespace-only) lines.
fn blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
