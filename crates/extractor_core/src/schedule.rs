use crate::Cue;

/// Cue to display at `position_ms`, if any.
///
/// `cues` must be sorted by `start_ms` (as produced by the subtitle parsers).
/// With overlapping cues the earliest-starting one wins.
pub fn active_cue(cues: &[Cue], position_ms: u64) -> Option<&Cue> {
    let started = cues.partition_point(|cue| cue.start_ms <= position_ms);
    cues[..started].iter().find(|cue| cue.end_ms >= position_ms)
}
