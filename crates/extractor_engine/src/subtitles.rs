use engine_logging::{engine_debug, engine_warn};
use extractor_core::{looks_like_playlist, segment_uris};

use crate::fetch::{fetch_text, Fetcher};
use crate::{FailureKind, FetchError};

/// Fetch the documents behind a subtitle track.
///
/// Plain SRT/VTT urls yield one document. A track that points at an HLS
/// media playlist yields one document per segment, fetched in order; failed
/// segments are skipped as long as at least one succeeds.
pub async fn load_subtitle_documents(
    fetcher: &dyn Fetcher,
    url: &str,
    referer: Option<&str>,
    max_segments: usize,
) -> Result<Vec<String>, FetchError> {
    let body = fetch_text(fetcher, url, referer).await?;
    if !looks_like_playlist(&body) {
        return Ok(vec![body]);
    }

    let mut segments = segment_uris(url, &body)
        .map_err(|err| FetchError::new(FailureKind::InvalidPlaylist, err.to_string()))?;
    if segments.len() > max_segments {
        engine_warn!(
            "Subtitle playlist {} has {} segments; keeping first {}",
            url,
            segments.len(),
            max_segments
        );
        segments.truncate(max_segments);
    }

    let mut documents = Vec::with_capacity(segments.len());
    let mut last_error = None;
    for segment in &segments {
        match fetch_text(fetcher, segment, referer).await {
            Ok(text) => documents.push(text),
            Err(err) => {
                engine_warn!("Skipping subtitle segment {}: {}", segment, err);
                last_error = Some(err);
            }
        }
    }
    engine_debug!(
        "Subtitle playlist {}: {}/{} segments fetched",
        url,
        documents.len(),
        segments.len()
    );

    match (documents.is_empty(), last_error) {
        (true, Some(err)) => Err(err),
        _ => Ok(documents),
    }
}
