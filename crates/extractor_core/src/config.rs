use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Deadline from entering `Loading` until a manifest must have been seen.
    pub timeout: Duration,
    /// Hosts whose every request is a subtitle file, regardless of suffix.
    pub subtitle_service_hosts: Vec<String>,
    /// Path suffixes identifying an HLS manifest request.
    pub manifest_suffixes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            subtitle_service_hosts: vec!["sub.wyzie.ru".to_string()],
            manifest_suffixes: vec![".m3u8".to_string()],
        }
    }
}
