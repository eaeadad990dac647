use extractor_core::{
    infer_language, ExtractionConfig, ObservationEvent, Signal, SignalCollector, SignalSource,
    SubtitleCandidates, SubtitleTrack,
};
use pretty_assertions::assert_eq;

fn request(url: &str) -> ObservationEvent {
    ObservationEvent::NetworkRequest {
        url: url.to_string(),
    }
}

fn subtitle(language_code: &str, label: &str, url: &str, source: SignalSource) -> Signal {
    Signal::SubtitleCandidate {
        language_code: language_code.to_string(),
        label: label.to_string(),
        url: url.to_string(),
        source,
    }
}

#[test]
fn manifest_requests_are_recognized_with_or_without_query() {
    let collector = SignalCollector::default();
    for url in [
        "https://cdn.example.com/hls/master.m3u8",
        "https://cdn.example.com/hls/MASTER.M3U8?token=1&exp=2",
    ] {
        assert_eq!(
            collector.observe(request(url)),
            Some(Signal::ManifestCandidate {
                url: url.to_string()
            })
        );
    }
}

#[test]
fn subtitle_files_get_inferred_language_and_label() {
    let collector = SignalCollector::default();
    assert_eq!(
        collector.observe(request("https://cdn.example.com/subs/en.vtt?sig=x")),
        Some(subtitle(
            "en",
            "VTT - EN",
            "https://cdn.example.com/subs/en.vtt?sig=x",
            SignalSource::SubtitleFile
        ))
    );
    assert_eq!(
        collector.observe(request("https://cdn.example.com/tracks/movie_fr_1.srt")),
        Some(subtitle(
            "fr",
            "SRT - FR",
            "https://cdn.example.com/tracks/movie_fr_1.srt",
            SignalSource::SubtitleFile
        ))
    );
}

#[test]
fn manifest_match_takes_precedence_over_subtitles() {
    let collector = SignalCollector::default();
    let url = "https://sub.wyzie.ru/playlist/en/index.m3u8";
    assert_eq!(
        collector.observe(request(url)),
        Some(Signal::ManifestCandidate {
            url: url.to_string()
        })
    );
}

#[test]
fn subtitle_service_urls_use_lang_then_id() {
    let collector = SignalCollector::default();
    assert_eq!(
        collector.observe(request("https://sub.wyzie.ru/search?id=123&lang=PT&format=srt")),
        Some(subtitle(
            "pt",
            "SRT - PT",
            "https://sub.wyzie.ru/search?id=123&lang=PT&format=srt",
            SignalSource::SubtitleService
        ))
    );
    assert_eq!(
        collector.observe(request("https://sub.wyzie.ru/c/abc/id/98765?format=vtt")),
        Some(subtitle(
            "track_98765",
            "VTT - TRACK_98765",
            "https://sub.wyzie.ru/c/abc/id/98765?format=vtt",
            SignalSource::SubtitleService
        ))
    );
}

#[test]
fn configured_service_hosts_are_honoured() {
    let config = ExtractionConfig {
        subtitle_service_hosts: vec!["captions.example.org".to_string()],
        ..ExtractionConfig::default()
    };
    let collector = SignalCollector::new(&config);
    let signal = collector
        .observe(request("https://eu.captions.example.org/get?lang=de"))
        .expect("service signal");
    assert_eq!(signal.subtitle_track().unwrap().language_code, "de");
    assert_eq!(collector.observe(request("https://sub.wyzie.ru/get?lang=de")), None);
}

#[test]
fn script_reports_are_normalized() {
    let collector = SignalCollector::default();
    assert_eq!(
        collector.observe(ObservationEvent::ScriptReport {
            language: " ".to_string(),
            label: "".to_string(),
            url: "https://cdn.example.com/t/1".to_string(),
        }),
        Some(subtitle(
            "unknown",
            "UNKNOWN",
            "https://cdn.example.com/t/1",
            SignalSource::ScriptReport
        ))
    );
    assert_eq!(
        collector.observe(ObservationEvent::ScriptReport {
            language: "en".to_string(),
            label: "English".to_string(),
            url: "".to_string(),
        }),
        None
    );
}

#[test]
fn noise_and_unfetchable_references_are_dropped() {
    let collector = SignalCollector::default();
    for url in [
        "blob:https://player.example.com/1b2c3d",
        "data:text/vtt;base64,V0VCVlRU",
        "https://cdn.example.com/seg/000123.ts",
        "https://player.example.com/app.js",
        "not a url",
    ] {
        assert_eq!(collector.observe(request(url)), None, "{url}");
    }
}

#[test]
fn language_patterns_apply_in_order() {
    assert_eq!(infer_language("https://x.example/subs/movie-de-forced.vtt"), "de");
    assert_eq!(infer_language("https://x.example/get?lang=it"), "it");
    assert_eq!(infer_language("https://x.example/get?LANG:NL"), "nl");
    assert_eq!(infer_language("https://x.example/subs/es/file"), "es");
}

#[test]
fn hash_identifier_is_stable() {
    let url = "https://x.example/subtitle";
    let first = infer_language(url);
    assert!(first.starts_with("track_"), "{first}");
    assert_eq!(first.len(), "track_".len() + 8);
    assert_eq!(first, infer_language(url));
    assert_ne!(first, infer_language("https://x.example/another"));
}

#[test]
fn candidates_keep_last_write_per_language() {
    let mut candidates = SubtitleCandidates::new();
    assert!(candidates.insert(SubtitleTrack::new("en", "VTT - EN", "https://a.example/en.vtt")));
    assert!(candidates.insert(SubtitleTrack::new("fr", "VTT - FR", "https://a.example/fr.vtt")));
    assert!(candidates.insert(SubtitleTrack::new("en", "SRT - EN", "https://b.example/en.srt")));
    // Duplicate delivery is a no-op.
    assert!(!candidates.insert(SubtitleTrack::new("en", "SRT - EN", "https://b.example/en.srt")));

    assert_eq!(
        candidates.tracks(),
        &[
            SubtitleTrack::new("en", "SRT - EN", "https://b.example/en.srt"),
            SubtitleTrack::new("fr", "VTT - FR", "https://a.example/fr.vtt"),
        ]
    );
}
