use std::time::Duration;

use extractor_engine::{fetch_text, FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_body_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/master.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "#EXTM3U\nlow.m3u8\n",
            "application/vnd.apple.mpegurl",
        ))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/master.m3u8", server.uri());

    let output = fetcher.fetch(&url, None).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, output.metadata.original_url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(
        output.metadata.content_type.as_deref(),
        Some("application/vnd.apple.mpegurl")
    );
    assert_eq!(output.bytes, b"#EXTM3U\nlow.m3u8\n");
    assert_eq!(output.metadata.byte_len, output.bytes.len() as u64);
}

#[tokio::test]
async fn fetcher_sends_referer_of_embedding_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protected.m3u8"))
        .and(header("referer", "https://player.example.com/embed/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("#EXTM3U\n"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protected.m3u8"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/protected.m3u8", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(403));

    let text = fetch_text(&fetcher, &url, Some("https://player.example.com/embed/1"))
        .await
        .expect("referer accepted");
    assert_eq!(text, "#EXTM3U\n");
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_rejects_invalid_url() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher.fetch("not a url", None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large.srt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/plain")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/large.srt", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_enforces_allowed_content_types_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;
    let url = format!("{}/page", server.uri());

    let open = ReqwestFetcher::new(FetchSettings::default());
    assert!(open.fetch(&url, None).await.is_ok());

    let strict = ReqwestFetcher::new(FetchSettings {
        allowed_content_types: vec!["text/vtt".to_string()],
        ..FetchSettings::default()
    });
    let err = strict.fetch(&url, None).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "text/html".to_string()
        }
    );
}

#[tokio::test]
async fn fetch_text_decodes_declared_legacy_charset() {
    let server = MockServer::start().await;
    // "Café" in windows-1252.
    Mock::given(method("GET"))
        .and(path("/fr.srt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"Caf\xe9".to_vec(), "text/plain; charset=windows-1252"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/fr.srt", server.uri());

    let text = fetch_text(&fetcher, &url, None).await.expect("decoded");
    assert_eq!(text, "Café");
}
