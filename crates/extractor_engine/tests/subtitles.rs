use extractor_engine::{load_subtitle_documents, FailureKind, FetchSettings, ReqwestFetcher};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VTT_ONE: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nOne\n";
const VTT_TWO: &str = "WEBVTT\n\n00:00:03.000 --> 00:00:04.000\nTwo\n";

async fn mount_text(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn plain_subtitle_file_is_one_document() {
    let server = MockServer::start().await;
    mount_text(&server, "/subs/en.vtt", VTT_ONE).await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/subs/en.vtt", server.uri());

    let documents = load_subtitle_documents(&fetcher, &url, None, 500)
        .await
        .expect("loaded");
    assert_eq!(documents, vec![VTT_ONE.to_string()]);
}

#[tokio::test]
async fn subtitle_playlist_fetches_segments_in_order() {
    let server = MockServer::start().await;
    mount_text(
        &server,
        "/hls/subs/en.m3u8",
        "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10,\nseg0.vtt\n#EXTINF:10,\nseg1.vtt\n#EXT-X-ENDLIST\n",
    )
    .await;
    mount_text(&server, "/hls/subs/seg0.vtt", VTT_ONE).await;
    mount_text(&server, "/hls/subs/seg1.vtt", VTT_TWO).await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/hls/subs/en.m3u8", server.uri());

    let documents = load_subtitle_documents(&fetcher, &url, None, 500)
        .await
        .expect("loaded");
    assert_eq!(documents, vec![VTT_ONE.to_string(), VTT_TWO.to_string()]);

    let capped = load_subtitle_documents(&fetcher, &url, None, 1)
        .await
        .expect("loaded");
    assert_eq!(capped, vec![VTT_ONE.to_string()]);
}

#[tokio::test]
async fn failed_segments_are_skipped_unless_all_fail() {
    let server = MockServer::start().await;
    mount_text(
        &server,
        "/partial.m3u8",
        "#EXTM3U\n#EXTINF:10,\nmissing.vtt\n#EXTINF:10,\nok.vtt\n",
    )
    .await;
    mount_text(&server, "/ok.vtt", VTT_TWO).await;
    mount_text(&server, "/broken.m3u8", "#EXTM3U\n#EXTINF:10,\nmissing.vtt\n").await;
    Mock::given(method("GET"))
        .and(path("/missing.vtt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());

    let partial = format!("{}/partial.m3u8", server.uri());
    let documents = load_subtitle_documents(&fetcher, &partial, None, 500)
        .await
        .expect("one segment survives");
    assert_eq!(documents, vec![VTT_TWO.to_string()]);

    let broken = format!("{}/broken.m3u8", server.uri());
    let err = load_subtitle_documents(&fetcher, &broken, None, 500)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn playlist_without_segments_is_invalid() {
    let server = MockServer::start().await;
    mount_text(&server, "/empty.m3u8", "#EXTM3U\n#EXT-X-ENDLIST\n").await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/empty.m3u8", server.uri());

    let err = load_subtitle_documents(&fetcher, &url, None, 500)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidPlaylist);
}
