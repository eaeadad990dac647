use extractor_engine::{decode_text, EncodingSource};

#[test]
fn bom_wins_over_declared_charset() {
    let bytes = b"\xef\xbb\xbfWEBVTT\n";
    let decoded = decode_text(bytes, Some("text/vtt; charset=iso-8859-1")).expect("decoded");
    assert_eq!(decoded.source, EncodingSource::ByteOrderMark);
    assert_eq!(decoded.encoding_label, "UTF-8");
    assert_eq!(decoded.text, "WEBVTT\n");
}

#[test]
fn quoted_charset_parameter_is_honoured() {
    let decoded =
        decode_text(b"Gr\xfc\xdfe", Some("text/plain; Charset=\"windows-1252\"")).expect("decoded");
    assert_eq!(decoded.source, EncodingSource::Declared);
    assert_eq!(decoded.text, "Grüße");
}

#[test]
fn undeclared_bodies_are_detected() {
    let decoded = decode_text("Olá, mundo".as_bytes(), None).expect("decoded");
    assert_eq!(decoded.source, EncodingSource::Detected);
    assert_eq!(decoded.text, "Olá, mundo");

    let unknown_label = decode_text(b"#EXTM3U\n", Some("application/x-mpegurl; charset=bogus"))
        .expect("decoded");
    assert_eq!(unknown_label.source, EncodingSource::Detected);
    assert_eq!(unknown_label.text, "#EXTM3U\n");
}

#[test]
fn malformed_declared_utf8_is_an_error() {
    assert!(decode_text(b"caf\xe9", Some("text/vtt; charset=utf-8")).is_err());
}
