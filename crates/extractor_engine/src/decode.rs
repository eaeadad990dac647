use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// How the encoding of a playlist or subtitle body was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    ByteOrderMark,
    /// `charset=` parameter of the response's Content-Type.
    Declared,
    Detected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
    pub source: EncodingSource,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{encoding} body contains malformed byte sequences")]
    Malformed { encoding: String },
}

/// Turn a fetched body into text.
///
/// Playlists are UTF-8 by definition, but subtitle files are often legacy
/// single-byte encodings served without a charset. A BOM is trusted first,
/// then the declared charset, then detection. The BOM never survives into
/// the text, so `WEBVTT` and `#EXTM3U` sniffing sees the first real byte.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    let (encoding, source) = if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        (encoding, EncodingSource::ByteOrderMark)
    } else if let Some(encoding) = content_type
        .and_then(declared_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        (encoding, EncodingSource::Declared)
    } else {
        (detect(bytes), EncodingSource::Detected)
    };

    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        return Err(DecodeError::Malformed {
            encoding: used.name().to_string(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
        source,
    })
}

fn detect(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn declared_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}
