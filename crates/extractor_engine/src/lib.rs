//! Async side of the extractor: HTTP fetching, subtitle loading and the
//! session driver that executes core effects.
mod decode;
mod effects;
mod fetch;
mod observer;
mod session;
mod subtitles;
mod types;

pub use decode::{decode_text, DecodeError, DecodedText, EncodingSource};
pub use effects::EffectRunner;
pub use fetch::{fetch_text, FetchSettings, Fetcher, ReqwestFetcher};
pub use observer::{ObservationSink, PageObserver};
pub use session::{EngineConfig, SessionHandle};
pub use subtitles::load_subtitle_documents;
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
