use std::collections::HashMap;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use extractor_core::{Effect, Generation, Msg, RequestId};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::fetch::{fetch_text, Fetcher};
use crate::observer::{ObservationSink, PageObserver};
use crate::subtitles::load_subtitle_documents;

/// Executes effects on the tokio runtime and feeds results back as messages.
///
/// Every generation owns a cancellation token; cancelling it stops the
/// observer and aborts the generation's in-flight fetches and timers.
pub struct EffectRunner {
    fetcher: Arc<dyn Fetcher>,
    observer: Arc<dyn PageObserver>,
    msg_tx: UnboundedSender<Msg>,
    referer: String,
    max_subtitle_segments: usize,
    generations: HashMap<Generation, CancellationToken>,
}

impl EffectRunner {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        observer: Arc<dyn PageObserver>,
        msg_tx: UnboundedSender<Msg>,
        referer: impl Into<String>,
        max_subtitle_segments: usize,
    ) -> Self {
        Self {
            fetcher,
            observer,
            msg_tx,
            referer: referer.into(),
            max_subtitle_segments,
            generations: HashMap::new(),
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartObservation {
                    page_url,
                    generation,
                } => {
                    engine_info!("StartObservation {} url={}", generation, page_url);
                    let token = self.token_for(generation);
                    let sink = ObservationSink::new(generation, self.msg_tx.clone(), token);
                    self.observer.start(&page_url, sink);
                }
                Effect::CancelObservation { generation } => {
                    engine_debug!("CancelObservation {}", generation);
                    if let Some(token) = self.generations.remove(&generation) {
                        token.cancel();
                    }
                    self.observer.cancel(generation);
                }
                Effect::FetchManifest { generation, url } => {
                    engine_info!("FetchManifest {} url={}", generation, url);
                    self.spawn_manifest_fetch(generation, url);
                }
                Effect::ScheduleTimeout { generation, after } => {
                    let token = self.token_for(generation);
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            _ = token.cancelled() => {}
                            _ = tokio::time::sleep(after) => {
                                let _ = msg_tx.send(Msg::TimeoutElapsed { generation });
                            }
                        }
                    });
                }
                Effect::LoadSubtitle {
                    request,
                    generation,
                    url,
                } => {
                    engine_info!("LoadSubtitle request={} url={}", request, url);
                    self.spawn_subtitle_load(request, generation, url);
                }
            }
        }
    }

    fn token_for(&mut self, generation: Generation) -> CancellationToken {
        self.generations.entry(generation).or_default().clone()
    }

    fn spawn_manifest_fetch(&mut self, generation: Generation, url: String) {
        let token = self.token_for(generation);
        let fetcher = Arc::clone(&self.fetcher);
        let msg_tx = self.msg_tx.clone();
        let referer = self.referer.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    engine_debug!("Manifest fetch for {} cancelled", generation);
                }
                result = fetch_text(fetcher.as_ref(), &url, Some(&referer)) => {
                    let result = result.map_err(|err| {
                        engine_warn!("Manifest fetch failed for {}: {}", url, err);
                        err.to_string()
                    });
                    let _ = msg_tx.send(Msg::ManifestFetched { generation, url, result });
                }
            }
        });
    }

    fn spawn_subtitle_load(&mut self, request: RequestId, generation: Generation, url: String) {
        let token = self.token_for(generation);
        let fetcher = Arc::clone(&self.fetcher);
        let msg_tx = self.msg_tx.clone();
        let referer = self.referer.clone();
        let max_segments = self.max_subtitle_segments;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    engine_debug!("Subtitle load {} cancelled", request);
                }
                result = load_subtitle_documents(fetcher.as_ref(), &url, Some(&referer), max_segments) => {
                    let result = result.map_err(|err| {
                        engine_warn!("Subtitle load failed for {}: {}", url, err);
                        err.to_string()
                    });
                    let _ = msg_tx.send(Msg::SubtitleFetched { request, url, result });
                }
            }
        });
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        for (generation, token) in self.generations.drain() {
            token.cancel();
            self.observer.cancel(generation);
        }
    }
}
