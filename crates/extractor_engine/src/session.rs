use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use extractor_core::{update, Cue, ExtractionConfig, Msg, PlayerViewModel, Session};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::effects::EffectRunner;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::observer::PageObserver;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub extraction: ExtractionConfig,
    /// Upper bound on segments fetched for one segmented subtitle track.
    pub max_subtitle_segments: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            extraction: ExtractionConfig::default(),
            max_subtitle_segments: 500,
        }
    }
}

/// Handle to one running player session.
///
/// The session itself lives on a driver task; the handle sends user intents
/// and reads the latest published [`PlayerViewModel`]. Dropping the handle
/// dismisses the session.
pub struct SessionHandle {
    msg_tx: mpsc::UnboundedSender<Msg>,
    view_rx: watch::Receiver<PlayerViewModel>,
    driver: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Start extracting `page_url` on the current tokio runtime.
    pub fn spawn(
        page_url: impl Into<String>,
        config: EngineConfig,
        observer: Arc<dyn PageObserver>,
    ) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::spawn_with_fetcher(page_url, config, observer, fetcher)
    }

    pub fn spawn_with_fetcher(
        page_url: impl Into<String>,
        config: EngineConfig,
        observer: Arc<dyn PageObserver>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (mut session, effects) = Session::start(page_url, config.extraction);
        session.consume_dirty();
        let (view_tx, view_rx) = watch::channel(session.view());

        let mut runner = EffectRunner::new(
            fetcher,
            observer,
            msg_tx.clone(),
            session.page_url(),
            config.max_subtitle_segments,
        );
        engine_info!("Session started for {}", session.page_url());
        runner.run(effects);

        let driver = tokio::spawn(drive(session, runner, msg_rx, view_tx));
        Self {
            msg_tx,
            view_rx,
            driver: Some(driver),
        }
    }

    pub fn retry(&self) {
        let _ = self.msg_tx.send(Msg::RetryClicked);
    }

    /// Select a subtitle track by url; `None` turns subtitles off.
    pub fn select_subtitle(&self, url: Option<&str>) {
        let _ = self.msg_tx.send(Msg::SubtitleSelected {
            url: url.map(str::to_string),
        });
    }

    pub fn dismiss(&self) {
        let _ = self.msg_tx.send(Msg::Dismissed);
    }

    /// Latest published view.
    pub fn view(&self) -> PlayerViewModel {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerViewModel> {
        self.view_rx.clone()
    }

    /// Cue to render at `position_ms` of playback, if any.
    pub fn active_cue(&self, position_ms: u64) -> Option<Cue> {
        self.view_rx.borrow().active_cue(position_ms).cloned()
    }

    /// Wait until the session has been dismissed and its driver has stopped.
    pub async fn closed(&mut self) {
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.driver.is_some() {
            let _ = self.msg_tx.send(Msg::Dismissed);
        }
    }
}

async fn drive(
    mut session: Session,
    mut runner: EffectRunner,
    mut msg_rx: mpsc::UnboundedReceiver<Msg>,
    view_tx: watch::Sender<PlayerViewModel>,
) {
    while let Some(msg) = msg_rx.recv().await {
        let (next, effects) = update(session, msg);
        session = next;
        runner.run(effects);
        if session.consume_dirty() {
            view_tx.send_replace(session.view());
        }
        if session.is_closed() {
            break;
        }
    }
    engine_debug!("Session driver for {} stopped", session.page_url());
}
