//! Seam between the session and whatever actually watches the page.
//!
//! A real implementation drives a headless browser: it loads the page with
//! the referer set, intercepts network requests and inspects the player
//! config. The session only needs the resulting [`ObservationEvent`]s.

use engine_logging::engine_trace;
use extractor_core::{Generation, Msg, ObservationEvent};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Per-generation handle an observer reports through.
///
/// Events sent after the generation is cancelled are dropped here; stale
/// events that slip through are discarded again by the state machine.
#[derive(Debug, Clone)]
pub struct ObservationSink {
    generation: Generation,
    tx: UnboundedSender<Msg>,
    cancel: CancellationToken,
}

impl ObservationSink {
    pub(crate) fn new(
        generation: Generation,
        tx: UnboundedSender<Msg>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            generation,
            tx,
            cancel,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns `false` once the generation is cancelled or the session is gone.
    pub fn emit(&self, event: ObservationEvent) -> bool {
        if self.cancel.is_cancelled() {
            engine_trace!("{} cancelled; dropping {:?}", self.generation, event);
            return false;
        }
        self.tx
            .send(Msg::Observed {
                generation: self.generation,
                event,
            })
            .is_ok()
    }

    pub fn network_request(&self, url: impl Into<String>) -> bool {
        self.emit(ObservationEvent::NetworkRequest { url: url.into() })
    }

    pub fn script_report(
        &self,
        language: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> bool {
        self.emit(ObservationEvent::ScriptReport {
            language: language.into(),
            label: label.into(),
            url: url.into(),
        })
    }

    /// Report that the page could not be observed at all.
    pub fn fail(&self, message: impl Into<String>) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.tx.send(Msg::ObservationFailed {
            generation: self.generation,
            message: message.into(),
        });
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the generation is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

pub trait PageObserver: Send + Sync {
    /// Begin observing `page_url`. Must not block; long-running work belongs
    /// on a spawned task that reports through `sink` until it is cancelled.
    fn start(&self, page_url: &str, sink: ObservationSink);

    /// Stop observing for `generation`. The sink is already cancelled when
    /// this is called; implementations release browser resources here.
    fn cancel(&self, generation: Generation) {
        let _ = generation;
    }
}
