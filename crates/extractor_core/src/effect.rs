use std::time::Duration;

use crate::{Generation, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartObservation {
        page_url: String,
        generation: Generation,
    },
    CancelObservation {
        generation: Generation,
    },
    FetchManifest {
        generation: Generation,
        url: String,
    },
    ScheduleTimeout {
        generation: Generation,
        after: Duration,
    },
    LoadSubtitle {
        request: RequestId,
        generation: Generation,
        url: String,
    },
}
