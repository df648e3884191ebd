use std::time::Duration;

use crate::StreamId;

/// Parameters of one analysis stream subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub target: String,
    pub agents: Vec<String>,
    pub is_sitemap: bool,
    pub token: String,
}

impl StreamRequest {
    /// Agent ids as the comma-joined list the backend expects.
    pub fn agents_param(&self) -> String {
        self.agents.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenStream {
        stream_id: StreamId,
        request: StreamRequest,
    },
    /// Reconnect a dropped stream after `delay`, keeping its id.
    ReopenStream {
        stream_id: StreamId,
        request: StreamRequest,
        delay: Duration,
    },
    CloseStream {
        stream_id: StreamId,
    },
}
