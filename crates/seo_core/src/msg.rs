use crate::{AnalysisEvent, StreamId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a URL or sitemap for analysis.
    StartRequested { target: String, agents: Vec<String> },
    /// User clicked an agent checkbox.
    AgentToggled { agent_id: String },
    /// Selection restored or replaced wholesale.
    AgentsSelected(Vec<String>),
    /// Authorization credential changed (sign in / sign out).
    TokenChanged(Option<String>),
    /// Transport connected for a stream.
    StreamOpened { stream_id: StreamId },
    /// A validated event arrived on a stream.
    StreamEvent {
        stream_id: StreamId,
        event: AnalysisEvent,
    },
    /// An event payload failed validation.
    StreamParseFailed { stream_id: StreamId, message: String },
    /// Transport failed to open or dropped.
    StreamFailed { stream_id: StreamId, message: String },
    /// User dismissed the configuration banner.
    BannerDismissed,
    /// Hosting view is going away.
    ViewClosed,
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
