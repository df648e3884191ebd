use crate::{LogEntry, ResultSet, SessionStatus, StreamId};

/// Read-only snapshot handed to renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub status: SessionStatus,
    pub progress_percent: u8,
    pub progress_message: String,
    pub log: Vec<LogEntry>,
    pub results: ResultSet,
    pub banner: Option<String>,
    pub selected_agents: Vec<String>,
    pub active_stream: Option<StreamId>,
    pub signed_in: bool,
    pub dirty: bool,
}
