use std::time::Duration;

use serde::Serialize;

use crate::activity::{Clock, LogAccumulator, LogEntry, LogKind};
use crate::agents::AgentSelection;
use crate::results::{AgentResult, ResultSet};
use crate::view_model::AppViewModel;
use crate::StreamRequest;

pub type StreamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Session {
    pub status: SessionStatus,
    pub progress_percent: u8,
    pub progress_message: String,
}

/// How often and how fast a dropped stream is reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    /// Exponential backoff for the 1-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveStream {
    pub(crate) id: StreamId,
    pub(crate) request: StreamRequest,
    pub(crate) reconnect_attempts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    session: Session,
    log: LogAccumulator,
    results: ResultSet,
    banner: Option<String>,
    selection: AgentSelection,
    token: Option<String>,
    active_stream: Option<ActiveStream>,
    current_url: Option<String>,
    last_stream_id: StreamId,
    reconnect: ReconnectPolicy,
    parse_failures: u32,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            log: LogAccumulator::default(),
            results: ResultSet::default(),
            banner: None,
            selection: AgentSelection::default(),
            token: None,
            active_stream: None,
            current_url: None,
            last_stream_id: 0,
            reconnect: ReconnectPolicy::default(),
            parse_failures: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.log = LogAccumulator::new(clock);
        self
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            status: self.session.status,
            progress_percent: self.session.progress_percent,
            progress_message: self.session.progress_message.clone(),
            log: self.log.entries().to_vec(),
            results: self.results.clone(),
            banner: self.banner.clone(),
            selected_agents: self.selection.ids(),
            active_stream: self.active_stream_id(),
            signed_in: self.token.is_some(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn selection(&self) -> &AgentSelection {
        &self.selection
    }

    pub fn active_stream_id(&self) -> Option<StreamId> {
        self.active_stream.as_ref().map(|stream| stream.id)
    }

    pub fn parse_failures(&self) -> u32 {
        self.parse_failures
    }

    pub(crate) fn reconnect_policy(&self) -> ReconnectPolicy {
        self.reconnect
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn is_active(&self, stream_id: StreamId) -> bool {
        self.active_stream_id() == Some(stream_id)
    }

    pub(crate) fn active_stream_mut(&mut self) -> Option<&mut ActiveStream> {
        self.active_stream.as_mut()
    }

    /// URL that results without an explicit URL are filed under.
    pub(crate) fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub(crate) fn set_current_url(&mut self, url: String) {
        self.current_url = Some(url);
    }

    pub(crate) fn set_token(&mut self, token: Option<String>) {
        if self.token != token {
            self.token = token;
            self.dirty = true;
        }
    }

    pub(crate) fn selection_mut(&mut self) -> &mut AgentSelection {
        self.dirty = true;
        &mut self.selection
    }

    /// Clears all per-session data and starts tracking a fresh stream.
    pub(crate) fn begin_session(&mut self, request: StreamRequest) -> StreamId {
        self.log.clear();
        self.results.clear();
        self.banner = None;
        self.parse_failures = 0;
        self.current_url = (!request.is_sitemap).then(|| request.target.clone());
        self.session = Session {
            status: SessionStatus::Running,
            progress_percent: 0,
            progress_message: String::new(),
        };
        self.last_stream_id += 1;
        let id = self.last_stream_id;
        self.active_stream = Some(ActiveStream {
            id,
            request,
            reconnect_attempts: 0,
        });
        self.dirty = true;
        id
    }

    /// Stops tracking the active stream; later events on it are ignored.
    pub(crate) fn release_stream(&mut self) -> Option<StreamId> {
        let released = self.active_stream.take().map(|stream| stream.id);
        if released.is_some() {
            self.dirty = true;
        }
        released
    }

    pub(crate) fn set_progress(&mut self, percent: u8, message: impl Into<String>) {
        self.session.progress_percent = percent;
        self.session.progress_message = message.into();
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.session.status = status;
        self.dirty = true;
    }

    pub(crate) fn append_log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.log.append(kind, message);
        self.dirty = true;
    }

    pub(crate) fn merge_result(&mut self, url_key: &str, agent_id: &str, partial: AgentResult) {
        self.results.merge_agent_result(url_key, agent_id, partial);
        self.dirty = true;
    }

    pub(crate) fn set_banner(&mut self, banner: Option<String>) {
        if self.banner != banner {
            self.banner = banner;
            self.dirty = true;
        }
    }

    pub(crate) fn record_parse_failure(&mut self) {
        self.parse_failures += 1;
    }
}
