//! SEO analysis core: pure session state machine and view-model helpers.
mod activity;
mod agents;
mod classify;
mod effect;
mod event;
mod msg;
mod results;
mod state;
mod update;
mod view_model;

pub use activity::{local_clock, Clock, LogAccumulator, LogEntry, LogKind};
pub use agents::{find_agent, AgentDescriptor, AgentSelection, AGENT_CATALOG, REQUIRED_AGENT};
pub use classify::{is_credential_error, is_sitemap_target, CREDENTIAL_BANNER_MESSAGE};
pub use effect::{Effect, StreamRequest};
pub use event::{AnalysisEvent, EventParseError};
pub use msg::Msg;
pub use results::{AgentResult, ResultSet, DEFAULT_URL_KEY};
pub use state::{AppState, ReconnectPolicy, Session, SessionStatus, StreamId};
pub use update::update;
pub use view_model::AppViewModel;
