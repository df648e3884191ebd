//! SEO engine: analysis stream transport, backend REST client and local persistence.
mod api;
mod config;
mod engine;
mod filename;
mod persist;
mod sse;
mod stream;
mod types;

pub use api::{
    ApiClient, ApiError, ApiSettings, ArtifactFormat, AuthSession, BlogPost, BlogRequest,
    KeywordIdea, KeywordReport, KeywordRequest, ResultSummary, ResultVersion, User,
};
pub use config::{ClientConfig, ConfigError, DEFAULT_API_URL};
pub use engine::EngineHandle;
pub use filename::report_filename;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use sse::{SseDecoder, SseFrame};
pub use stream::{
    build_stream_url, AnalysisStreamer, ChannelEventSink, EventSink, ReqwestStreamer,
    StreamSettings, ANALYZE_STREAM_PATH,
};
pub use types::{
    EngineEvent, EngineStopped, StreamError, StreamErrorKind, StreamId, StreamParams,
};
