use std::fmt;

use crate::sse::SseFrame;

pub type StreamId = u64;

/// What the engine needs to subscribe to one analysis feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    pub target: String,
    /// Comma-joined agent ids.
    pub agents: String,
    pub is_sitemap: bool,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Opened {
        stream_id: StreamId,
    },
    Frame {
        stream_id: StreamId,
        frame: SseFrame,
    },
    Failed {
        stream_id: StreamId,
        error: StreamError,
    },
    /// The stream task ended after a close request.
    Closed {
        stream_id: StreamId,
    },
}

/// The engine thread exited; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("analysis engine stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("invalid stream url: {0}")]
    InvalidUrl(String),
    #[error("server responded with status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("unexpected content type {0}")]
    UnexpectedContentType(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("stream ended without completion")]
    EndedEarly,
}

impl StreamError {
    pub fn kind(&self) -> StreamErrorKind {
        match self {
            StreamError::InvalidUrl(_) => StreamErrorKind::InvalidUrl,
            StreamError::HttpStatus { status, .. } => StreamErrorKind::HttpStatus(*status),
            StreamError::UnexpectedContentType(_) => StreamErrorKind::UnexpectedContentType,
            StreamError::Network(_) => StreamErrorKind::Network,
            StreamError::EndedEarly => StreamErrorKind::EndedEarly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    InvalidUrl,
    HttpStatus(u16),
    UnexpectedContentType,
    Network,
    EndedEarly,
}

impl fmt::Display for StreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamErrorKind::InvalidUrl => write!(f, "invalid url"),
            StreamErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            StreamErrorKind::UnexpectedContentType => write!(f, "unexpected content type"),
            StreamErrorKind::Network => write!(f, "network error"),
            StreamErrorKind::EndedEarly => write!(f, "ended early"),
        }
    }
}
