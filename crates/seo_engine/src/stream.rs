use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use seo_logging::{seo_debug, seo_trace};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::sse::SseDecoder;
use crate::{EngineEvent, StreamError, StreamId, StreamParams};

pub const ANALYZE_STREAM_PATH: &str = "/api/analyze/stream";

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub api_base_url: String,
    pub connect_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Subscribes to the analysis feed and forwards every frame to `sink`.
///
/// Returns `Ok(())` only when `cancel` fired; a body that ends on its own is
/// reported as [`StreamError::EndedEarly`].
#[async_trait::async_trait]
pub trait AnalysisStreamer: Send + Sync {
    async fn stream(
        &self,
        stream_id: StreamId,
        params: &StreamParams,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStreamer {
    settings: StreamSettings,
    client: reqwest::Client,
}

impl ReqwestStreamer {
    pub fn new(settings: StreamSettings) -> Result<Self, StreamError> {
        // No overall timeout: an analysis may legitimately stream for minutes.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| StreamError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn stream_url(&self, params: &StreamParams) -> Result<Url, StreamError> {
        build_stream_url(&self.settings.api_base_url, params)
    }
}

pub fn build_stream_url(api_base_url: &str, params: &StreamParams) -> Result<Url, StreamError> {
    let base = api_base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}{ANALYZE_STREAM_PATH}"))
        .map_err(|err| StreamError::InvalidUrl(err.to_string()))?;
    url.query_pairs_mut()
        .append_pair("url", &params.target)
        .append_pair("agents", &params.agents)
        .append_pair("is_sitemap", if params.is_sitemap { "true" } else { "false" })
        .append_pair("token", &params.token);
    Ok(url)
}

#[async_trait::async_trait]
impl AnalysisStreamer for ReqwestStreamer {
    async fn stream(
        &self,
        stream_id: StreamId,
        params: &StreamParams,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<(), StreamError> {
        let url = self.stream_url(params)?;
        seo_debug!("opening stream {} at {}", stream_id, url.path());

        let send = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .bearer_auth(&params.token)
            .send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            response = send => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StreamError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            let mime = content_type.split(';').next().unwrap_or(content_type).trim();
            if !mime.eq_ignore_ascii_case("text/event-stream") {
                return Err(StreamError::UnexpectedContentType(content_type.to_string()));
            }
        }

        sink.emit(EngineEvent::Opened { stream_id });

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => {
                    seo_trace!("stream {} chunk of {} bytes", stream_id, bytes.len());
                    for frame in decoder.feed(&bytes) {
                        sink.emit(EngineEvent::Frame { stream_id, frame });
                    }
                }
                Some(Err(err)) => return Err(map_reqwest_error(err)),
                None => {
                    if let Some(frame) = decoder.finish() {
                        sink.emit(EngineEvent::Frame { stream_id, frame });
                    }
                    return Err(StreamError::EndedEarly);
                }
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StreamError {
    StreamError::Network(err.to_string())
}
