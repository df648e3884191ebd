use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use seo_core::{AnalysisEvent, Effect, Msg, StreamRequest};
use seo_engine::{
    ClientConfig, EngineEvent, EngineHandle, EngineStopped, ReqwestStreamer, StreamParams,
};
use seo_logging::{seo_debug, seo_info, seo_warn};

/// Carries reducer effects to the engine and engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let streamer = ReqwestStreamer::new(config.stream_settings())?;
        Ok(Self::with_engine(EngineHandle::new(Arc::new(streamer))))
    }

    pub fn with_engine(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream { stream_id, request } => {
                    seo_info!(
                        "OpenStream stream_id={} target={} agents={}",
                        stream_id,
                        request.target,
                        request.agents_param()
                    );
                    self.engine.open(stream_id, stream_params(request));
                }
                Effect::ReopenStream {
                    stream_id,
                    request,
                    delay,
                } => {
                    seo_info!("ReopenStream stream_id={} delay={:?}", stream_id, delay);
                    self.engine
                        .open_after(stream_id, stream_params(request), delay);
                }
                Effect::CloseStream { stream_id } => {
                    seo_debug!("CloseStream stream_id={}", stream_id);
                    self.engine.close(stream_id);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn recv(&self, timeout: Duration) -> Result<Option<Msg>, EngineStopped> {
        Ok(self.engine.recv_timeout(timeout)?.map(map_event))
    }
}

fn stream_params(request: StreamRequest) -> StreamParams {
    StreamParams {
        agents: request.agents_param(),
        target: request.target,
        is_sitemap: request.is_sitemap,
        token: request.token,
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Opened { stream_id } => Msg::StreamOpened { stream_id },
        EngineEvent::Frame { stream_id, frame } => match AnalysisEvent::parse(&frame.data) {
            Ok(event) => Msg::StreamEvent { stream_id, event },
            Err(err) => Msg::StreamParseFailed {
                stream_id,
                message: err.to_string(),
            },
        },
        EngineEvent::Failed { stream_id, error } => {
            seo_warn!("Stream {} failed ({}): {}", stream_id, error.kind(), error);
            Msg::StreamFailed {
                stream_id,
                message: error.to_string(),
            }
        }
        EngineEvent::Closed { stream_id } => {
            seo_debug!("Stream {} closed", stream_id);
            Msg::NoOp
        }
    }
}
