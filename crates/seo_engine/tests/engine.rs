use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use seo_engine::{
    AnalysisStreamer, EngineEvent, EngineHandle, EngineStopped, EventSink, SseFrame, StreamError,
    StreamId, StreamParams,
};
use tokio_util::sync::CancellationToken;

/// Emits one frame, then either waits for cancellation or fails.
struct ScriptedStreamer {
    live: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait::async_trait]
impl AnalysisStreamer for ScriptedStreamer {
    async fn stream(
        &self,
        stream_id: StreamId,
        params: &StreamParams,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<(), StreamError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        sink.emit(EngineEvent::Opened { stream_id });
        sink.emit(EngineEvent::Frame {
            stream_id,
            frame: SseFrame {
                data: params.target.clone(),
                ..SseFrame::default()
            },
        });
        if self.fail {
            self.live.fetch_sub(1, Ordering::SeqCst);
            return Err(StreamError::EndedEarly);
        }
        cancel.cancelled().await;
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn params(target: &str) -> StreamParams {
    StreamParams {
        target: target.into(),
        agents: "crawl".into(),
        is_sitemap: false,
        token: String::new(),
    }
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(Duration::from_secs(5))
        .expect("engine running")
        .expect("engine event")
}

#[test]
fn opening_a_second_stream_cancels_the_first() {
    let live = Arc::new(AtomicUsize::new(0));
    let engine = EngineHandle::new(Arc::new(ScriptedStreamer {
        live: live.clone(),
        fail: false,
    }));

    engine.open(1, params("https://a.com"));
    assert_eq!(next_event(&engine), EngineEvent::Opened { stream_id: 1 });
    assert!(matches!(next_event(&engine), EngineEvent::Frame { stream_id: 1, .. }));

    engine.open(2, params("https://b.com"));
    let mut seen = Vec::new();
    while seen.len() < 3 {
        seen.push(next_event(&engine));
    }
    assert!(seen.contains(&EngineEvent::Closed { stream_id: 1 }));
    assert!(seen.contains(&EngineEvent::Opened { stream_id: 2 }));
    assert_eq!(live.load(Ordering::SeqCst), 1);

    engine.close(2);
    assert_eq!(next_event(&engine), EngineEvent::Closed { stream_id: 2 });
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn transport_failures_are_reported() {
    let engine = EngineHandle::new(Arc::new(ScriptedStreamer {
        live: Arc::new(AtomicUsize::new(0)),
        fail: true,
    }));

    engine.open(9, params("https://a.com"));
    assert_eq!(next_event(&engine), EngineEvent::Opened { stream_id: 9 });
    assert!(matches!(next_event(&engine), EngineEvent::Frame { stream_id: 9, .. }));
    assert_eq!(
        next_event(&engine),
        EngineEvent::Failed {
            stream_id: 9,
            error: StreamError::EndedEarly
        }
    );
}

#[test]
fn delayed_reopen_can_be_cancelled() {
    let engine = EngineHandle::new(Arc::new(ScriptedStreamer {
        live: Arc::new(AtomicUsize::new(0)),
        fail: false,
    }));

    engine.open_after(3, params("https://a.com"), Duration::from_secs(30));
    engine.close(3);
    assert_eq!(engine.recv_timeout(Duration::from_millis(200)), Ok(None));
}

#[test]
fn stopped_engine_reports_disconnection() {
    let live = Arc::new(AtomicUsize::new(0));
    let engine = EngineHandle::new(Arc::new(ScriptedStreamer {
        live: live.clone(),
        fail: false,
    }));

    engine.open(5, params("https://a.com"));
    assert_eq!(next_event(&engine), EngineEvent::Opened { stream_id: 5 });
    assert!(matches!(next_event(&engine), EngineEvent::Frame { stream_id: 5, .. }));

    engine.shutdown();
    let outcome = loop {
        match engine.recv_timeout(Duration::from_secs(5)) {
            // The cancelled stream may still report its close.
            Ok(Some(EngineEvent::Closed { stream_id: 5 })) => continue,
            other => break other,
        }
    };
    assert_eq!(outcome, Err(EngineStopped));
}
