use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use seo_logging::{seo_debug, seo_error, seo_info};
use tokio_util::sync::CancellationToken;

use crate::stream::{AnalysisStreamer, ChannelEventSink, EventSink};
use crate::{EngineEvent, EngineStopped, StreamId, StreamParams};

enum EngineCommand {
    Open {
        stream_id: StreamId,
        params: StreamParams,
        delay: Duration,
    },
    Close {
        stream_id: StreamId,
    },
    Shutdown,
}

/// Owns the background runtime and the single open analysis stream.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(streamer: Arc<dyn AnalysisStreamer>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    seo_error!("failed to start engine runtime: {}", err);
                    return;
                }
            };
            run_commands(&runtime, streamer, cmd_rx, event_tx);
        });

        Self { cmd_tx, event_rx }
    }

    /// Opens `stream_id`, cancelling whatever stream is currently running.
    pub fn open(&self, stream_id: StreamId, params: StreamParams) {
        self.open_after(stream_id, params, Duration::ZERO);
    }

    /// Like [`EngineHandle::open`] but waits `delay` before connecting.
    pub fn open_after(&self, stream_id: StreamId, params: StreamParams, delay: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::Open {
            stream_id,
            params,
            delay,
        });
    }

    pub fn close(&self, stream_id: StreamId) {
        let _ = self.cmd_tx.send(EngineCommand::Close { stream_id });
    }

    /// Cancels any running stream and stops the background runtime.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    /// `Ok(None)` on timeout; `Err` once the runtime is gone and no events remain.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Running {
    stream_id: StreamId,
    cancel: CancellationToken,
}

fn run_commands(
    runtime: &tokio::runtime::Runtime,
    streamer: Arc<dyn AnalysisStreamer>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut running: Option<Running> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Open {
                stream_id,
                params,
                delay,
            } => {
                // Single-stream invariant: the previous task is cancelled first.
                if let Some(previous) = running.take() {
                    seo_debug!(
                        "cancelling stream {} before opening {}",
                        previous.stream_id,
                        stream_id
                    );
                    previous.cancel.cancel();
                }
                let cancel = CancellationToken::new();
                running = Some(Running {
                    stream_id,
                    cancel: cancel.clone(),
                });
                let streamer = streamer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    run_stream(streamer.as_ref(), stream_id, params, delay, cancel, event_tx).await;
                });
            }
            EngineCommand::Close { stream_id } => {
                if running.as_ref().is_some_and(|r| r.stream_id == stream_id) {
                    if let Some(current) = running.take() {
                        seo_info!("closing stream {}", stream_id);
                        current.cancel.cancel();
                    }
                }
            }
            EngineCommand::Shutdown => {
                if let Some(current) = running.take() {
                    current.cancel.cancel();
                }
                break;
            }
        }
    }
}

async fn run_stream(
    streamer: &dyn AnalysisStreamer,
    stream_id: StreamId,
    params: StreamParams,
    delay: Duration,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    if !delay.is_zero() {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let sink = ChannelEventSink::new(event_tx);
    match streamer.stream(stream_id, &params, &sink, cancel.clone()).await {
        Ok(()) => sink.emit(EngineEvent::Closed { stream_id }),
        // A cancelled stream may surface a transport error while tearing down.
        Err(_) if cancel.is_cancelled() => sink.emit(EngineEvent::Closed { stream_id }),
        Err(error) => sink.emit(EngineEvent::Failed { stream_id, error }),
    }
}
