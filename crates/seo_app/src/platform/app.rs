use std::time::Duration;

use seo_core::{update, AppState, Msg, ReconnectPolicy, ResultSet, SessionStatus};
use seo_logging::seo_error;

use super::effects::EffectRunner;
use super::ui::render::{render, RenderCursor};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Inputs for one live analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub target: String,
    pub agents: Vec<String>,
    pub token: Option<String>,
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub status: SessionStatus,
    pub results: ResultSet,
    pub parse_failures: u32,
}

/// Drives the reducer with engine events and prints every change.
pub struct AnalysisApp<'a> {
    runner: &'a EffectRunner,
    state: AppState,
    cursor: RenderCursor,
    out: Box<dyn FnMut(String) + 'a>,
}

impl<'a> AnalysisApp<'a> {
    pub fn new(runner: &'a EffectRunner, max_reconnects: u32) -> Self {
        Self::with_output(runner, max_reconnects, Box::new(|line| println!("{line}")))
    }

    pub fn with_output(
        runner: &'a EffectRunner,
        max_reconnects: u32,
        out: Box<dyn FnMut(String) + 'a>,
    ) -> Self {
        let policy = ReconnectPolicy {
            max_attempts: max_reconnects,
            ..ReconnectPolicy::default()
        };
        Self {
            runner,
            state: AppState::new().with_reconnect_policy(policy),
            cursor: RenderCursor::default(),
            out,
        }
    }

    /// Blocks until the session reaches a terminal status.
    pub fn run(mut self, request: AnalysisRequest) -> AnalysisOutcome {
        self.dispatch_msg(Msg::TokenChanged(request.token));
        self.dispatch_msg(Msg::StartRequested {
            target: request.target,
            agents: request.agents,
        });

        while !self.is_finished() {
            match self.runner.recv(POLL_INTERVAL) {
                Ok(msg) => self.dispatch_msg(msg.unwrap_or(Msg::Tick)),
                Err(stopped) => {
                    seo_error!("{}", stopped);
                    // Each failure uses up a reconnect attempt, so this ends in `Failed`.
                    let Some(stream_id) = self.state.active_stream_id() else {
                        break;
                    };
                    self.dispatch_msg(Msg::StreamFailed {
                        stream_id,
                        message: stopped.to_string(),
                    });
                }
            }
        }

        let outcome = AnalysisOutcome {
            status: self.state.status(),
            results: self.state.results().clone(),
            parse_failures: self.state.parse_failures(),
        };
        self.dispatch_msg(Msg::ViewClosed);
        outcome
    }

    fn is_finished(&self) -> bool {
        // Rejected input never opens a stream.
        let never_started = self.state.status() == SessionStatus::Idle;
        (self.state.status().is_terminal() || never_started)
            && self.state.active_stream_id().is_none()
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        if let Msg::StreamEvent { stream_id, .. }
        | Msg::StreamFailed { stream_id, .. }
        | Msg::StreamOpened { stream_id } = &msg
        {
            seo_logging::set_stream_context(*stream_id);
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);

        if state.consume_dirty() {
            let view = state.view();
            for line in render(&view, &mut self.cursor) {
                (self.out)(line);
            }
        }
        self.state = state;
    }
}
