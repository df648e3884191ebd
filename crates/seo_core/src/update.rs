use seo_logging::{seo_debug, seo_info, seo_warn};
use serde_json::{Map, Value};

use crate::agents::with_required_agent;
use crate::classify::{is_credential_error, is_sitemap_target, CREDENTIAL_BANNER_MESSAGE};
use crate::results::{AgentResult, DEFAULT_URL_KEY};
use crate::{
    AnalysisEvent, AppState, Effect, LogKind, Msg, SessionStatus, StreamId, StreamRequest,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { target, agents } => start_analysis(&mut state, target, agents),
        Msg::AgentToggled { agent_id } => {
            state.selection_mut().toggle(&agent_id);
            Vec::new()
        }
        Msg::AgentsSelected(agent_ids) => {
            state.selection_mut().replace(agent_ids.as_slice());
            Vec::new()
        }
        Msg::TokenChanged(token) => {
            state.set_token(token);
            Vec::new()
        }
        Msg::StreamOpened { stream_id } => {
            if let Some(stream) = state.active_stream_mut().filter(|s| s.id == stream_id) {
                stream.reconnect_attempts = 0;
                seo_info!("stream {} connected", stream_id);
            }
            Vec::new()
        }
        Msg::StreamEvent { stream_id, event } => {
            if state.is_active(stream_id) {
                dispatch_event(&mut state, stream_id, event)
            } else {
                seo_debug!("dropping event for inactive stream {}", stream_id);
                Vec::new()
            }
        }
        Msg::StreamParseFailed { stream_id, message } => {
            if state.is_active(stream_id) {
                seo_warn!("malformed event on stream {}: {}", stream_id, message);
                state.record_parse_failure();
            }
            Vec::new()
        }
        Msg::StreamFailed { stream_id, message } => {
            if state.is_active(stream_id) {
                transport_failure(&mut state, stream_id, message)
            } else {
                Vec::new()
            }
        }
        Msg::BannerDismissed => {
            state.set_banner(None);
            Vec::new()
        }
        Msg::ViewClosed => state
            .release_stream()
            .map(|stream_id| vec![Effect::CloseStream { stream_id }])
            .unwrap_or_default(),
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_analysis(state: &mut AppState, target: String, agents: Vec<String>) -> Vec<Effect> {
    let target = target.trim().to_string();
    if target.is_empty() {
        state.append_log(LogKind::Warning, "Enter a URL or sitemap to analyze");
        return Vec::new();
    }
    if agents.iter().all(|agent| agent.trim().is_empty()) {
        state.append_log(LogKind::Warning, "Select at least one agent");
        return Vec::new();
    }

    let mut effects = Vec::with_capacity(2);
    // Close-before-open: the previous stream must be released before any reset.
    if let Some(stream_id) = state.release_stream() {
        effects.push(Effect::CloseStream { stream_id });
    }

    let request = StreamRequest {
        is_sitemap: is_sitemap_target(&target),
        target,
        agents: with_required_agent(agents),
        token: state.token().unwrap_or_default().to_string(),
    };
    let stream_id = state.begin_session(request.clone());
    seo_info!(
        "starting analysis stream {} target={} agents={} sitemap={}",
        stream_id,
        request.target,
        request.agents_param(),
        request.is_sitemap
    );
    effects.push(Effect::OpenStream { stream_id, request });
    effects
}

fn dispatch_event(state: &mut AppState, stream_id: StreamId, event: AnalysisEvent) -> Vec<Effect> {
    match event {
        AnalysisEvent::Progress { message, progress } => {
            let percent = progress.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8;
            state.set_progress(percent, message.clone());
            state.append_log(LogKind::Info, message);
        }
        AnalysisEvent::AgentStart { agent } => {
            state.append_log(LogKind::Info, format!("Starting {agent}..."));
        }
        AnalysisEvent::AgentComplete {
            agent,
            result,
            formatted,
            url,
        } => {
            state.append_log(LogKind::Success, format!("Completed {agent}"));
            if result.is_some() || formatted.is_some() {
                let url_key = url
                    .or_else(|| result_url(result.as_ref()))
                    .or_else(|| state.current_url().map(ToOwned::to_owned))
                    .unwrap_or_else(|| DEFAULT_URL_KEY.to_string());
                let partial = partial_result(result, formatted);
                state.merge_result(&url_key, &agent, partial);
            }
        }
        AnalysisEvent::AgentError { agent, message } => {
            state.append_log(LogKind::Error, format!("Error in {agent}: {message}"));
            if is_credential_error(&message) {
                state.set_banner(Some(message));
            }
        }
        AnalysisEvent::UrlProcessing { message } => {
            state.append_log(LogKind::Info, format!("Processing URL: {message}"));
            state.set_current_url(message);
        }
        AnalysisEvent::SitemapParsed { message } => {
            state.append_log(
                LogKind::Success,
                format!("Sitemap parsed: found {message} URLs"),
            );
        }
        AnalysisEvent::Complete => {
            let message = state.session().progress_message.clone();
            state.set_progress(100, message);
            state.set_status(SessionStatus::Completed);
            state.append_log(LogKind::Success, "Analysis complete!");
            return close_active(state, stream_id);
        }
        AnalysisEvent::Error { message } => {
            if is_credential_error(&message) {
                state.set_banner(Some(CREDENTIAL_BANNER_MESSAGE.to_string()));
                state.append_log(LogKind::Error, format!("Configuration error: {message}"));
            } else {
                state.append_log(LogKind::Error, format!("Error: {message}"));
            }
            state.set_status(SessionStatus::Failed);
            return close_active(state, stream_id);
        }
    }
    Vec::new()
}

fn transport_failure(state: &mut AppState, stream_id: StreamId, message: String) -> Vec<Effect> {
    let policy = state.reconnect_policy();
    let Some(stream) = state.active_stream_mut() else {
        return Vec::new();
    };

    if stream.reconnect_attempts < policy.max_attempts {
        stream.reconnect_attempts += 1;
        let attempt = stream.reconnect_attempts;
        let request = stream.request.clone();
        let delay = policy.delay_for(attempt);
        seo_warn!(
            "stream {} dropped ({}); reopening in {:?}",
            stream_id,
            message,
            delay
        );
        state.append_log(
            LogKind::Error,
            format!(
                "Connection error: {message}. Retrying ({attempt}/{})...",
                policy.max_attempts
            ),
        );
        return vec![Effect::ReopenStream {
            stream_id,
            request,
            delay,
        }];
    }

    state.append_log(
        LogKind::Error,
        format!(
            "Connection lost after {} retries: {message}",
            policy.max_attempts
        ),
    );
    state.set_status(SessionStatus::Failed);
    close_active(state, stream_id)
}

fn close_active(state: &mut AppState, stream_id: StreamId) -> Vec<Effect> {
    state.release_stream();
    vec![Effect::CloseStream { stream_id }]
}

fn result_url(result: Option<&Value>) -> Option<String> {
    result?.get("url")?.as_str().map(ToOwned::to_owned)
}

fn partial_result(result: Option<Value>, formatted: Option<Value>) -> AgentResult {
    let mut partial = match result {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    if let Some(formatted) = formatted {
        partial.insert("formatted".to_string(), formatted);
    }
    partial
}
