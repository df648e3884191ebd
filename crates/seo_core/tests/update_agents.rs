use seo_core::{update, AppState, Msg, AGENT_CATALOG, REQUIRED_AGENT};

#[test]
fn deselecting_required_agent_is_noop() {
    let state = AppState::new();
    let before = state.selection().clone();

    let (next, effects) = update(
        state,
        Msg::AgentToggled {
            agent_id: REQUIRED_AGENT.to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(next.selection(), &before);
    assert!(next.view().selected_agents.contains(&REQUIRED_AGENT.to_string()));
}

#[test]
fn toggling_optional_agents_round_trips() {
    let (state, _) = update(
        AppState::new(),
        Msg::AgentToggled {
            agent_id: "schema".into(),
        },
    );
    assert!(!state.selection().contains("schema"));

    let (state, _) = update(
        state,
        Msg::AgentToggled {
            agent_id: "schema".into(),
        },
    );
    assert_eq!(state.view().selected_agents.len(), AGENT_CATALOG.len());
}

#[test]
fn replacing_selection_always_keeps_required_agent() {
    let (state, _) = update(AppState::new(), Msg::AgentsSelected(vec!["meta".into()]));
    assert_eq!(state.view().selected_agents, vec!["crawl", "meta"]);

    let (state, _) = update(state, Msg::AgentsSelected(Vec::new()));
    assert_eq!(state.view().selected_agents, vec!["crawl"]);
}
