use std::collections::BTreeSet;

use serde::Serialize;

/// The agent that produces the page data every other agent consumes.
pub const REQUIRED_AGENT: &str = "crawl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

pub const AGENT_CATALOG: &[AgentDescriptor] = &[
    AgentDescriptor {
        id: "crawl",
        name: "Web Crawler",
        description: "Fetches pages and extracts content, headings and links",
        required: true,
    },
    AgentDescriptor {
        id: "keyword",
        name: "Keyword Analyzer",
        description: "Extracts primary and secondary keywords with density scores",
        required: false,
    },
    AgentDescriptor {
        id: "meta",
        name: "Meta Tag Optimizer",
        description: "Audits title, description and Open Graph tags",
        required: false,
    },
    AgentDescriptor {
        id: "schema",
        name: "Schema Generator",
        description: "Suggests JSON-LD structured data for the page",
        required: false,
    },
    AgentDescriptor {
        id: "technical",
        name: "Technical SEO Auditor",
        description: "Checks canonical tags, robots directives and page performance hints",
        required: false,
    },
    AgentDescriptor {
        id: "content",
        name: "Content Quality Reviewer",
        description: "Scores readability and topical coverage",
        required: false,
    },
];

pub fn find_agent(id: &str) -> Option<&'static AgentDescriptor> {
    AGENT_CATALOG.iter().find(|agent| agent.id == id)
}

/// Set of catalog agents chosen for the next run. Always contains [`REQUIRED_AGENT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSelection {
    ids: BTreeSet<&'static str>,
}

impl AgentSelection {
    pub fn only_required() -> Self {
        let mut ids = BTreeSet::new();
        ids.insert(REQUIRED_AGENT);
        Self { ids }
    }

    /// Flips membership of `agent_id`. Returns whether the selection changed.
    pub fn toggle(&mut self, agent_id: &str) -> bool {
        let Some(agent) = find_agent(agent_id) else {
            return false;
        };
        if agent.required {
            return false;
        }
        if !self.ids.remove(agent.id) {
            self.ids.insert(agent.id);
        }
        true
    }

    /// Replaces the selection; unknown ids are dropped.
    pub fn replace<S: AsRef<str>>(&mut self, agent_ids: &[S]) {
        let mut next = Self::only_required();
        for id in agent_ids {
            if let Some(agent) = find_agent(id.as_ref()) {
                next.ids.insert(agent.id);
            }
        }
        *self = next;
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.ids.contains(agent_id)
    }

    /// Selected ids in catalog order.
    pub fn ids(&self) -> Vec<String> {
        AGENT_CATALOG
            .iter()
            .filter(|agent| self.ids.contains(agent.id))
            .map(|agent| agent.id.to_string())
            .collect()
    }
}

impl Default for AgentSelection {
    fn default() -> Self {
        Self {
            ids: AGENT_CATALOG.iter().map(|agent| agent.id).collect(),
        }
    }
}

/// Deduplicates `agents` preserving order and puts the required agent first.
pub(crate) fn with_required_agent(agents: Vec<String>) -> Vec<String> {
    let mut out = vec![REQUIRED_AGENT.to_string()];
    for agent in agents {
        let agent = agent.trim();
        if agent.is_empty() || out.iter().any(|existing| existing == agent) {
            continue;
        }
        out.push(agent.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_marks_only_crawl_required() {
        let required: Vec<_> = AGENT_CATALOG
            .iter()
            .filter(|a| a.required)
            .map(|a| a.id)
            .collect();
        assert_eq!(required, vec![REQUIRED_AGENT]);
    }

    #[test]
    fn toggle_cannot_remove_required_agent() {
        let mut selection = AgentSelection::default();
        assert!(!selection.toggle("crawl"));
        assert!(selection.contains("crawl"));

        assert!(selection.toggle("meta"));
        assert!(!selection.contains("meta"));
        assert!(selection.toggle("meta"));
        assert!(selection.contains("meta"));
    }

    #[test]
    fn replace_forces_required_and_drops_unknown() {
        let mut selection = AgentSelection::default();
        selection.replace(&["schema", "bogus"]);
        assert_eq!(selection.ids(), vec!["crawl", "schema"]);
    }

    #[test]
    fn required_agent_is_prepended_once() {
        let agents = with_required_agent(vec![
            "meta".into(),
            "crawl".into(),
            "meta".into(),
            " ".into(),
        ]);
        assert_eq!(agents, vec!["crawl", "meta"]);
    }
}
