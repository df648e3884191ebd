use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Key used when an agent result names no URL.
pub const DEFAULT_URL_KEY: &str = "default";

/// Structured payload of one agent for one URL.
pub type AgentResult = Map<String, Value>;

/// Nested mapping URL -> agent id -> merged result.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: BTreeMap<String, BTreeMap<String, AgentResult>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merges `partial` into the entry at `[url_key][agent_id]`.
    ///
    /// Keys present in `partial` overwrite existing keys; all other keys of
    /// the existing entry are kept.
    pub fn merge_agent_result(&mut self, url_key: &str, agent_id: &str, partial: AgentResult) {
        let entry = self
            .entries
            .entry(url_key.to_string())
            .or_default()
            .entry(agent_id.to_string())
            .or_default();
        for (key, value) in partial {
            entry.insert(key, value);
        }
    }

    pub fn get(&self, url_key: &str, agent_id: &str) -> Option<&AgentResult> {
        self.entries.get(url_key)?.get(agent_id)
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn agents(&self, url_key: &str) -> impl Iterator<Item = (&str, &AgentResult)> {
        self.entries
            .get(url_key)
            .into_iter()
            .flat_map(|agents| agents.iter().map(|(id, result)| (id.as_str(), result)))
    }

    /// Number of URL keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> AgentResult {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn merge_keeps_disjoint_fields() {
        let mut results = ResultSet::new();
        results.merge_agent_result("u", "meta", object(json!({"title": "A"})));
        results.merge_agent_result("u", "meta", object(json!({"formatted": {"ok": true}})));

        assert_eq!(
            Value::Object(results.get("u", "meta").unwrap().clone()),
            json!({"title": "A", "formatted": {"ok": true}})
        );
    }

    #[test]
    fn later_fields_win_on_collision() {
        let mut results = ResultSet::new();
        results.merge_agent_result("u", "meta", object(json!({"score": 1, "a": 1})));
        results.merge_agent_result("u", "meta", object(json!({"score": 2})));

        assert_eq!(
            Value::Object(results.get("u", "meta").unwrap().clone()),
            json!({"score": 2, "a": 1})
        );
    }

    #[test]
    fn serializes_as_nested_map() {
        let mut results = ResultSet::new();
        results.merge_agent_result(DEFAULT_URL_KEY, "crawl", object(json!({"pages": 3})));
        assert_eq!(results.to_json(), json!({"default": {"crawl": {"pages": 3}}}));
        assert_eq!(results.agents("default").count(), 1);
        assert_eq!(results.agents("missing").count(), 0);
    }
}
