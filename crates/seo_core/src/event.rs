use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One typed event from the analysis stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    Progress {
        message: String,
        #[serde(default)]
        progress: Option<f64>,
    },
    AgentStart {
        agent: String,
    },
    AgentComplete {
        agent: String,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        formatted: Option<Value>,
        #[serde(default)]
        url: Option<String>,
    },
    AgentError {
        agent: String,
        message: String,
    },
    UrlProcessing {
        message: String,
    },
    SitemapParsed {
        #[serde(deserialize_with = "text_or_number")]
        message: String,
    },
    Complete,
    Error {
        message: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl AnalysisEvent {
    /// Validates one SSE `data` payload against the event schema.
    pub fn parse(data: &str) -> Result<Self, EventParseError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisEvent::Complete | AnalysisEvent::Error { .. })
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}
