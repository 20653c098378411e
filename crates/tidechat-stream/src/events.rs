use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event pulled from an agent run's event source.
///
/// The agent graph is an external collaborator; only the observable contract
/// matters here: token events carry a step indicator, tool events carry a
/// name and an arbitrary payload. Unknown event kinds collapse to `Other`
/// and are ignored by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A generation-token fragment tagged with the pass it belongs to.
    /// `step` groups tokens by model-invocation pass; it is not guaranteed
    /// monotonic across the whole stream.
    GenerationToken {
        content: String,
        step: u32,
        #[serde(default)]
        source: String,
    },

    ToolStart {
        name: String,
        #[serde(default)]
        input: ToolPayload,
    },

    ToolEnd {
        name: String,
        #[serde(default)]
        output: ToolPayload,
    },

    #[serde(other)]
    Other,
}

/// Closed set of tool payload shapes, tried in declaration order when
/// deserializing: an object exposing text content wins over a plain map,
/// then lists, then any other JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Content { content: String },
    Map(serde_json::Map<String, Value>),
    List(Vec<Value>),
    Value(Value),
}

impl Default for ToolPayload {
    fn default() -> Self {
        ToolPayload::Value(Value::Null)
    }
}
