use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::ToolPayload;

/// Placeholder for tool events that arrive without a name.
pub const UNKNOWN_TOOL: &str = "unknown_tool";

/// Semantic category of a tool invocation, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Search,
    Extract,
    Crawl,
}

impl ToolCategory {
    /// Case-sensitive substring match, checked in order; anything
    /// unrecognized is a search. Infallible by contract.
    pub fn classify(name: &str) -> Self {
        if name.contains("extract") {
            ToolCategory::Extract
        } else if name.contains("crawl") {
            ToolCategory::Crawl
        } else {
            ToolCategory::Search
        }
    }
}

/// Which side of the tool invocation a payload came from. Picks the
/// fallback placeholder when serialization gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Input,
    Output,
}

impl PayloadKind {
    fn fallback(self) -> &'static str {
        match self {
            PayloadKind::Input => "Unable to serialize input",
            PayloadKind::Output => "Unable to serialize output",
        }
    }
}

pub fn display_name(name: &str) -> &str {
    if name.is_empty() {
        UNKNOWN_TOOL
    } else {
        name
    }
}

/// Two-tier serialization of a tool payload into a JSON-safe value: a
/// fallible primary pass over the closed shape set, then the fixed
/// placeholder string. Never errors out of this function.
pub fn serialize_payload(payload: &ToolPayload, kind: PayloadKind) -> Value {
    match try_serialize(payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "tool payload not representable, using placeholder");
            Value::String(kind.fallback().to_string())
        }
    }
}

fn try_serialize(payload: &ToolPayload) -> Result<Value, serde_json::Error> {
    Ok(match payload {
        ToolPayload::Content { content } => Value::String(content.clone()),
        // Shallow: one level, keys preserved, every value stringified.
        ToolPayload::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), Value::String(stringify(v)?))))
                .collect::<Result<_, serde_json::Error>>()?,
        ),
        ToolPayload::List(items) => Value::Array(
            items
                .iter()
                .map(|v| Ok(Value::String(stringify(v)?)))
                .collect::<Result<_, serde_json::Error>>()?,
        ),
        ToolPayload::Value(value) => Value::String(stringify(value)?),
    })
}

fn stringify(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other),
    }
}
