use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::ToolCategory;

/// One outbound protocol frame, sent to the client as a newline-delimited
/// JSON object. Tool frames are emitted live during the agent run; `chatbot`
/// frames carry answer chunks after the run completes; `error` is terminal,
/// at most one per request, and mutually exclusive with `chatbot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    ToolStart {
        tool_name: String,
        tool_type: ToolCategory,
        operation_index: u32,
        content: Value,
    },
    ToolEnd {
        tool_name: String,
        tool_type: ToolCategory,
        operation_index: u32,
        content: Value,
    },
    Chatbot {
        content: String,
    },
    Error {
        content: String,
    },
}

impl Frame {
    pub fn chatbot(content: impl Into<String>) -> Self {
        Frame::Chatbot {
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Frame::Error {
            content: content.into(),
        }
    }
}
