use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/answer exchange, appended to a per-thread transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub thread_id: String,
    /// 1-based, derived as count-of-existing-turns + 1 by the caller.
    pub turn_number: u32,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploaded_files: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        thread_id: impl Into<String>,
        turn_number: u32,
        question: impl Into<String>,
        answer: impl Into<String>,
        uploaded_files: Vec<String>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            turn_number,
            question: question.into(),
            answer: answer.into(),
            uploaded_files,
            created_at: Utc::now(),
        }
    }
}

/// Listing entry for one saved transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Store-specific identifier, echoed back to `get`/`delete`.
    pub id: String,
    pub title: String,
    pub date: String,
    pub messages: u32,
}
