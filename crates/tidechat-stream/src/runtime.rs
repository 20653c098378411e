use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::events::AgentEvent;

/// Which agent graph to bind a run to: a small fast model or a deeper
/// reasoning one. Selection of model, prompt and toolset happens behind the
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProfile {
    Fast,
    Deep,
}

impl AgentProfile {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fast" => Some(AgentProfile::Fast),
            "deep" => Some(AgentProfile::Deep),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentProfile::Fast => "fast",
            AgentProfile::Deep => "deep",
        }
    }
}

/// Everything one agent run needs.
#[derive(Debug, Clone)]
pub struct AgentInput {
    pub thread_id: String,
    pub message: String,
    pub profile: AgentProfile,
    /// Forwarded to the tool backend; validated before the run starts.
    pub api_key: String,
}

/// Opaque async event source for agent runs.
///
/// Implementations spawn the run in the background and hand back a bounded
/// receiver; dropping the receiver cancels interest in the run and the
/// sender side unwinds on the closed channel. A mid-run failure is surfaced
/// once as an `Err` item; runs are never retried here.
pub trait AgentRuntime: Send + Sync {
    fn spawn_run(&self, input: AgentInput) -> mpsc::Receiver<Result<AgentEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parse() {
        assert_eq!(AgentProfile::parse("fast"), Some(AgentProfile::Fast));
        assert_eq!(AgentProfile::parse("deep"), Some(AgentProfile::Deep));
        assert_eq!(AgentProfile::parse("slow"), None);
        assert_eq!(AgentProfile::parse("Fast"), None);
    }
}
