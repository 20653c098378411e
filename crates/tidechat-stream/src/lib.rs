pub mod aggregate;
pub mod chunk;
pub mod classify;
pub mod events;
pub mod extract;
pub mod frames;
pub mod orchestrator;
pub mod runtime;

pub use aggregate::{BufferedToken, StepAggregator};
pub use chunk::{chunks, AnswerChunks, DEFAULT_CHUNK_SIZE};
pub use classify::{serialize_payload, PayloadKind, ToolCategory, UNKNOWN_TOOL};
pub use events::{AgentEvent, ToolPayload};
pub use extract::extract_final_answer;
pub use frames::Frame;
pub use orchestrator::{StreamOrchestrator, TurnContext};
pub use runtime::{AgentInput, AgentProfile, AgentRuntime};
