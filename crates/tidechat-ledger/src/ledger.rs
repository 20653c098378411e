use async_trait::async_trait;

use crate::error::Result;
use crate::model::{ConversationSummary, ConversationTurn};

/// Capability interface for durable conversation transcripts.
///
/// One append-only transcript per `thread_id`. Implementations must tolerate
/// concurrent appends to *different* threads; the orchestrator guarantees at
/// most one in-flight append per thread, so intra-thread locking is not
/// required here.
#[async_trait]
pub trait ConversationLedger: Send + Sync {
    /// Append a turn to the thread's transcript. Returns the persisted
    /// location (store-specific identifier).
    async fn append_turn(&self, turn: ConversationTurn) -> Result<String>;

    /// Next turn number for a thread: count of turns in the thread's
    /// current transcript + 1, derived rather than kept as a counter. The
    /// derivation only spans the transcript the store currently associates
    /// with the thread; a store whose thread-to-transcript binding is
    /// process state (the file ledger) opens a fresh transcript after a
    /// restart and numbering starts over at 1 with it.
    async fn turn_number_for(&self, thread_id: &str) -> Result<u32>;

    async fn list(&self) -> Result<Vec<ConversationSummary>>;

    /// Full transcript content by identifier, or `None` if absent.
    async fn get(&self, id: &str) -> Result<Option<String>>;

    /// Delete a transcript. `Ok(false)` when the identifier is unknown.
    async fn delete(&self, id: &str) -> Result<bool>;
}
