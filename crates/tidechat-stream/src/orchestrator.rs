use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use futures::Stream;
use tokio::sync::mpsc;

use tidechat_ledger::{ConversationLedger, ConversationTurn};

use crate::aggregate::{BufferedToken, StepAggregator};
use crate::chunk::chunks;
use crate::classify::{display_name, serialize_payload, PayloadKind, ToolCategory};
use crate::events::AgentEvent;
use crate::extract::extract_final_answer;
use crate::frames::Frame;

/// User-safe message for any mid-stream failure. The underlying cause is
/// logged, never sent to the client.
const GENERIC_ERROR: &str = "An error occurred while processing your request";

/// Per-request context carried through to persistence.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub run_id: String,
    pub thread_id: String,
    pub question: String,
    pub uploaded_files: Vec<String>,
}

/// Request lifecycle phases. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Idle,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

/// Pairs tool start/end frames by arrival position: the index is assigned
/// when a start arrives and echoed by the end in the same ordinal position.
///
/// Pairing is positional, not by tool identity; if tools ever complete out
/// of order the echoed index belongs to a different invocation. Keying by a
/// per-invocation id from the event source is the upgrade path.
#[derive(Debug, Default)]
struct OperationCounter {
    started: u32,
    ended: u32,
}

impl OperationCounter {
    fn next_start(&mut self) -> u32 {
        let index = self.started;
        self.started += 1;
        index
    }

    fn next_end(&mut self) -> u32 {
        let index = self.ended;
        self.ended += 1;
        index
    }
}

/// Drives one pass over an agent run's event source and produces the
/// outbound frame stream.
///
/// Tool lifecycle frames are emitted immediately; generation tokens are
/// buffered per step and the visible answer is reconstructed and re-chunked
/// only after the source is exhausted. Each request gets its own aggregator
/// and operation counter; nothing here is shared across requests except the
/// ledger.
pub struct StreamOrchestrator {
    ledger: Arc<dyn ConversationLedger>,
    chunk_size: usize,
}

impl StreamOrchestrator {
    pub fn new(ledger: Arc<dyn ConversationLedger>, chunk_size: usize) -> Self {
        Self { ledger, chunk_size }
    }

    /// Consume the run's events and yield protocol frames in emission order.
    ///
    /// Dropping the returned stream stops the pull loop; the event receiver
    /// is released on every exit path, including cancellation.
    pub fn run(
        &self,
        events: mpsc::Receiver<Result<AgentEvent>>,
        ctx: TurnContext,
    ) -> Pin<Box<dyn Stream<Item = Frame> + Send>> {
        let ledger = Arc::clone(&self.ledger);
        let chunk_size = self.chunk_size;

        Box::pin(async_stream::stream! {
            let mut events = events;
            let mut phase = RunPhase::Idle;
            let mut aggregator = StepAggregator::new();
            let mut operations = OperationCounter::default();

            while let Some(event) = events.recv().await {
                if phase == RunPhase::Idle {
                    phase = RunPhase::Streaming;
                    tracing::debug!(run_id = %ctx.run_id, thread_id = %ctx.thread_id, "agent stream opened");
                }

                match event {
                    Ok(AgentEvent::GenerationToken { content, step, .. }) => {
                        if !content.is_empty() {
                            aggregator.ingest(BufferedToken { content, step });
                        }
                    }
                    Ok(AgentEvent::ToolStart { name, input }) => {
                        yield Frame::ToolStart {
                            tool_name: display_name(&name).to_string(),
                            tool_type: ToolCategory::classify(&name),
                            operation_index: operations.next_start(),
                            content: serialize_payload(&input, PayloadKind::Input),
                        };
                    }
                    Ok(AgentEvent::ToolEnd { name, output }) => {
                        // Classification is stateless per event, recomputed
                        // rather than cached from the paired start.
                        yield Frame::ToolEnd {
                            tool_name: display_name(&name).to_string(),
                            tool_type: ToolCategory::classify(&name),
                            operation_index: operations.next_end(),
                            content: serialize_payload(&output, PayloadKind::Output),
                        };
                    }
                    Ok(AgentEvent::Other) => {}
                    Err(e) => {
                        phase = RunPhase::Failed;
                        tracing::error!(
                            run_id = %ctx.run_id,
                            thread_id = %ctx.thread_id,
                            phase = ?phase,
                            error = %e,
                            "agent stream failed",
                        );
                        yield Frame::error(GENERIC_ERROR);
                        return;
                    }
                }
            }

            phase = RunPhase::Finalizing;
            tracing::debug!(run_id = %ctx.run_id, phase = ?phase, "agent stream exhausted");

            if !aggregator.is_empty() {
                let answer = extract_final_answer(&aggregator.finalize());
                for chunk in chunks(&answer, chunk_size) {
                    yield Frame::chatbot(chunk);
                }

                // Failure here is logged and swallowed: the frames the
                // client already received stay valid.
                match ledger.turn_number_for(&ctx.thread_id).await {
                    Ok(turn_number) => {
                        let turn = ConversationTurn::new(
                            ctx.thread_id.clone(),
                            turn_number,
                            ctx.question.clone(),
                            answer,
                            ctx.uploaded_files.clone(),
                        );
                        match ledger.append_turn(turn).await {
                            Ok(location) => tracing::info!(
                                thread_id = %ctx.thread_id,
                                turn_number,
                                location = %location,
                                "conversation turn saved",
                            ),
                            Err(e) => tracing::error!(
                                thread_id = %ctx.thread_id,
                                error = %e,
                                "failed to save conversation turn",
                            ),
                        }
                    }
                    Err(e) => tracing::error!(
                        thread_id = %ctx.thread_id,
                        error = %e,
                        "failed to derive turn number",
                    ),
                }
            }

            phase = RunPhase::Done;
            tracing::debug!(run_id = %ctx.run_id, phase = ?phase, "request complete");
        })
    }
}
