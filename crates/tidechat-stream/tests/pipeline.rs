//! End-to-end tests for the orchestrator pipeline: scripted agent event
//! sources in, protocol frames and ledger appends out.

use std::sync::Arc;

use anyhow::anyhow;
use futures::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;

use async_trait::async_trait;
use tidechat_ledger::{
    ConversationLedger, ConversationSummary, ConversationTurn, LedgerError, MemoryLedger,
};
use tidechat_stream::{
    AgentEvent, Frame, StreamOrchestrator, ToolCategory, ToolPayload, TurnContext,
    DEFAULT_CHUNK_SIZE,
};

fn scripted(events: Vec<anyhow::Result<AgentEvent>>) -> mpsc::Receiver<anyhow::Result<AgentEvent>> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        for event in events {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });
    rx
}

fn token(content: &str, step: u32) -> AgentEvent {
    AgentEvent::GenerationToken {
        content: content.to_string(),
        step,
        source: "llm".to_string(),
    }
}

fn tool_start(name: &str, input: serde_json::Value) -> AgentEvent {
    AgentEvent::ToolStart {
        name: name.to_string(),
        input: serde_json::from_value::<ToolPayload>(input).unwrap(),
    }
}

fn tool_end(name: &str, output: serde_json::Value) -> AgentEvent {
    AgentEvent::ToolEnd {
        name: name.to_string(),
        output: serde_json::from_value::<ToolPayload>(output).unwrap(),
    }
}

/// Ledger whose writes always fail; `fail_numbering` breaks the turn-number
/// lookup as well.
struct FailingLedger {
    fail_numbering: bool,
}

#[async_trait]
impl ConversationLedger for FailingLedger {
    async fn append_turn(&self, _turn: ConversationTurn) -> Result<String, LedgerError> {
        Err(LedgerError::Internal("disk full".to_string()))
    }

    async fn turn_number_for(&self, _thread_id: &str) -> Result<u32, LedgerError> {
        if self.fail_numbering {
            Err(LedgerError::Internal("disk full".to_string()))
        } else {
            Ok(1)
        }
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, LedgerError> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: &str) -> Result<Option<String>, LedgerError> {
        Ok(None)
    }

    async fn delete(&self, _id: &str) -> Result<bool, LedgerError> {
        Ok(false)
    }
}

fn ctx(thread_id: &str, question: &str) -> TurnContext {
    TurnContext {
        run_id: "run-test".to_string(),
        thread_id: thread_id.to_string(),
        question: question.to_string(),
        uploaded_files: Vec::new(),
    }
}

async fn collect_frames(
    ledger: Arc<dyn ConversationLedger>,
    events: Vec<anyhow::Result<AgentEvent>>,
    ctx: TurnContext,
) -> Vec<Frame> {
    let orchestrator = StreamOrchestrator::new(ledger, DEFAULT_CHUNK_SIZE);
    orchestrator.run(scripted(events), ctx).collect().await
}

#[tokio::test]
async fn test_e2e_search_then_answer() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![
        Ok(tool_start("tavily_search", json!({"query": "capital of France"}))),
        Ok(tool_end("tavily_search", json!({"results": []}))),
        Ok(token("Thought: I should search.", 0)),
        Ok(token("Final Answer: Paris.\n", 1)),
    ];

    let frames = collect_frames(
        Arc::clone(&ledger) as Arc<dyn ConversationLedger>,
        events,
        ctx("t1", "What is the capital of France?"),
    )
    .await;

    assert_eq!(frames.len(), 3);
    match &frames[0] {
        Frame::ToolStart {
            tool_name,
            tool_type,
            operation_index,
            content,
        } => {
            assert_eq!(tool_name, "tavily_search");
            assert_eq!(*tool_type, ToolCategory::Search);
            assert_eq!(*operation_index, 0);
            assert_eq!(content, &json!({"query": "capital of France"}));
        }
        other => panic!("expected tool_start, got {other:?}"),
    }
    match &frames[1] {
        Frame::ToolEnd {
            operation_index,
            content,
            ..
        } => {
            assert_eq!(*operation_index, 0);
            assert_eq!(content, &json!({"results": "[]"}));
        }
        other => panic!("expected tool_end, got {other:?}"),
    }
    // "Paris." fits one chunk.
    assert_eq!(frames[2], Frame::chatbot("Paris."));

    let turns = ledger.turns("t1").await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].turn_number, 1);
    assert_eq!(turns[0].question, "What is the capital of France?");
    assert_eq!(turns[0].answer, "Paris.");
}

#[tokio::test]
async fn test_operation_indices_pair_positionally() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![
        Ok(tool_start("tavily_search", json!({"query": "a"}))),
        Ok(tool_start("tavily_extract", json!({"url": "b"}))),
        Ok(tool_end("tavily_search", json!("done"))),
        Ok(tool_end("tavily_extract", json!("done"))),
    ];

    let frames = collect_frames(ledger, events, ctx("t1", "q")).await;

    let indices: Vec<(bool, u32)> = frames
        .iter()
        .map(|f| match f {
            Frame::ToolStart {
                operation_index, ..
            } => (true, *operation_index),
            Frame::ToolEnd {
                operation_index, ..
            } => (false, *operation_index),
            other => panic!("unexpected frame {other:?}"),
        })
        .collect();
    assert_eq!(indices, vec![(true, 0), (true, 1), (false, 0), (false, 1)]);
}

#[tokio::test]
async fn test_tool_categories_flow_through_frames() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![
        Ok(tool_start("tavily_extract", json!({}))),
        Ok(tool_end("tavily_extract", json!("x"))),
        Ok(tool_start("web_crawl_tool", json!({}))),
        Ok(tool_end("web_crawl_tool", json!("y"))),
    ];

    let frames = collect_frames(ledger, events, ctx("t1", "q")).await;
    let categories: Vec<ToolCategory> = frames
        .iter()
        .map(|f| match f {
            Frame::ToolStart { tool_type, .. } | Frame::ToolEnd { tool_type, .. } => *tool_type,
            other => panic!("unexpected frame {other:?}"),
        })
        .collect();
    assert_eq!(
        categories,
        vec![
            ToolCategory::Extract,
            ToolCategory::Extract,
            ToolCategory::Crawl,
            ToolCategory::Crawl
        ]
    );
}

#[tokio::test]
async fn test_unnamed_tool_gets_placeholder_and_search_category() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![Ok(tool_start("", json!({})))];

    let frames = collect_frames(ledger, events, ctx("t1", "q")).await;
    match &frames[0] {
        Frame::ToolStart {
            tool_name,
            tool_type,
            ..
        } => {
            assert_eq!(tool_name, "unknown_tool");
            assert_eq!(*tool_type, ToolCategory::Search);
        }
        other => panic!("expected tool_start, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lower_step_tokens_never_reach_the_client() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![
        Ok(token("Thought: scratch ", 0)),
        Ok(token("Final ", 2)),
        Ok(token("more scratch", 1)),
        Ok(token("Answer: Blue.\n", 2)),
    ];

    let frames = collect_frames(Arc::clone(&ledger) as Arc<dyn ConversationLedger>, events, ctx("t1", "q")).await;

    assert_eq!(frames, vec![Frame::chatbot("Blue.")]);
    assert_eq!(ledger.turns("t1").await[0].answer, "Blue.");
}

#[tokio::test]
async fn test_long_answer_is_rechunked() {
    let ledger = Arc::new(MemoryLedger::new());
    let answer = "abcdefghijklmnopqrstuvwxy"; // 25 chars
    let events = vec![Ok(token(&format!("Final Answer: {answer}\n"), 1))];

    let frames = collect_frames(ledger, events, ctx("t1", "q")).await;

    assert_eq!(frames.len(), 3);
    let rebuilt: String = frames
        .iter()
        .map(|f| match f {
            Frame::Chatbot { content } => content.as_str(),
            other => panic!("unexpected frame {other:?}"),
        })
        .collect();
    assert_eq!(rebuilt, answer);
}

#[tokio::test]
async fn test_empty_stream_completes_without_frames_or_persistence() {
    let ledger = Arc::new(MemoryLedger::new());
    let frames = collect_frames(Arc::clone(&ledger) as Arc<dyn ConversationLedger>, vec![], ctx("t1", "q")).await;

    assert!(frames.is_empty());
    assert!(ledger.turns("t1").await.is_empty());
}

#[tokio::test]
async fn test_empty_tokens_are_ignored() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![
        Ok(token("", 1)),
        Ok(token("Final Answer: Ok.\n", 1)),
    ];

    let frames = collect_frames(ledger, events, ctx("t1", "q")).await;
    assert_eq!(frames, vec![Frame::chatbot("Ok.")]);
}

#[tokio::test]
async fn test_mid_stream_failure_emits_single_generic_error() {
    let ledger = Arc::new(MemoryLedger::new());
    let events = vec![
        Ok(tool_start("tavily_search", json!({"query": "a"}))),
        Ok(token("Final Answer: never delivered\n", 1)),
        Err(anyhow!("upstream connection reset")),
        Ok(token("after failure", 1)),
    ];

    let frames = collect_frames(Arc::clone(&ledger) as Arc<dyn ConversationLedger>, events, ctx("t1", "q")).await;

    assert_eq!(frames.len(), 2);
    assert!(matches!(frames[0], Frame::ToolStart { .. }));
    match &frames[1] {
        Frame::Error { content } => {
            assert_eq!(content, "An error occurred while processing your request");
            assert!(!content.contains("connection reset"));
        }
        other => panic!("expected error frame, got {other:?}"),
    }
    // No chatbot frames after an error, and no persistence attempt.
    assert!(ledger.turns("t1").await.is_empty());
}

#[tokio::test]
async fn test_persistence_failure_keeps_delivered_frames() {
    // Append failure and turn-number failure are both logged and swallowed;
    // the chatbot frames the client already received stay valid and the
    // stream still completes, never gaining an error frame.
    for fail_numbering in [false, true] {
        let ledger: Arc<dyn ConversationLedger> = Arc::new(FailingLedger { fail_numbering });
        let events = vec![Ok(token("Final Answer: Paris.\n", 1))];

        let frames = collect_frames(ledger, events, ctx("t1", "q")).await;

        assert_eq!(frames, vec![Frame::chatbot("Paris.")]);
    }
}

#[tokio::test]
async fn test_turn_numbers_advance_across_requests() {
    let ledger = Arc::new(MemoryLedger::new());

    for expected in 1..=2u32 {
        let events = vec![Ok(token("Final Answer: Hi.\n", 1))];
        let _ = collect_frames(Arc::clone(&ledger) as Arc<dyn ConversationLedger>, events, ctx("t7", "q")).await;
        let turns = ledger.turns("t7").await;
        assert_eq!(turns.last().unwrap().turn_number, expected);
    }

    assert_eq!(ledger.turn_number_for("t7").await.unwrap(), 3);
}
