use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::ledger::ConversationLedger;
use crate::model::{ConversationSummary, ConversationTurn};

/// In-memory transcript store keyed by thread id. Same contract as
/// [`crate::FileLedger`], no durability; intended for tests and local runs.
#[derive(Default)]
pub struct MemoryLedger {
    threads: RwLock<HashMap<String, Vec<ConversationTurn>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the turns recorded for a thread.
    pub async fn turns(&self, thread_id: &str) -> Vec<ConversationTurn> {
        self.threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationLedger for MemoryLedger {
    async fn append_turn(&self, turn: ConversationTurn) -> Result<String> {
        let thread_id = turn.thread_id.clone();
        let mut threads = self.threads.write().await;
        threads.entry(thread_id.clone()).or_default().push(turn);
        Ok(thread_id)
    }

    async fn turn_number_for(&self, thread_id: &str) -> Result<u32> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).map_or(0, |turns| turns.len()) as u32 + 1)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let threads = self.threads.read().await;
        let mut summaries: Vec<ConversationSummary> = threads
            .iter()
            .map(|(thread_id, turns)| ConversationSummary {
                id: thread_id.clone(),
                title: turns
                    .first()
                    .map(|t| t.question.clone())
                    .unwrap_or_else(|| "Untitled".to_string()),
                date: turns
                    .first()
                    .map(|t| t.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                messages: turns.len() as u32,
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    async fn get(&self, id: &str) -> Result<Option<String>> {
        let threads = self.threads.read().await;
        Ok(threads.get(id).map(|turns| {
            turns
                .iter()
                .map(|t| {
                    format!(
                        "## Question {n}\n{q}\n\n## Answer {n}\n{a}\n",
                        n = t.turn_number,
                        q = t.question,
                        a = t.answer,
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut threads = self.threads.write().await;
        Ok(threads.remove(id).is_some())
    }
}
