use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::{LedgerError, Result};
use crate::ledger::ConversationLedger;
use crate::model::{ConversationSummary, ConversationTurn};

const TITLE_PREFIX: &str = "# Conversation: ";
const DATE_PREFIX: &str = "Started: ";
const FILES_PREFIX: &str = "Attached files: ";
const QUESTION_HEADER: &str = "## Question ";

const MAX_SLUG_CHARS: usize = 50;
const MAX_TITLE_CHARS: usize = 100;
const MAX_SUMMARY_TITLE_CHARS: usize = 50;

/// Flat-file transcript store: one Markdown file per thread, named
/// `<timestamp>_<slug-of-first-question>.md`, appended turn by turn.
///
/// The thread-to-filename map is process state: a restart forgets which
/// file a thread was writing to, so the next turn opens a fresh file and
/// numbers from 1. Within a file, turn numbers are derived from the
/// content rather than counted in memory.
pub struct FileLedger {
    root: PathBuf,
    active: RwLock<HashMap<String, String>>,
}

impl FileLedger {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            active: RwLock::new(HashMap::new()),
        })
    }

    /// Filename-safe slug: alphanumerics kept, spaces become underscores,
    /// truncated to `MAX_SLUG_CHARS` characters.
    fn slug(text: &str) -> String {
        let clean: String = text
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();
        clean
            .chars()
            .take(MAX_SLUG_CHARS)
            .collect::<String>()
            .trim_matches('_')
            .to_string()
    }

    async fn filename_for(&self, thread_id: &str, first_question: &str) -> String {
        if let Some(name) = self.active.read().await.get(thread_id) {
            return name.clone();
        }
        let mut active = self.active.write().await;
        if let Some(name) = active.get(thread_id) {
            return name.clone();
        }
        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("{timestamp}_{}.md", Self::slug(first_question));
        active.insert(thread_id.to_string(), name.clone());
        name
    }

    /// Identifiers are bare filenames; anything path-like is not ours.
    fn is_valid_id(id: &str) -> bool {
        !id.is_empty() && !id.contains('/') && !id.contains('\\') && !id.contains('\0')
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut t: String = text.chars().take(max_chars).collect();
        t.push_str("...");
        t
    } else {
        text.to_string()
    }
}

fn count_turns(content: &str) -> u32 {
    content.matches(QUESTION_HEADER).count() as u32
}

#[async_trait]
impl ConversationLedger for FileLedger {
    async fn append_turn(&self, turn: ConversationTurn) -> Result<String> {
        let filename = self.filename_for(&turn.thread_id, &turn.question).await;
        let path = self.root.join(&filename);
        let is_new = !fs::try_exists(&path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if is_new {
            let mut header = format!(
                "{TITLE_PREFIX}{}\n{DATE_PREFIX}{}\n\n",
                truncate(&turn.question, MAX_TITLE_CHARS),
                turn.created_at.format("%Y-%m-%d %H:%M:%S"),
            );
            if !turn.uploaded_files.is_empty() {
                header.push_str(&format!("{FILES_PREFIX}{}\n\n", turn.uploaded_files.join(", ")));
            }
            file.write_all(header.as_bytes()).await?;
        }

        let block = format!(
            "---\n\n{QUESTION_HEADER}{n}\n{q}\n\n## Answer {n}\n{a}\n\n",
            n = turn.turn_number,
            q = turn.question,
            a = turn.answer,
        );
        file.write_all(block.as_bytes()).await?;
        file.flush().await?;

        Ok(path.display().to_string())
    }

    async fn turn_number_for(&self, thread_id: &str) -> Result<u32> {
        let Some(filename) = self.active.read().await.get(thread_id).cloned() else {
            return Ok(1);
        };
        match fs::read_to_string(self.root.join(&filename)).await {
            Ok(content) => Ok(count_turns(&content) + 1),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(1),
            Err(e) => Err(LedgerError::Io(e)),
        }
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let mut summaries = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".md") {
                continue;
            }
            let content = match fs::read_to_string(entry.path()).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "skipping unreadable transcript");
                    continue;
                }
            };

            let mut title = "Untitled".to_string();
            let mut date = String::new();
            for line in content.lines() {
                if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
                    title = rest.trim().to_string();
                } else if let Some(rest) = line.strip_prefix(DATE_PREFIX) {
                    date = rest.trim().to_string();
                }
            }

            summaries.push(ConversationSummary {
                id: name,
                title: truncate(&title, MAX_SUMMARY_TITLE_CHARS),
                date,
                messages: count_turns(&content),
            });
        }

        // Timestamped filenames sort chronologically; newest first.
        summaries.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(summaries)
    }

    async fn get(&self, id: &str) -> Result<Option<String>> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }
        match fs::read_to_string(self.root.join(id)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::Io(e)),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if !Self::is_valid_id(id) {
            return Ok(false);
        }
        match fs::remove_file(self.root.join(id)).await {
            Ok(()) => {
                let mut active = self.active.write().await;
                active.retain(|_, filename| filename != id);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LedgerError::Io(e)),
        }
    }
}
