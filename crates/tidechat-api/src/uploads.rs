//! Uploaded-file registry: an explicit process-wide service populated on
//! upload and read at stream-finalize time, injected through `AppState`.

use std::collections::HashMap;

use tokio::sync::RwLock;

#[derive(Default)]
pub struct UploadRegistry {
    files: RwLock<HashMap<String, String>>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, filename: String, content: String) {
        self.files.write().await.insert(filename, content);
    }

    /// Registered filenames, sorted for stable transcript headers.
    pub async fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn content(&self, filename: &str) -> Option<String> {
        self.files.read().await.get(filename).cloned()
    }
}

/// Lowercased extension including the dot, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
}

/// Executable payloads are rejected regardless of their extension.
pub fn looks_executable(bytes: &[u8]) -> bool {
    bytes.starts_with(b"MZ") || bytes.starts_with(b"\x7fELF")
}
