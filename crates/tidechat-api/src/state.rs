use std::sync::Arc;

use tidechat_ledger::ConversationLedger;
use tidechat_stream::AgentRuntime;

use crate::config::Config;
use crate::uploads::UploadRegistry;

/// Shared application state passed to all handlers.
///
/// All services are Arc'd for sharing across async tasks. Requests are
/// otherwise independent; the ledger and the upload registry are the only
/// cross-request state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<dyn ConversationLedger>,
    pub agent: Arc<dyn AgentRuntime>,
    pub uploads: Arc<UploadRegistry>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: Config,
        ledger: Arc<dyn ConversationLedger>,
        agent: Arc<dyn AgentRuntime>,
        uploads: Arc<UploadRegistry>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
            agent,
            uploads,
            http,
        }
    }
}
