use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use axum_streams::StreamBodyAs;
use serde::Deserialize;
use std::sync::Arc;

use tidechat_stream::{AgentInput, AgentProfile, StreamOrchestrator, TurnContext};

use crate::{
    auth,
    error::{ApiError, ApiResult},
    sanitize,
    state::AppState,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AgentRequest {
    /// User query, 1-10000 characters.
    pub input: String,
    /// Conversation thread, `[a-zA-Z0-9_-]+`, max 100 characters.
    pub thread_id: String,
    /// `fast` or `deep`.
    pub agent_type: String,
}

/// Run the agent and stream protocol frames back as NDJSON
///
/// Tool lifecycle frames arrive live; the reconstructed answer follows as
/// `chatbot` chunks once the run completes.
#[utoipa::path(
    post,
    path = "/stream_agent",
    request_body = AgentRequest,
    responses(
        (status = 200, description = "Newline-delimited JSON frame stream", content_type = "application/json"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Authorization failed")
    ),
    tag = "agent"
)]
pub async fn stream_agent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AgentRequest>,
) -> ApiResult<impl IntoResponse> {
    // Input errors are rejected before any agent interaction begins.
    let safe_input = sanitize::sanitize_text(&req.input)?;
    let safe_thread_id = sanitize::validate_thread_id(&req.thread_id)?;
    let profile = AgentProfile::parse(&req.agent_type)
        .ok_or_else(|| ApiError::BadRequest("Invalid agent type".to_string()))?;

    let api_key = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let api_key = auth::check_api_key(&state.http, &state.config.agent.key_check_url, api_key).await?;

    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        run_id = %run_id,
        thread_id = %safe_thread_id,
        agent_type = profile.as_str(),
        "agent run started"
    );

    let events = state.agent.spawn_run(AgentInput {
        thread_id: safe_thread_id.clone(),
        message: safe_input.clone(),
        profile,
        api_key,
    });

    let ctx = TurnContext {
        run_id,
        thread_id: safe_thread_id,
        question: safe_input,
        uploaded_files: state.uploads.file_names().await,
    };

    let orchestrator =
        StreamOrchestrator::new(Arc::clone(&state.ledger), state.config.agent.chunk_size);
    let frames = orchestrator.run(events, ctx);

    Ok(StreamBodyAs::json_nl(frames))
}
