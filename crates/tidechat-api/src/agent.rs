//! Binding to the agent-graph service: runs execute upstream and stream
//! their events back as newline-delimited JSON.

use anyhow::{Context, Result};
use axum::http::header::AUTHORIZATION;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;

use tidechat_stream::{AgentEvent, AgentInput, AgentProfile, AgentRuntime};

const EVENT_CHANNEL_CAPACITY: usize = 1000;

pub struct RemoteAgentRuntime {
    http: reqwest::Client,
    upstream_url: String,
    fast_model: String,
    deep_model: String,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    thread_id: &'a str,
    message: &'a str,
    model: &'a str,
}

impl RemoteAgentRuntime {
    pub fn new(
        http: reqwest::Client,
        upstream_url: String,
        fast_model: String,
        deep_model: String,
    ) -> Self {
        Self {
            http,
            upstream_url,
            fast_model,
            deep_model,
        }
    }

    fn model_for(&self, profile: AgentProfile) -> &str {
        match profile {
            AgentProfile::Fast => &self.fast_model,
            AgentProfile::Deep => &self.deep_model,
        }
    }
}

impl AgentRuntime for RemoteAgentRuntime {
    fn spawn_run(&self, input: AgentInput) -> mpsc::Receiver<Result<AgentEvent>> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let http = self.http.clone();
        let url = self.upstream_url.clone();
        let model = self.model_for(input.profile).to_string();

        tokio::spawn(async move {
            if let Err(e) = pull_events(http, url, model, input, tx.clone()).await {
                // Receiver may already be gone; nothing else to do then.
                let _ = tx.send(Err(e)).await;
            }
        });

        rx
    }
}

async fn pull_events(
    http: reqwest::Client,
    url: String,
    model: String,
    input: AgentInput,
    tx: mpsc::Sender<Result<AgentEvent>>,
) -> Result<()> {
    let response = http
        .post(&url)
        .header(AUTHORIZATION.as_str(), &input.api_key)
        .json(&RunRequest {
            thread_id: &input.thread_id,
            message: &input.message,
            model: &model,
        })
        .send()
        .await
        .context("agent run request failed")?
        .error_for_status()
        .context("agent run rejected")?;

    let mut bytes = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = bytes.next().await {
        let chunk = chunk.context("agent event stream interrupted")?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = buffer.find('\n') {
            let line = buffer[..newline].trim().to_string();
            buffer.drain(..=newline);
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<AgentEvent>(&line) {
                Ok(event) => {
                    if tx.send(Ok(event)).await.is_err() {
                        // Client went away; stop pulling promptly.
                        return Ok(());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed agent event");
                }
            }
        }
    }

    Ok(())
}
