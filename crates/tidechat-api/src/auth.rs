//! Authorization-key verification against the upstream key service.
//!
//! Runs before any streaming starts; rejections carry the upstream-reported
//! status and reason and are never surfaced as stream frames.

use axum::http::header::AUTHORIZATION;

use crate::error::ApiError;

pub async fn check_api_key(
    http: &reqwest::Client,
    key_check_url: &str,
    api_key: Option<&str>,
) -> Result<String, ApiError> {
    let key = api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::Auth {
            status: 401,
            detail: "Missing Authorization header".to_string(),
        })?;

    let response = http
        .post(key_check_url)
        .header(AUTHORIZATION.as_str(), key)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(key.to_string());
    }

    let detail = response.text().await.unwrap_or_default();
    let detail = if detail.is_empty() {
        "Invalid API key".to_string()
    } else {
        detail
    };
    tracing::warn!(status = status.as_u16(), "api key validation failed");
    Err(ApiError::Auth {
        status: status.as_u16(),
        detail,
    })
}
