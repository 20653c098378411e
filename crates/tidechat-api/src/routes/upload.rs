use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use crate::{
    error::{ApiError, ApiResult},
    sanitize,
    state::AppState,
    uploads,
};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadedFile {
    pub filename: String,
    pub size: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub uploaded: Vec<UploadedFile>,
}

/// Upload text files to attach to the conversation
///
/// Accepted formats are plain-text only; binary document formats are
/// rejected at validation.
#[utoipa::path(
    post,
    path = "/upload",
    responses(
        (status = 200, description = "Files uploaded", body = UploadResponse),
        (status = 400, description = "Validation failed")
    ),
    tag = "files"
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let limits = &state.config.uploads;
    let max_bytes = limits.max_file_size_mb * 1024 * 1024;

    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if uploaded.len() >= limits.max_files_per_request {
            return Err(ApiError::BadRequest(format!(
                "Maximum {} files allowed per upload",
                limits.max_files_per_request
            )));
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?
            .to_string();
        let safe_name = sanitize::sanitize_filename(&filename)?;

        let ext = uploads::file_extension(&safe_name)
            .ok_or_else(|| ApiError::BadRequest("File has no extension".to_string()))?;
        if !limits.allowed_extensions.contains(&ext) {
            return Err(ApiError::BadRequest(format!(
                "File type {ext} not allowed. Allowed types: {}",
                limits.allowed_extensions.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {safe_name}: {e}")))?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("File is empty".to_string()));
        }
        if bytes.len() as u64 > max_bytes {
            return Err(ApiError::BadRequest(format!(
                "File too large. Maximum size: {}MB",
                limits.max_file_size_mb
            )));
        }
        if uploads::looks_executable(&bytes) {
            return Err(ApiError::BadRequest(
                "Executable files are not allowed".to_string(),
            ));
        }

        fs::create_dir_all(&limits.dir).await?;
        fs::write(Path::new(&limits.dir).join(&safe_name), &bytes).await?;

        let content = String::from_utf8_lossy(&bytes).into_owned();
        state.uploads.insert(safe_name.clone(), content).await;

        tracing::info!(filename = %safe_name, size = bytes.len(), "file uploaded");
        uploaded.push(UploadedFile {
            filename: safe_name,
            size: bytes.len(),
        });
    }

    Ok(Json(UploadResponse { uploaded }))
}
