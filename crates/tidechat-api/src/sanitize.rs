//! Input validation and sanitization, applied before any agent interaction.

use crate::error::ApiError;

pub const MAX_INPUT_CHARS: usize = 10_000;
pub const MAX_THREAD_ID_CHARS: usize = 100;
pub const MAX_FILENAME_CHARS: usize = 255;

/// Strip control characters (newlines and tabs excepted, then collapsed with
/// the rest of the whitespace) and bound the length.
pub fn sanitize_text(text: &str) -> Result<String, ApiError> {
    if text.is_empty() {
        return Err(ApiError::BadRequest("Input text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Input text too long. Maximum {MAX_INPUT_CHARS} characters allowed"
        )));
    }

    let stripped: String = text.chars().filter(|c| !is_disallowed_control(*c)).collect();
    Ok(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn is_disallowed_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0b}' | '\u{0c}' | '\u{0e}'..='\u{1f}' | '\u{7f}')
}

/// Thread ids are client-chosen; restrict to `[a-zA-Z0-9_-]+`, max 100 chars.
pub fn validate_thread_id(thread_id: &str) -> Result<String, ApiError> {
    if thread_id.is_empty() {
        return Err(ApiError::BadRequest("Thread ID cannot be empty".to_string()));
    }
    if !thread_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "Thread ID can only contain alphanumeric characters, hyphens, and underscores"
                .to_string(),
        ));
    }
    if thread_id.chars().count() > MAX_THREAD_ID_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Thread ID too long. Maximum {MAX_THREAD_ID_CHARS} characters"
        )));
    }
    Ok(thread_id.to_string())
}

/// Strip path separators and null bytes to block traversal, trim dot/space
/// edges, cap the length preserving the extension.
pub fn sanitize_filename(filename: &str) -> Result<String, ApiError> {
    if filename.is_empty() {
        return Err(ApiError::BadRequest("Filename cannot be empty".to_string()));
    }

    let stripped: String = filename
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '\0'))
        .collect();
    let trimmed = stripped.trim_matches(|c| c == '.' || c == ' ');

    let mut sanitized = trimmed.to_string();
    if sanitized.chars().count() > MAX_FILENAME_CHARS {
        let (name, ext) = match trimmed.rsplit_once('.') {
            Some((name, ext)) => (name, Some(ext)),
            None => (trimmed, None),
        };
        sanitized = name.chars().take(250).collect();
        if let Some(ext) = ext {
            sanitized.push('.');
            sanitized.push_str(ext);
        }
    }

    if sanitized.is_empty() {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }
    Ok(sanitized)
}
