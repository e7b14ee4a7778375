//! Shared HTTP response helpers.

use reqwest::blocking::Response;

use crate::error::RemoteError;

/// Longest response body kept in an [`RemoteError::Api`] message.
const MAX_ERROR_BODY: usize = 200;

/// Return the response unchanged on success, or an [`RemoteError::Api`]
/// carrying the status code and a trimmed body.
pub fn check_response(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message: truncate(body.trim(), MAX_ERROR_BODY),
    })
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
