use crate::errors::ServerError;
use crate::responses::json::raw_json;
use astra::Response;
use serde_json::json;

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into a JSON error body with the matching status.
pub fn error_response(err: ServerError) -> Response {
    let status = err.status();
    if status >= 500 {
        tracing::error!(error = %err, status, "request failed");
    } else {
        tracing::debug!(error = %err, status, "request rejected");
    }

    let body = json!({ "error": err.to_string() }).to_string();
    raw_json(status, body)
}
