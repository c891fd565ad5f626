use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;

pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|e| {
        tracing::error!(error = %e, "response serialization failed");
        ServerError::InternalError
    })?;
    Ok(raw_json(status, body))
}

pub(crate) fn raw_json(status: u16, body: String) -> Response {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "response builder rejected status {status}");
            let mut resp = Response::new(Body::from("{\"error\":\"Internal Server Error\"}"));
            *resp.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}
