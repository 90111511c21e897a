use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::middleware::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;

/// Logs every 4xx/5xx response together with the `code` of its JSON error
/// body. The body is buffered and forwarded unchanged.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    let (mut parts, body) = response.into_parts();
    let (body, code) = match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
        Ok(bytes) => {
            let code = error_code(&bytes);
            (Body::from(bytes), code)
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            tracing::warn!(error = ?err, "Failed to read error response body");
            (Body::empty(), None)
        }
    };
    let code = code.unwrap_or_default();

    if status.is_server_error() {
        tracing::error!(
            status = status.as_u16(),
            method,
            uri,
            request_id,
            latency_ms,
            code,
            "Request failed"
        );
    } else {
        tracing::warn!(
            status = status.as_u16(),
            method,
            uri,
            request_id,
            latency_ms,
            code,
            "Request refused"
        );
    }

    Response::from_parts(parts, body)
}

fn error_code(bytes: &Bytes) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("code")?.as_str().map(str::to_string)
}
