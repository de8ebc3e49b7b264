//! Per-request access logging and request id propagation.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use inkwell_observability::{RequestId, REQUEST_ID_HEADER};

use crate::caller::USER_ID_HEADER;
use crate::state::AppState;

pub async fn access_log(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(header(&request, REQUEST_ID_HEADER).as_deref());
    let logger = state
        .logging
        .request_logger(request_id.clone())
        .with_request(request.method().as_str(), request.uri().path())
        .with_user(header(&request, USER_ID_HEADER));

    let mut response = next.run(request).await;

    if state.logging.access_log {
        let status = response.status();
        let entry = if status.is_server_error() {
            logger.error_builder("request failed")
        } else if status.is_client_error() {
            logger.warn_builder("request rejected")
        } else {
            logger.info_builder("request completed")
        };
        entry.field_i64("status", i64::from(status.as_u16())).emit();
    }

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
