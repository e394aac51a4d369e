// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{header, http, HeaderMap, Response, StatusCode};
use serde_json::json;
use tracing::{error, info};

/// Logs the given message (info for success statuses, error otherwise) and
/// returns it in the body of a JSON response with the given status code.
/// Response body format:
/// {
///     "message": message
/// }
pub fn log_and_create_http_response(
    message: &str,
    status: StatusCode,
) -> http::Result<Response<Full<Bytes>>> {
    if status.is_success() {
        info!("{message}");
    } else {
        error!("{message}");
    }
    let body = json!({ "message": message }).to_string();
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body)))
}

/// Checks the Content-Length header against the configured maximum. Returns
/// `None` when the request may proceed, otherwise the response to send back.
/// A missing header is fine; the body read enforces the limit as well.
pub fn verify_request_content_length(
    headers: &HeaderMap,
    max_content_length: usize,
    error_message_prefix: &str,
) -> Option<http::Result<Response<Full<Bytes>>>> {
    let content_length = match headers.get(header::CONTENT_LENGTH) {
        Some(value) => match value.to_str().ok().and_then(|v| v.parse::<usize>().ok()) {
            Some(content_length) => content_length,
            None => {
                return Some(log_and_create_http_response(
                    &format!("{error_message_prefix}: Invalid Content-Length header"),
                    StatusCode::BAD_REQUEST,
                ));
            }
        },
        None => return None,
    };

    if content_length > max_content_length {
        return Some(log_and_create_http_response(
            &format!("{error_message_prefix}: Payload too large"),
            StatusCode::PAYLOAD_TOO_LARGE,
        ));
    }
    None
}
