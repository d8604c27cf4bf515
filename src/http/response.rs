//! JSON response building module
//!
//! Builders never panic: a failed build is logged and degrades to a bare
//! response so the connection task stays alive.

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build a JSON response from any serializable body
///
/// HEAD requests get the same headers with an empty body.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal serialization error",
                is_head,
            );
        }
    };
    build_json(status, json, is_head)
}

/// Build an `{"error": <message>}` response
pub fn error_response(status: StatusCode, message: &str, is_head: bool) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    build_json(status, body.to_string(), is_head)
}

/// Build the health check response, independent of any gateway state
pub fn health_response(is_head: bool) -> Response<Full<Bytes>> {
    build_json(StatusCode::OK, r#"{"status":"ok"}"#.to_string(), is_head)
}

/// Build 405 Method Not Allowed response
pub fn method_not_allowed_response() -> Response<Full<Bytes>> {
    let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed", false);
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static("GET, HEAD, OPTIONS"));
    response
}

/// Build OPTIONS response (preflight request)
pub fn options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn build_json(status: StatusCode, json: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = json.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(json) };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
