//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health check,
//! then the per-request mapping reload and resolution pipeline.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::mapping;
use crate::resolver::{self, ResolveError};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Liveness probe path, served ahead of mapping resolution
const HEALTH_PATH: &str = "/healthz";

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_head = method == Method::HEAD;

    let response = match check_http_method(&method) {
        Some(resp) => resp,
        None => route_request(&path, is_head, &state).await,
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer_addr.to_string(), method.to_string(), path);
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return a response for anything but GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::method_not_allowed_response())
        }
    }
}

/// Route request based on path
async fn route_request(path: &str, is_head: bool, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    // Health check answers even when the mapping file or the database is
    // unavailable.
    if mapping::normalize_path(path) == HEALTH_PATH {
        return http::health_response(is_head);
    }

    // The mapping table is rebuilt from disk for every request; edits to
    // the file take effect without a restart.
    let table = match mapping::load(&state.config.mapping.path).await {
        Ok(table) => table,
        Err(e) => {
            logger::log_error(&format!("Mapping load failed: {e}"));
            return http::error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.to_string(),
                is_head,
            );
        }
    };

    match resolver::resolve(path, &table, &state.config.database).await {
        Ok(objects) => http::json_response(StatusCode::OK, &objects, is_head),
        Err(err) => {
            if !matches!(err, ResolveError::NoMapping(_)) {
                logger::log_error(&format!("Resolution failed for {path}: {err}"));
            }
            resolve_failure_response(&err, is_head)
        }
    }
}

/// Map a resolution failure to its HTTP response
fn resolve_failure_response(err: &ResolveError, is_head: bool) -> Response<Full<Bytes>> {
    let status = match err {
        ResolveError::NoMapping(_) => StatusCode::NOT_FOUND,
        ResolveError::EmptyQuery | ResolveError::ExecutionFailure(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    http::error_response(status, &err.to_string(), is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, DatabaseConfig, LoggingConfig, MappingConfig, PerformanceConfig, ServerConfig,
    };
    use http_body_util::BodyExt;

    fn test_state(mapping_path: &str) -> Arc<AppState> {
        Arc::new(AppState::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            mapping: MappingConfig {
                path: mapping_path.to_string(),
            },
            database: DatabaseConfig {
                host: "127.0.0.1".to_string(),
                port: 1,
                user: "nobody".to_string(),
                password: String::new(),
                name: "none".to_string(),
                connect_timeout: 1,
                query_timeout: 1,
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "common".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
        }))
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_check_http_method() {
        assert!(check_http_method(&Method::GET).is_none());
        assert!(check_http_method(&Method::HEAD).is_none());

        let options = check_http_method(&Method::OPTIONS).unwrap();
        assert_eq!(options.status(), StatusCode::NO_CONTENT);

        let post = check_http_method(&Method::POST).unwrap();
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_resolve_failure_statuses() {
        let not_found =
            resolve_failure_response(&ResolveError::NoMapping("/nope".to_string()), false);
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let empty = resolve_failure_response(&ResolveError::EmptyQuery, false);
        assert_eq!(empty.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let failed =
            resolve_failure_response(&ResolveError::ExecutionFailure("boom".to_string()), false);
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response =
            resolve_failure_response(&ResolveError::NoMapping("/nope".to_string()), false);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"no mapping for endpoint '/nope'"}"#
        );
    }

    #[tokio::test]
    async fn test_health_independent_of_mapping_and_database() {
        // Mapping file missing and database unroutable; health must still
        // answer 200.
        let state = test_state("/nonexistent/mappings.yml");
        let response = route_request("/healthz", false, &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_unreadable_mapping_is_server_error() {
        let state = test_state("/nonexistent/mappings.yml");
        let response = route_request("/users", false, &state).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("mapping source unavailable"));
    }

    #[tokio::test]
    async fn test_unmapped_path_is_not_found() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "mappings:").unwrap();
        writeln!(file, "  - api_endpoint: /users").unwrap();
        writeln!(file, "    query: SELECT 1").unwrap();

        let state = test_state(path.to_str().unwrap());
        let response = route_request("/nope", false, &state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"no mapping for endpoint '/nope'"}"#
        );
    }

    #[tokio::test]
    async fn test_empty_query_is_server_error() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "mappings:").unwrap();
        writeln!(file, "  - api_endpoint: /users").unwrap();

        let state = test_state(path.to_str().unwrap());
        let response = route_request("/users", false, &state).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"empty query in mapping"}"#
        );
    }
}
