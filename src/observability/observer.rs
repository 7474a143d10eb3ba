//! Per-request observation.
//!
//! Every request passes through [`observe_requests`], which times the
//! handler, records a [`LogEntry`] in the shared [`RequestLog`], and prints
//! one console line. Nothing in here can fail the request it observes.

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::http::request::{client_ip, is_json};
use crate::http::response::ApiError;
use crate::observability::logging::{has_fields, preview_body};
use crate::observability::metrics;
use crate::observability::request_log::{LogEntry, RequestLog};

/// What is known about a request before its handler runs.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: String,
    pub url: String,
    pub ip: String,
    pub body: Option<Value>,
    started: Instant,
    time: DateTime<Utc>,
}

impl RequestMeta {
    /// Start the clock for a request.
    pub fn new(method: impl Into<String>, url: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ip: ip.into(),
            body: None,
            started: Instant::now(),
            time: Utc::now(),
        }
    }

    pub fn from_request(request: &Request) -> Self {
        let url = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self::new(request.method().as_str(), url, client_ip(request))
    }

    /// Keep `body` only if it has at least one field.
    pub fn attach_body(&mut self, body: Value) {
        self.body = has_fields(&body).then_some(body);
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.attach_body(body);
        self
    }
}

/// Records completed requests into a bounded history.
#[derive(Debug, Clone)]
pub struct RequestObserver {
    log: Arc<RequestLog>,
    preview_chars: usize,
    max_body_size: usize,
}

impl RequestObserver {
    pub fn new(log: Arc<RequestLog>, preview_chars: usize, max_body_size: usize) -> Self {
        Self {
            log,
            preview_chars,
            max_body_size,
        }
    }

    pub fn log(&self) -> &Arc<RequestLog> {
        &self.log
    }

    /// Run `handler` and record the outcome.
    pub async fn wrap<F>(&self, meta: RequestMeta, handler: F) -> Response
    where
        F: Future<Output = Response>,
    {
        let response = handler.await;
        self.finish(meta, response.status().as_u16());
        response
    }

    /// Build, store, and print the entry for a completed request.
    pub fn finish(&self, meta: RequestMeta, status: u16) -> LogEntry {
        let elapsed = meta.started.elapsed();
        let entry = LogEntry {
            id: Uuid::new_v4(),
            time: meta.time,
            method: meta.method,
            url: meta.url,
            ip: meta.ip,
            status,
            duration_ms: round_ms(elapsed),
            request_body: meta.body,
        };

        self.print(&entry);
        self.log.push(entry.clone());

        metrics::record_request(&entry.method, status, elapsed);
        metrics::record_log_size(self.log.len());

        entry
    }

    fn print(&self, entry: &LogEntry) {
        match &entry.request_body {
            Some(body) => {
                let body = preview_body(body, self.preview_chars);
                tracing::info!(
                    log_id = %entry.id,
                    ip = %entry.ip,
                    body = %body,
                    "{} {} {} {:.2}ms",
                    entry.method, entry.url, entry.status, entry.duration_ms
                );
            }
            None => tracing::info!(
                log_id = %entry.id,
                ip = %entry.ip,
                "{} {} {} {:.2}ms",
                entry.method, entry.url, entry.status, entry.duration_ms
            ),
        }
    }

    /// Buffer a JSON body so it can be both logged and handed on.
    ///
    /// Non-JSON bodies pass through untouched. A body that cannot be read
    /// yields the error response to send instead.
    async fn capture_body(
        &self,
        request: Request,
        meta: &mut RequestMeta,
    ) -> Result<Request, Response> {
        if !is_json(request.headers()) {
            return Ok(request);
        }

        let declared = request
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > self.max_body_size) {
            return Err(ApiError::payload_too_large(self.max_body_size).into_response());
        }

        let (parts, raw) = request.into_parts();
        let bytes = match body::to_bytes(raw, self.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read request body");
                return Err(ApiError::bad_request("Failed to read request body").into_response());
            }
        };

        if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
            meta.attach_body(value);
        }

        Ok(Request::from_parts(parts, Body::from(bytes)))
    }
}

/// Middleware recording every request that reaches the router.
pub async fn observe_requests(
    State(observer): State<RequestObserver>,
    request: Request,
    next: Next,
) -> Response {
    let mut meta = RequestMeta::from_request(&request);
    match observer.capture_body(request, &mut meta).await {
        Ok(request) => observer.wrap(meta, next.run(request)).await,
        Err(response) => observer.wrap(meta, async { response }).await,
    }
}

fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}
