//! Request inspection helpers.
//!
//! # Responsibilities
//! - Determine the client address for the request history
//! - Decode JSON bodies into typed payloads with client-facing errors
//! - Parse lenient query parameters
//!
//! # Design Decisions
//! - Handlers take raw bytes and decode here, so malformed input becomes a
//!   structured 400 instead of an extractor rejection

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::num::IntErrorKind;

use crate::http::response::ApiError;

/// Header consulted when the peer address is unavailable.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Address of the client that sent `request`.
///
/// Prefers the socket peer, then the first `X-Forwarded-For` hop.
pub fn client_ip(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Whether the request declares a JSON body (`application/json` or `*+json`).
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decode a JSON request body.
///
/// Bodies must be declared as JSON so the request history sees the same
/// payload the handler acts on.
pub fn parse_json<T: DeserializeOwned>(headers: &HeaderMap, bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Request body is required"));
    }
    if !is_json(headers) {
        return Err(ApiError::bad_request(
            "Content-Type must be application/json",
        ));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

/// Parse a `limit` query value. Anything that isn't an integer is ignored.
/// Out-of-range integers saturate; negative values become 0 and are
/// clamped later.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    match raw?.trim().parse::<i64>() {
        Ok(value) => Some(usize::try_from(value.max(0)).unwrap_or(usize::MAX)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(usize::MAX),
            IntErrorKind::NegOverflow => Some(0),
            _ => None,
        },
    }
}

/// First `limit` value in a decoded query string.
pub fn limit_param(pairs: &[(String, String)]) -> Option<usize> {
    let raw = pairs.iter().find(|(key, _)| key == "limit").map(|(_, v)| v.as_str());
    parse_limit(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;
    use serde_json::Value;

    #[test]
    fn ip_from_connect_info_wins() {
        let mut request = http::Request::builder()
            .header(X_FORWARDED_FOR, "198.51.100.1")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("127.0.0.1:5555".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_ip(&request), "127.0.0.1");
    }

    #[test]
    fn ip_falls_back_to_forwarded_then_unknown() {
        let request = http::Request::builder()
            .header(X_FORWARDED_FOR, " 198.51.100.1 , 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "198.51.100.1");

        let request = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), "unknown");
    }

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit(None), None);
        assert_eq!(parse_limit(Some("abc")), None);
        assert_eq!(parse_limit(Some("2.5")), None);
        assert_eq!(parse_limit(Some(" 20 ")), Some(20));
        assert_eq!(parse_limit(Some("-3")), Some(0));
        assert_eq!(parse_limit(Some("99999999999999999999")), Some(usize::MAX));
        assert_eq!(parse_limit(Some("-99999999999999999999")), Some(0));
        assert_eq!(parse_limit(Some("")), None);
    }

    #[test]
    fn first_limit_wins_when_repeated() {
        let pairs = vec![
            ("other".to_string(), "1".to_string()),
            ("limit".to_string(), "5".to_string()),
            ("limit".to_string(), "6".to_string()),
        ];
        assert_eq!(limit_param(&pairs), Some(5));
        assert_eq!(limit_param(&[]), None);
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers
    }

    #[test]
    fn json_errors_are_bad_requests() {
        let headers = json_headers();
        assert_eq!(parse_json::<Value>(&headers, b"").unwrap_err().status().as_u16(), 400);
        assert_eq!(parse_json::<Value>(&headers, b"{oops").unwrap_err().status().as_u16(), 400);
        assert_eq!(parse_json::<Value>(&headers, br#"{"delta":1}"#).unwrap()["delta"], 1);
    }

    #[test]
    fn body_without_json_content_type_is_rejected() {
        let mut headers = HeaderMap::new();
        let err = parse_json::<Value>(&headers, br#"{"delta":1}"#).unwrap_err();
        assert_eq!(err.status().as_u16(), 400);

        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(parse_json::<Value>(&headers, br#"{"delta":1}"#).is_err());
    }

    #[test]
    fn json_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(header::CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert!(is_json(&headers));
        headers.insert(header::CONTENT_TYPE, "application/merge-patch+json".parse().unwrap());
        assert!(is_json(&headers));
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&headers));
    }
}
