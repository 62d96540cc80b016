use reqwest::header::HeaderMap;
use serde_json::json;

use super::*;

fn response(status: u16, body: &[u8]) -> TransportResponse {
    TransportResponse { status: StatusCode::from_u16(status).unwrap(), headers: HeaderMap::new(), body: body.to_vec() }
}

// =============================================================================
// pick_message
// =============================================================================

#[test]
fn pick_message_prefers_server_message() {
    let data = json!({"message": "Email already registered"});
    assert_eq!(pick_message(Some(&data), Some("transport")), "Email already registered");
}

#[test]
fn pick_message_falls_back_to_transport() {
    let data = json!({"message": ""});
    assert_eq!(pick_message(Some(&data), Some("socket hang up")), "socket hang up");
    assert_eq!(pick_message(Some(&json!({"message": 42})), Some("socket hang up")), "socket hang up");
}

#[test]
fn pick_message_keeps_whitespace_server_message() {
    let data = json!({"message": " "});
    assert_eq!(pick_message(Some(&data), Some("transport")), " ");
}

#[test]
fn pick_message_final_fallback() {
    assert_eq!(pick_message(None, None), FALLBACK_MESSAGE);
    assert_eq!(pick_message(Some(&json!("plain")), Some("")), FALLBACK_MESSAGE);
}

// =============================================================================
// parse_body
// =============================================================================

#[test]
fn parse_body_variants() {
    assert_eq!(parse_body(b""), None);
    assert_eq!(parse_body(b"  \n"), None);
    assert_eq!(parse_body(br#"{"a":1}"#), Some(json!({"a": 1})));
    assert_eq!(parse_body(b"<html>bad gateway</html>"), Some(json!("<html>bad gateway</html>")));
}

// =============================================================================
// constructors
// =============================================================================

#[test]
fn from_status_with_html_body() {
    let err = ApiError::from_status(&response(502, b"<html>bad gateway</html>"));
    assert_eq!(err.kind, ApiErrorKind::Status);
    assert_eq!(err.message, status_failed_message(502));
    assert_eq!(err.data, Some(json!("<html>bad gateway</html>")));
    assert_eq!(err.response.unwrap().body, "<html>bad gateway</html>");
}

#[test]
fn from_status_with_empty_body() {
    let err = ApiError::from_status(&response(404, b""));
    assert_eq!(err.message, "Request failed with status code 404");
    assert_eq!(err.status, Some(404));
    assert!(err.data.is_none());
}

#[test]
fn from_transport_kinds() {
    assert_eq!(ApiError::from_transport(&TransportError::Timeout("t".into())).kind, ApiErrorKind::Timeout);
    assert_eq!(ApiError::from_transport(&TransportError::Connect("c".into())).kind, ApiErrorKind::Network);
    assert_eq!(ApiError::from_transport(&TransportError::Request("r".into())).kind, ApiErrorKind::Network);
    assert_eq!(ApiError::from_transport(&TransportError::Build("b".into())).kind, ApiErrorKind::InvalidRequest);
}

#[test]
fn invalid_request_never_empty() {
    assert_eq!(ApiError::invalid_request("").message, FALLBACK_MESSAGE);
}
