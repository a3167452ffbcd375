// ABOUTME: Integration tests for the success/failure response envelope shapes
// ABOUTME: Confirms wire-level camelCase field names independent of Rust-side naming
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use altus4_server::errors::{AppError, ErrorCode, ErrorEnvelope, ErrorResponse};
use altus4_server::response::Meta;

#[test]
fn meta_serializes_request_id_as_camel_case() {
    let meta = Meta::new("req-123");
    let value = serde_json::to_value(&meta).expect("serialize meta");
    let obj = value.as_object().expect("object");
    assert!(obj.contains_key("requestId"));
    assert!(!obj.contains_key("request_id"));
    assert_eq!(obj["requestId"], "req-123");
    assert!(obj.contains_key("timestamp"));
    assert!(obj.contains_key("version"));
}

#[test]
fn error_response_serializes_request_id_as_camel_case() {
    let error = AppError::new(ErrorCode::NotFound, "widget not found").with_request_id("req-456");
    let response: ErrorResponse = error.into();
    let value = serde_json::to_value(&response).expect("serialize error response");
    let obj = value.as_object().expect("object");
    assert!(obj.contains_key("requestId"));
    assert_eq!(obj["requestId"], "req-456");
    assert_eq!(obj["code"], "NOT_FOUND");
}

#[test]
fn error_response_omits_request_id_and_suggestions_when_empty() {
    let error = AppError::new(ErrorCode::InternalError, "boom").with_suggestions(Vec::new());
    let response: ErrorResponse = error.into();
    let value = serde_json::to_value(&response).expect("serialize error response");
    let obj = value.as_object().expect("object");
    assert!(!obj.contains_key("requestId"));
    assert!(!obj.contains_key("suggestions"));
}

#[test]
fn failure_envelope_reports_success_false() {
    let response = ErrorResponse::from(AppError::new(ErrorCode::Forbidden, "nope"));
    let envelope = ErrorEnvelope { success: false, error: response };
    let value = serde_json::to_value(&envelope).expect("serialize envelope");
    assert_eq!(value["success"], false);
    assert_eq!(value["error"]["code"], "FORBIDDEN");
}

#[test]
fn every_error_code_carries_retryable_and_suggestions() {
    for code in [
        ErrorCode::NoToken,
        ErrorCode::InvalidInput,
        ErrorCode::ConnectionNotFound,
        ErrorCode::InternalError,
        ErrorCode::Timeout,
    ] {
        let suggestions = code.default_suggestions();
        assert!(!suggestions.is_empty(), "{code:?} should carry suggestions");
        assert!(suggestions.len() <= 4, "{code:?} should carry at most 4 suggestions");
    }
}
