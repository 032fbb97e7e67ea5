//! End-to-end exercise of the public facade: every raw-failure origin in,
//! one normalized error shape out.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use vaultlink::{translate, transport, ErrorCode, RawFailure, VaultErrorDto, ERROR_DOMAIN};

#[test]
fn transport_path_through_facade() {
    let mut metadata = BTreeMap::new();
    metadata.insert("host".to_string(), json!("vault.example"));
    metadata.insert("message".to_string(), json!("dns lookup timed out"));

    let err = translate(RawFailure::transport(transport::DNS_LOOKUP_FAILED, metadata));
    assert_eq!(err.domain, ERROR_DOMAIN);
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    assert_eq!(err.message, "dns lookup timed out");
    assert_eq!(err.metadata["host"], json!("vault.example"));
    assert!(err.is_retryable());
}

#[test]
fn server_path_through_facade() {
    let payload: Map<String, Value> = json!({
        "serverErrorCode": "ZONE_NOT_FOUND",
        "reason": "zone deleted by owner",
        "uuid": "req-41",
    })
    .as_object()
    .cloned()
    .unwrap();

    let err = translate(RawFailure::server_payload(payload));
    assert_eq!(err.code, ErrorCode::ZoneNotFound);
    assert_eq!(err.uuid(), Some("req-41"));
    assert!(!err.is_retryable());

    // The DTO is what gets logged / shipped across process boundaries.
    let dto: VaultErrorDto = (&err).into();
    let logged = serde_json::to_value(&dto).unwrap();
    assert_eq!(logged["code"], json!("ZONE_NOT_FOUND"));
    assert_eq!(logged["value"], json!(13));
    assert_eq!(logged["domain"], json!(ERROR_DOMAIN));
}

#[test]
fn decode_path_through_facade() {
    let parse_err = serde_json::from_str::<Value>("<html>").unwrap_err();
    let err = translate(RawFailure::decode(parse_err));
    assert_eq!(err.code, ErrorCode::InternalError);
    assert!(err.to_string().starts_with("[INTERNAL_ERROR (1)]"));
}
