//! Fixture tables for the VaultLink error-taxonomy test suites.
//!
//! The token table here is the reference the deep tests check
//! [`ErrorCode::classify`] against; keeping it in a separate crate means a
//! change to the mapping has to be made twice, deliberately.

#![deny(unsafe_code)]

use vl_error::ErrorCode;

/// Every server token the service is known to emit, paired with the code it
/// must classify to.
pub const KNOWN_TOKENS: &[(&str, ErrorCode)] = &[
    ("INTERNAL_ERROR", ErrorCode::InternalError),
    ("TRY_AGAIN_LATER", ErrorCode::ServiceUnavailable),
    ("AUTHENTICATION_FAILED", ErrorCode::NotAuthenticated),
    ("AUTHENTICATION_REQUIRED", ErrorCode::NotAuthenticated),
    ("ACCESS_DENIED", ErrorCode::PermissionDenied),
    ("NOT_FOUND", ErrorCode::RecordNotFound),
    ("EXISTS", ErrorCode::RecordExists),
    ("CONFLICT", ErrorCode::Conflict),
    ("BAD_REQUEST", ErrorCode::InvalidRequest),
    ("VALIDATING_REFERENCE_ERROR", ErrorCode::ReferenceViolation),
    ("ATOMIC_ERROR", ErrorCode::BatchFailed),
    ("ZONE_NOT_FOUND", ErrorCode::ZoneNotFound),
    ("ZONE_BUSY", ErrorCode::ZoneBusy),
    ("QUOTA_EXCEEDED", ErrorCode::QuotaExceeded),
    ("RATE_LIMITED", ErrorCode::RateLimited),
];

/// True if `token` is in the declared server-token set.
pub fn is_known_token(token: &str) -> bool {
    KNOWN_TOKENS.iter().any(|(t, _)| *t == token)
}
