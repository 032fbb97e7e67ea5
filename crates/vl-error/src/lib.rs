//! Unified error taxonomy with stable error codes for the VaultLink client.
//!
//! Every failure the client surfaces carries an [`ErrorCode`] (a closed,
//! stable set of normalized causes), a human-readable message, and a
//! deterministic key-value metadata map.  The taxonomy is the single source
//! of truth for what each server error token *means*; extracting tokens from
//! raw failures lives in `vl-translate`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Domain tag identifying this layer as the origin of a [`VaultError`].
pub const ERROR_DOMAIN: &str = "vaultlink.record-service";

/// Metadata key for the redirect target supplied by the service.
pub const META_REDIRECT_URL: &str = "redirectURL";
/// Metadata key for the opaque retry-after hint (seconds).
pub const META_RETRY_AFTER: &str = "retryAfter";
/// Metadata key for the server-assigned correlation identifier.
pub const META_UUID: &str = "uuid";
/// Metadata key a transport failure may use for its human-readable message.
pub const META_MESSAGE: &str = "message";
/// Metadata key for an underlying cause carried through from a local error.
pub const META_CAUSE: &str = "cause";

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Closed enumeration of normalized failure causes.
///
/// Each variant has a stable numeric identifier ([`ErrorCode::value`]) and a
/// `SCREAMING_SNAKE_CASE` string tag that are guaranteed not to change across
/// releases; new causes are appended, never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed server payload, local decode failure, or anything this
    /// layer cannot otherwise classify.  The designated fallback.
    InternalError,
    /// No local network connectivity.
    NetworkUnavailable,
    /// A transport-level failure other than connectivity or reachability.
    NetworkFailure,
    /// Remote host unreachable or unresolvable, or the service asked the
    /// client to come back later.
    ServiceUnavailable,
    /// Missing or failed authentication.
    NotAuthenticated,
    /// The authenticated caller may not perform the operation.
    PermissionDenied,
    /// The requested record does not exist.
    RecordNotFound,
    /// A record with the same identifier already exists.
    RecordExists,
    /// The record changed on the server since the client last saw it.
    Conflict,
    /// The request was structurally invalid.
    InvalidRequest,
    /// A reference field points at a record that fails validation.
    ReferenceViolation,
    /// An atomic batch was rejected because a sibling operation failed.
    BatchFailed,
    /// The addressed zone does not exist.
    ZoneNotFound,
    /// The addressed zone is temporarily too busy to serve the request.
    ZoneBusy,
    /// The account is out of storage quota.
    QuotaExceeded,
    /// The client is being throttled.
    RateLimited,
}

impl ErrorCode {
    /// All variants, for exhaustive iteration in tests and tooling.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::InternalError,
        ErrorCode::NetworkUnavailable,
        ErrorCode::NetworkFailure,
        ErrorCode::ServiceUnavailable,
        ErrorCode::NotAuthenticated,
        ErrorCode::PermissionDenied,
        ErrorCode::RecordNotFound,
        ErrorCode::RecordExists,
        ErrorCode::Conflict,
        ErrorCode::InvalidRequest,
        ErrorCode::ReferenceViolation,
        ErrorCode::BatchFailed,
        ErrorCode::ZoneNotFound,
        ErrorCode::ZoneBusy,
        ErrorCode::QuotaExceeded,
        ErrorCode::RateLimited,
    ];

    /// Classify a raw server error token.
    ///
    /// Total over all inputs: tokens outside the known set fall back to
    /// [`ErrorCode::InternalError`] rather than inventing a new code.
    #[must_use]
    pub fn classify(server_token: &str) -> ErrorCode {
        match server_token {
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            "TRY_AGAIN_LATER" => ErrorCode::ServiceUnavailable,
            "AUTHENTICATION_FAILED" | "AUTHENTICATION_REQUIRED" => ErrorCode::NotAuthenticated,
            "ACCESS_DENIED" => ErrorCode::PermissionDenied,
            "NOT_FOUND" => ErrorCode::RecordNotFound,
            "EXISTS" => ErrorCode::RecordExists,
            "CONFLICT" => ErrorCode::Conflict,
            "BAD_REQUEST" => ErrorCode::InvalidRequest,
            "VALIDATING_REFERENCE_ERROR" => ErrorCode::ReferenceViolation,
            "ATOMIC_ERROR" => ErrorCode::BatchFailed,
            "ZONE_NOT_FOUND" => ErrorCode::ZoneNotFound,
            "ZONE_BUSY" => ErrorCode::ZoneBusy,
            "QUOTA_EXCEEDED" => ErrorCode::QuotaExceeded,
            "RATE_LIMITED" => ErrorCode::RateLimited,
            _ => ErrorCode::InternalError,
        }
    }

    /// Stable numeric identifier.  Append-only contract: a value, once
    /// assigned, is never reused or renumbered.
    #[must_use]
    pub fn value(&self) -> u16 {
        match self {
            Self::InternalError => 1,
            Self::NetworkUnavailable => 2,
            Self::NetworkFailure => 3,
            Self::ServiceUnavailable => 4,
            Self::NotAuthenticated => 5,
            Self::PermissionDenied => 6,
            Self::RecordNotFound => 7,
            Self::RecordExists => 8,
            Self::Conflict => 9,
            Self::InvalidRequest => 10,
            Self::ReferenceViolation => 11,
            Self::BatchFailed => 12,
            Self::ZoneNotFound => 13,
            Self::ZoneBusy => 14,
            Self::QuotaExceeded => 15,
            Self::RateLimited => 16,
        }
    }

    /// Canonical short description.  Total; every variant has fixed text.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::InternalError => "internal error",
            Self::NetworkUnavailable => "network unavailable",
            Self::NetworkFailure => "network failure",
            Self::ServiceUnavailable => "service unavailable",
            Self::NotAuthenticated => "not authenticated",
            Self::PermissionDenied => "permission denied",
            Self::RecordNotFound => "record not found",
            Self::RecordExists => "record already exists",
            Self::Conflict => "record changed on server",
            Self::InvalidRequest => "invalid request",
            Self::ReferenceViolation => "reference validation failed",
            Self::BatchFailed => "atomic batch failed",
            Self::ZoneNotFound => "zone not found",
            Self::ZoneBusy => "zone busy",
            Self::QuotaExceeded => "quota exceeded",
            Self::RateLimited => "rate limited",
        }
    }

    /// Stable `&'static str` tag (e.g. `"RECORD_NOT_FOUND"`), matching the
    /// serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalError => "INTERNAL_ERROR",
            Self::NetworkUnavailable => "NETWORK_UNAVAILABLE",
            Self::NetworkFailure => "NETWORK_FAILURE",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::RecordExists => "RECORD_EXISTS",
            Self::Conflict => "CONFLICT",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::ReferenceViolation => "REFERENCE_VIOLATION",
            Self::BatchFailed => "BATCH_FAILED",
            Self::ZoneNotFound => "ZONE_NOT_FOUND",
            Self::ZoneBusy => "ZONE_BUSY",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::RateLimited => "RATE_LIMITED",
        }
    }

    /// Whether a caller may reasonably retry the operation that produced
    /// this code.  Advisory only; any `retryAfter` metadata takes priority
    /// for scheduling.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable
                | Self::NetworkFailure
                | Self::ServiceUnavailable
                | Self::ZoneBusy
                | Self::RateLimited
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VaultError
// ---------------------------------------------------------------------------

/// Normalized error value: the single unified shape every upstream failure
/// is converted into.
///
/// # Builder usage
///
/// ```
/// use vl_error::{ErrorCode, VaultError};
///
/// let err = VaultError::new(ErrorCode::ZoneBusy, "zone is busy, retry later")
///     .with_metadata("retryAfter", 30)
///     .with_metadata("uuid", "6f1c…");
/// ```
#[derive(Clone, PartialEq)]
pub struct VaultError {
    /// Fixed origin tag; always [`ERROR_DOMAIN`].
    pub domain: &'static str,
    /// Normalized cause.  Always one of the closed [`ErrorCode`] variants.
    pub code: ErrorCode,
    /// Human-readable description.  May be empty; [`fmt::Display`] falls
    /// back to the canonical code description.
    pub message: String,
    /// Machine-readable metadata for the caller (retry hints, redirect
    /// targets, correlation ids).  Deterministic ordering.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl VaultError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            domain: ERROR_DOMAIN,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the metadata map.
    ///
    /// The value is converted via [`serde_json::to_value`]; if conversion
    /// fails, the entry is silently skipped.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }

    /// Merge an entire metadata map, preserving existing entries on key
    /// collision.
    #[must_use]
    pub fn with_metadata_map(mut self, map: BTreeMap<String, serde_json::Value>) -> Self {
        for (k, v) in map {
            self.metadata.entry(k).or_insert(v);
        }
        self
    }

    /// The `retryAfter` hint in seconds, if the service supplied one.
    /// Opaque passthrough; this layer never clamps or interprets it.
    #[must_use]
    pub fn retry_after(&self) -> Option<f64> {
        self.metadata.get(META_RETRY_AFTER).and_then(|v| v.as_f64())
    }

    /// The redirect target, if the service supplied one.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        self.metadata.get(META_REDIRECT_URL).and_then(|v| v.as_str())
    }

    /// The server-assigned correlation id, if present.
    #[must_use]
    pub fn uuid(&self) -> Option<&str> {
        self.metadata.get(META_UUID).and_then(|v| v.as_str())
    }

    /// Shorthand for `self.code.is_retryable()`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Debug for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("VaultError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if !self.metadata.is_empty() {
            d.field("metadata", &self.metadata);
        }
        d.finish()
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.message.is_empty() {
            self.code.describe()
        } else {
            self.message.as_str()
        };
        write!(f, "[{} ({})] {text}", self.code.as_str(), self.code.value())?;
        if !self.metadata.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(meta) = serde_json::to_string(&self.metadata) {
                write!(f, " {meta}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for VaultError {}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`VaultError`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct VaultErrorDto {
    /// Origin domain tag.
    pub domain: String,
    /// Normalized cause.
    pub code: ErrorCode,
    /// Stable numeric identifier of `code`.
    pub value: u16,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Machine-readable metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl From<&VaultError> for VaultErrorDto {
    fn from(err: &VaultError) -> Self {
        Self {
            domain: err.domain.to_string(),
            code: err.code,
            value: err.code.value(),
            message: err.message.clone(),
            metadata: err.metadata.clone(),
        }
    }
}

impl From<VaultErrorDto> for VaultError {
    fn from(dto: VaultErrorDto) -> Self {
        Self {
            domain: ERROR_DOMAIN,
            code: dto.code,
            message: dto.message,
            metadata: dto.metadata,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // -- Construction & Display -----------------------------------------

    #[test]
    fn basic_construction() {
        let err = VaultError::new(ErrorCode::InternalError, "boom");
        assert_eq!(err.domain, ERROR_DOMAIN);
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "boom");
        assert!(err.metadata.is_empty());
    }

    #[test]
    fn display_includes_tag_and_numeric_code() {
        let err = VaultError::new(ErrorCode::RecordNotFound, "no such record");
        assert_eq!(err.to_string(), "[RECORD_NOT_FOUND (7)] no such record");
    }

    #[test]
    fn display_falls_back_to_description_when_message_empty() {
        let err = VaultError::new(ErrorCode::ZoneBusy, "");
        assert_eq!(err.to_string(), "[ZONE_BUSY (14)] zone busy");
    }

    #[test]
    fn display_with_metadata() {
        let err = VaultError::new(ErrorCode::RateLimited, "slow down")
            .with_metadata(META_RETRY_AFTER, 5);
        let s = err.to_string();
        assert!(s.starts_with("[RATE_LIMITED (16)] slow down"));
        assert!(s.contains("retryAfter"));
        assert!(s.contains('5'));
    }

    #[test]
    fn debug_skips_empty_metadata() {
        let err = VaultError::new(ErrorCode::Conflict, "changed");
        let dbg = format!("{err:?}");
        assert!(dbg.contains("Conflict"));
        assert!(!dbg.contains("metadata"));
    }

    // -- Classification -------------------------------------------------

    #[test]
    fn classify_known_tokens() {
        assert_eq!(ErrorCode::classify("NOT_FOUND"), ErrorCode::RecordNotFound);
        assert_eq!(ErrorCode::classify("ZONE_BUSY"), ErrorCode::ZoneBusy);
        assert_eq!(ErrorCode::classify("RATE_LIMITED"), ErrorCode::RateLimited);
        assert_eq!(
            ErrorCode::classify("TRY_AGAIN_LATER"),
            ErrorCode::ServiceUnavailable
        );
        assert_eq!(
            ErrorCode::classify("AUTHENTICATION_FAILED"),
            ErrorCode::NotAuthenticated
        );
        assert_eq!(
            ErrorCode::classify("AUTHENTICATION_REQUIRED"),
            ErrorCode::NotAuthenticated
        );
        assert_eq!(ErrorCode::classify("EXISTS"), ErrorCode::RecordExists);
        assert_eq!(ErrorCode::classify("ATOMIC_ERROR"), ErrorCode::BatchFailed);
    }

    #[test]
    fn classify_unknown_tokens_fall_back() {
        assert_eq!(ErrorCode::classify(""), ErrorCode::InternalError);
        assert_eq!(ErrorCode::classify("NO_SUCH_TOKEN"), ErrorCode::InternalError);
        assert_eq!(ErrorCode::classify("not_found"), ErrorCode::InternalError);
    }

    #[test]
    fn classify_is_stable_across_calls() {
        for _ in 0..3 {
            assert_eq!(ErrorCode::classify("CONFLICT"), ErrorCode::Conflict);
            assert_eq!(ErrorCode::classify("garbage"), ErrorCode::InternalError);
        }
    }

    // -- Stable identifiers ---------------------------------------------

    #[test]
    fn all_values_unique() {
        let mut seen = HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.value()), "duplicate value for {code:?}");
        }
    }

    #[test]
    fn all_tags_unique() {
        let mut seen = HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate tag for {code:?}");
        }
    }

    #[test]
    fn value_table_is_locked() {
        // Append-only contract: these pairings must never change.
        assert_eq!(ErrorCode::InternalError.value(), 1);
        assert_eq!(ErrorCode::NetworkUnavailable.value(), 2);
        assert_eq!(ErrorCode::NetworkFailure.value(), 3);
        assert_eq!(ErrorCode::ServiceUnavailable.value(), 4);
        assert_eq!(ErrorCode::RateLimited.value(), 16);
    }

    #[test]
    fn variant_count() {
        assert_eq!(ErrorCode::ALL.len(), 16);
    }

    #[test]
    fn describe_is_total_and_nonempty() {
        for code in ErrorCode::ALL {
            assert!(!code.describe().is_empty(), "empty description for {code:?}");
        }
    }

    #[test]
    fn display_matches_as_str() {
        for code in ErrorCode::ALL {
            assert_eq!(code.to_string(), code.as_str());
        }
    }

    // -- Retry hints -----------------------------------------------------

    #[test]
    fn retryable_codes() {
        assert!(ErrorCode::RateLimited.is_retryable());
        assert!(ErrorCode::ZoneBusy.is_retryable());
        assert!(ErrorCode::ServiceUnavailable.is_retryable());
        assert!(!ErrorCode::RecordNotFound.is_retryable());
        assert!(!ErrorCode::PermissionDenied.is_retryable());
        assert!(!ErrorCode::InternalError.is_retryable());
    }

    // -- Metadata accessors ----------------------------------------------

    #[test]
    fn metadata_accessors() {
        let err = VaultError::new(ErrorCode::RateLimited, "throttled")
            .with_metadata(META_RETRY_AFTER, 30)
            .with_metadata(META_REDIRECT_URL, "https://mirror.example/db")
            .with_metadata(META_UUID, "a-b-c");
        assert_eq!(err.retry_after(), Some(30.0));
        assert_eq!(err.redirect_url(), Some("https://mirror.example/db"));
        assert_eq!(err.uuid(), Some("a-b-c"));
    }

    #[test]
    fn metadata_accessors_absent() {
        let err = VaultError::new(ErrorCode::InternalError, "");
        assert_eq!(err.retry_after(), None);
        assert_eq!(err.redirect_url(), None);
        assert_eq!(err.uuid(), None);
    }

    #[test]
    fn metadata_map_merge_keeps_existing() {
        let mut map = BTreeMap::new();
        map.insert("host".to_string(), serde_json::json!("vault.example"));
        map.insert("uuid".to_string(), serde_json::json!("from-map"));
        let err = VaultError::new(ErrorCode::NetworkFailure, "")
            .with_metadata(META_UUID, "original")
            .with_metadata_map(map);
        assert_eq!(err.uuid(), Some("original"));
        assert_eq!(err.metadata["host"], serde_json::json!("vault.example"));
    }

    // -- Serialization ---------------------------------------------------

    #[test]
    fn error_code_serde_matches_as_str() {
        for code in ErrorCode::ALL {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, format!(r#""{}""#, code.as_str()));
            let back: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *code);
        }
    }

    #[test]
    fn dto_roundtrip() {
        let err = VaultError::new(ErrorCode::QuotaExceeded, "over quota")
            .with_metadata(META_UUID, "corr-1");
        let dto: VaultErrorDto = (&err).into();
        assert_eq!(dto.value, 15);
        let json = serde_json::to_string(&dto).unwrap();
        let back: VaultErrorDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto, back);
        let restored: VaultError = back.into();
        assert_eq!(restored, err);
    }

    #[test]
    fn dto_omits_empty_fields() {
        let err = VaultError::new(ErrorCode::InternalError, "");
        let dto: VaultErrorDto = (&err).into();
        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("message"));
        assert!(!json.contains("metadata"));
    }
}
