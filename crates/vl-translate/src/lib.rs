// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translation of raw client failures into normalized [`VaultError`]s.
//!
//! Failures reach the client from three independent origins: the transport
//! layer, structured error payloads returned by the service, and local
//! response-body decoding.  [`translate`] reconciles all three into the
//! closed taxonomy defined by `vl-error`.  Translation is total: this is
//! the last-resort error-reporting path, so anything unclassifiable
//! degrades to [`ErrorCode::InternalError`] instead of failing again.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use vl_error::{
    ErrorCode, VaultError, META_CAUSE, META_MESSAGE, META_REDIRECT_URL, META_RETRY_AFTER, META_UUID,
};

/// Metadata key recording the raw transport error code on transport
/// failures.  Only written when the caller did not supply it already.
pub const META_TRANSPORT_CODE: &str = "transportCode";

/// Error codes reported by the transport collaborator.
///
/// The code space belongs to the transport layer; this module only needs
/// the handful of values that affect classification.
pub mod transport {
    /// No local network connectivity at all.
    pub const NOT_CONNECTED: i64 = -1009;
    /// The remote host could not be resolved.
    pub const CANNOT_FIND_HOST: i64 = -1003;
    /// The remote host resolved but refused or dropped the connection.
    pub const CANNOT_CONNECT_TO_HOST: i64 = -1004;
    /// DNS lookup failed outright.
    pub const DNS_LOOKUP_FAILED: i64 = -1006;
}

// ── RawFailure ──────────────────────────────────────────────────────

/// A raw failure as observed at the call site, before normalization.
///
/// Ephemeral by design: constructed where the failure is detected and
/// consumed immediately by [`translate`].
pub enum RawFailure {
    /// A transport-layer failure: an origin-specific numeric code plus
    /// whatever ambient metadata the transport collaborator captured.
    Transport {
        /// Origin-specific transport error code.
        code: i64,
        /// Ambient metadata (host, underlying message, ...), caller-defined.
        metadata: BTreeMap<String, Value>,
    },
    /// The decoded body of an error response, as a generic JSON object.
    ServerPayload(Map<String, Value>),
    /// A local error produced while decoding a response body.
    Decode(Box<dyn std::error::Error + Send + Sync>),
}

impl RawFailure {
    /// Transport failure with the given code and ambient metadata.
    pub fn transport(code: i64, metadata: BTreeMap<String, Value>) -> Self {
        Self::Transport { code, metadata }
    }

    /// Server error-response payload.
    pub fn server_payload(payload: Map<String, Value>) -> Self {
        Self::ServerPayload(payload)
    }

    /// Local decode failure.
    pub fn decode(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Box::new(error))
    }
}

impl fmt::Debug for RawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { code, metadata } => f
                .debug_struct("Transport")
                .field("code", code)
                .field("metadata", metadata)
                .finish(),
            Self::ServerPayload(payload) => f.debug_tuple("ServerPayload").field(payload).finish(),
            Self::Decode(err) => f.debug_tuple("Decode").field(&err.to_string()).finish(),
        }
    }
}

// ── Server payload projection ───────────────────────────────────────

/// Why a server payload could not be projected into a typed shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The payload has no `serverErrorCode` key.
    #[error("payload has no serverErrorCode field")]
    MissingToken,
    /// The `serverErrorCode` value is not a string token.
    #[error("serverErrorCode is not a string")]
    TokenNotString,
}

/// Typed projection of a server error payload.
///
/// Best-effort and partial: only a string `serverErrorCode` is required,
/// every other field is optional and unexpected keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerErrorPayload {
    /// The raw server token naming the error condition.
    pub server_error_code: String,
    /// Human-readable reason supplied by the service.
    pub reason: Option<String>,
    /// Redirect target, e.g. when the record moved to another container.
    pub redirect_url: Option<String>,
    /// Retry hint in seconds.  Opaque: carried through unclamped and
    /// uninterpreted.
    pub retry_after: Option<serde_json::Number>,
    /// Server-assigned correlation id.
    pub uuid: Option<String>,
}

impl ServerErrorPayload {
    /// Project a raw payload mapping.
    ///
    /// Fails only when no usable `serverErrorCode` token is present; the
    /// caller treats that as a classifiable condition, not an error path.
    pub fn from_map(payload: &Map<String, Value>) -> Result<Self, ProjectionError> {
        let token = payload.get("serverErrorCode").ok_or(ProjectionError::MissingToken)?;
        let server_error_code = token
            .as_str()
            .ok_or(ProjectionError::TokenNotString)?
            .to_owned();

        Ok(Self {
            server_error_code,
            reason: string_field(payload, "reason"),
            redirect_url: string_field(payload, META_REDIRECT_URL),
            retry_after: match payload.get(META_RETRY_AFTER) {
                Some(Value::Number(n)) => Some(n.clone()),
                _ => None,
            },
            uuid: string_field(payload, META_UUID),
        })
    }
}

fn string_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_owned)
}

// ── Translation ─────────────────────────────────────────────────────

/// Translate a raw failure into a normalized [`VaultError`].
///
/// Total over every possible input: unknown transport codes, empty or
/// malformed payloads, and opaque decode errors all classify rather than
/// propagate a secondary failure.
pub fn translate(failure: RawFailure) -> VaultError {
    match failure {
        RawFailure::Transport { code, metadata } => translate_transport(code, metadata),
        RawFailure::ServerPayload(payload) => translate_server_payload(&payload),
        RawFailure::Decode(error) => translate_decode(error.as_ref()),
    }
}

impl From<RawFailure> for VaultError {
    fn from(failure: RawFailure) -> Self {
        translate(failure)
    }
}

fn translate_transport(code: i64, mut metadata: BTreeMap<String, Value>) -> VaultError {
    // Host-unreachable codes take precedence over the connectivity check.
    let error_code = match code {
        transport::CANNOT_FIND_HOST
        | transport::CANNOT_CONNECT_TO_HOST
        | transport::DNS_LOOKUP_FAILED => ErrorCode::ServiceUnavailable,
        transport::NOT_CONNECTED => ErrorCode::NetworkUnavailable,
        _ => ErrorCode::NetworkFailure,
    };

    // Promote a string message out of the ambient metadata; everything
    // else passes through unchanged.
    let message = if matches!(metadata.get(META_MESSAGE), Some(Value::String(_))) {
        match metadata.remove(META_MESSAGE) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        }
    } else {
        String::new()
    };

    metadata
        .entry(META_TRANSPORT_CODE.to_string())
        .or_insert_with(|| Value::from(code));

    VaultError::new(error_code, message).with_metadata_map(metadata)
}

fn translate_server_payload(payload: &Map<String, Value>) -> VaultError {
    let projected = match ServerErrorPayload::from_map(payload) {
        Ok(p) => p,
        Err(reason) => {
            // A malformed payload shape is itself a classifiable condition.
            // The contract keeps the fallback metadata empty; the discarded
            // payload survives in the trace instead.
            debug!(%reason, payload = %serde_json::Value::Object(payload.clone()), "server payload not projectable");
            return VaultError::new(ErrorCode::InternalError, "");
        }
    };

    let code = ErrorCode::classify(&projected.server_error_code);
    if code == ErrorCode::InternalError && projected.server_error_code != "INTERNAL_ERROR" {
        debug!(token = %projected.server_error_code, "unrecognized server error token");
    }

    let mut err = VaultError::new(code, projected.reason.unwrap_or_default());
    if let Some(url) = projected.redirect_url {
        err = err.with_metadata(META_REDIRECT_URL, url);
    }
    if let Some(seconds) = projected.retry_after {
        err = err.with_metadata(META_RETRY_AFTER, seconds);
    }
    if let Some(uuid) = projected.uuid {
        err = err.with_metadata(META_UUID, uuid);
    }
    err
}

fn translate_decode(error: &(dyn std::error::Error + 'static)) -> VaultError {
    let mut err = VaultError::new(ErrorCode::InternalError, error.to_string());
    if let Some(cause) = error.source() {
        err = err.with_metadata(META_CAUSE, cause.to_string());
    }
    err
}

// ── Tests ───────────────────────────────────────────────────────────
