//! Facade over the VaultLink error layer.
//!
//! Re-exports the taxonomy (`vl-error`) and the translator (`vl-translate`)
//! so downstream code depends on a single crate:
//!
//! ```
//! use vaultlink::{translate, ErrorCode, RawFailure};
//! use std::collections::BTreeMap;
//!
//! let err = translate(RawFailure::transport(-1009, BTreeMap::new()));
//! assert_eq!(err.code, ErrorCode::NetworkUnavailable);
//! ```

#![deny(unsafe_code)]

pub use vl_error::{
    ErrorCode, VaultError, VaultErrorDto, ERROR_DOMAIN, META_CAUSE, META_MESSAGE,
    META_REDIRECT_URL, META_RETRY_AFTER, META_UUID,
};
pub use vl_translate::{
    translate, transport, ProjectionError, RawFailure, ServerErrorPayload, META_TRANSPORT_CODE,
};
