//! Typed call sites over [`crate::HttpClient`].
//!
//! SYSTEM CONTEXT
//! ==============
//! `user` covers login and patient profiles, `consult` covers articles,
//! doctors and consultation orders, `actions` bundles a call with the local
//! state change a screen makes once it succeeds. `types` is the wire schema.

pub mod actions;
pub mod consult;
pub mod labels;
pub mod types;
pub mod user;

use serde::de::IgnoredAny;

use crate::error::ApiError;

/// Drop a payload the caller has no use for.
pub(crate) fn discard(result: Result<IgnoredAny, ApiError>) -> Result<(), ApiError> {
    result.map(|_| ())
}
