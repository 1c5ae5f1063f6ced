//! Response envelope shared by every endpoint of the consult API.
//!
//! The server always answers with `{ code, message, data }`. Transport
//! success only means the envelope arrived; `code` decides whether the
//! business operation succeeded.

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Business success sentinel carried in `code`.
pub const SUCCESS_CODE: i64 = 10000;

/// Notification text used when a failed envelope has no message.
pub const FALLBACK_MESSAGE: &str = "网络异常";

/// The `{ code, message, data }` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    /// Empty when the server sent `null` or omitted it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub data: T,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Message to show the user for a failed envelope.
    #[must_use]
    pub fn notice(&self) -> &str {
        if self.message.is_empty() { FALLBACK_MESSAGE } else { &self.message }
    }
}

/// Field deserializer that reads an explicit `null` as the type's default.
///
/// Pair with `#[serde(default)]` so a missing field behaves the same.
///
/// # Errors
///
/// Propagates the deserializer's error for any non-null value of the wrong
/// type.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse a raw response body into an untyped envelope.
///
/// # Errors
///
/// Returns the JSON error if the body is not an envelope.
pub fn parse(body: &str) -> Result<Envelope, serde_json::Error> {
    serde_json::from_str(body)
}

/// Split an envelope into its payload or the failed envelope itself.
///
/// # Errors
///
/// Returns the whole envelope when `code` is not [`SUCCESS_CODE`].
pub fn classify(envelope: Envelope) -> Result<Value, Envelope> {
    if envelope.is_success() { Ok(envelope.data) } else { Err(envelope) }
}
