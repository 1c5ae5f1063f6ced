//! Error taxonomy for API calls.
//!
//! ERROR HANDLING
//! ==============
//! Once dispatched, a call fails in exactly one of two ways: the envelope
//! arrived but its code was not the success sentinel (`Business`), or the
//! request never produced a usable envelope (`Transport`). `Request` covers
//! calls rejected before dispatch. Only a 401 transport status carries a
//! global side effect; everything else is left to the caller.

use serde_json::Value;

use crate::config::ConfigError;
use crate::envelope::Envelope;

/// Status code that marks an expired or missing session.
pub const UNAUTHORIZED: u16 = 401;

/// Failures below the envelope layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("http status {status}")]
    Status { status: u16, body: String },

    /// The fixed per-request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS or TLS failure.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx body could not be read as the expected payload.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl TransportError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(UNAUTHORIZED)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Status { status: status.as_u16(), body: String::new() }
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// Error returned by every [`crate::HttpClient`] call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Envelope code was not the success sentinel. Carries the full envelope.
    #[error("business failure {code}: {message}")]
    Business { code: i64, message: String, data: Value },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request could not be built; nothing was sent.
    #[error("invalid request: {0}")]
    Request(String),
}

impl ApiError {
    #[must_use]
    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business { .. })
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_unauthorized())
    }

    /// The failed envelope for business failures.
    #[must_use]
    pub fn envelope(&self) -> Option<Envelope> {
        match self {
            Self::Business { code, message, data } => {
                Some(Envelope { code: *code, message: message.clone(), data: data.clone() })
            }
            Self::Transport(_) | Self::Request(_) => None,
        }
    }
}

impl From<Envelope> for ApiError {
    fn from(envelope: Envelope) -> Self {
        Self::Business { code: envelope.code, message: envelope.message, data: envelope.data }
    }
}

/// Failures while wiring up a client.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}
