//! HTTP client: the single choke point for every API call.
//!
//! PIPELINE
//! ========
//! `prepare` → `attach_auth` → [`Transport::send`] → [`classify_response`]
//! → side effects. Business failures raise a user notification. A 401
//! clears the session and sends the navigator to the login route with the
//! path that was active when the call started. Every call settles once; there
//! are no retries.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
#[cfg(test)]
pub(crate) mod test_helpers;

pub mod notify;
pub mod request;
pub mod transport;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

pub use notify::{LogNotifier, Notifier};
pub use request::{Form, Method, PreparedRequest, RequestData, attach_auth, prepare};
pub use transport::{RawResponse, ReqwestTransport, Transport};

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::{ApiError, InitError, TransportError};
use crate::router::{Navigator, login_redirect};
use crate::session::SessionStore;

pub struct HttpClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl HttpClient {
    #[must_use]
    pub fn new(
        base_url: Url,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { base_url, transport, session, navigator, notifier }
    }

    /// Build a client over [`ReqwestTransport`] using the configured base
    /// address and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, InitError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(config.base_url.clone(), Arc::new(transport), session, navigator, notifier))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Send a request and decode the envelope payload into `T`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Business`] when the envelope code is not the success code
    ///   (the user has already been notified).
    /// - [`ApiError::Transport`] on timeout, network failure, non-2xx status
    ///   or an undecodable body. A 401 has already cleared the session.
    /// - [`ApiError::Request`] if the request could not be built.
    pub async fn send<T: DeserializeOwned>(&self, path: &str, method: Method, data: RequestData) -> Result<T, ApiError> {
        let payload = self.execute(path, method, data).await?;
        serde_json::from_value(payload).map_err(|e| {
            tracing::warn!(path, %method, error = %e, "response payload did not match expected shape");
            ApiError::Transport(TransportError::Decode(e.to_string()))
        })
    }

    /// [`send`](Self::send) without request data.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn request<T: DeserializeOwned>(&self, path: &str, method: Method) -> Result<T, ApiError> {
        self.send(path, method, RequestData::None).await
    }

    /// [`send`](Self::send) with serializable data, placed per `method`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn request_with<T, D>(&self, path: &str, method: Method, data: &D) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send(path, method, RequestData::json(data)?).await
    }

    /// POST a multipart form.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        self.send(path, Method::Post, RequestData::Form(form)).await
    }

    async fn execute(&self, path: &str, method: Method, data: RequestData) -> Result<Value, ApiError> {
        let return_url = self.navigator.current_full_path();
        let prepared = prepare(&self.base_url, path, method, data)?;
        let prepared = attach_auth(prepared, self.session.token().as_deref());
        tracing::debug!(%method, url = %prepared.url, "dispatching request");

        let result = match self.transport.send(prepared).await {
            Ok(raw) => classify_response(raw),
            Err(error) => Err(ApiError::Transport(error)),
        };

        match &result {
            Ok(_) => {}
            Err(ApiError::Business { code, message, .. }) => {
                tracing::info!(path, %method, code, error_message = %message, "business failure");
                self.notifier.notify(if message.is_empty() { envelope::FALLBACK_MESSAGE } else { message.as_str() });
            }
            Err(ApiError::Transport(error)) if error.is_unauthorized() => {
                tracing::warn!(path, %method, %return_url, "session rejected; signing out");
                self.expire_session(&return_url);
            }
            Err(ApiError::Transport(error)) => {
                tracing::warn!(path, %method, %error, "request failed");
            }
            Err(ApiError::Request(_)) => {}
        }
        result
    }

    fn expire_session(&self, return_url: &str) {
        self.session.clear();
        if !self.navigator.push(login_redirect(return_url)) {
            tracing::debug!(%return_url, "login redirect already active");
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("base_url", &self.base_url.as_str()).finish_non_exhaustive()
    }
}

/// Classify a completed exchange.
///
/// # Errors
///
/// Non-2xx status and unparseable bodies become [`ApiError::Transport`];
/// envelopes with a failing code become [`ApiError::Business`].
pub fn classify_response(raw: RawResponse) -> Result<Value, ApiError> {
    if !raw.is_success() {
        return Err(ApiError::Transport(TransportError::Status { status: raw.status, body: raw.body }));
    }
    let parsed = envelope::parse(&raw.body).map_err(|e| ApiError::Transport(TransportError::Decode(e.to_string())))?;
    envelope::classify(parsed).map_err(ApiError::from)
}
