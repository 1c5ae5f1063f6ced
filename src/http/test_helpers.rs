//! In-memory collaborators for exercising the HTTP client without a network
//! or a real router.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{HttpClient, Notifier, PreparedRequest, RawResponse, Transport};
use crate::config::DEFAULT_BASE_URL;
use crate::error::TransportError;
use crate::router::{Location, Navigator};
use crate::session::{Session, SessionStore};

type Responder = dyn Fn(&PreparedRequest) -> Result<RawResponse, TransportError> + Send + Sync;

/// Transport that records every request and answers from a closure.
pub struct MockTransport {
    responder: Box<Responder>,
    seen: Mutex<Vec<PreparedRequest>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&PreparedRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), seen: Mutex::new(Vec::new()) }
    }

    /// Always answer with a success envelope around `data`.
    pub fn ok(data: Value) -> Self {
        let body = success_body(&data);
        Self::new(move |_| Ok(RawResponse::new(200, body.clone())))
    }

    /// Always answer with the given status and body.
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.to_owned();
        Self::new(move |_| Ok(RawResponse::new(status, body.clone())))
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());
        // Let concurrently issued calls interleave.
        tokio::task::yield_now().await;
        (self.responder)(&request)
    }
}

pub fn success_body(data: &Value) -> String {
    json!({ "code": 10000, "message": "请求成功", "data": data }).to_string()
}

pub fn failure_body(code: i64, message: &str) -> String {
    json!({ "code": code, "message": message, "data": null }).to_string()
}

/// Navigator that records pushes and ignores a push to the current location.
pub struct RecordingNavigator {
    current: Mutex<Location>,
    pushes: Mutex<Vec<Location>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self { current: Mutex::new(Location::parse(path)), pushes: Mutex::new(Vec::new()) }
    }

    pub fn pushes(&self) -> Vec<Location> {
        self.pushes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_full_path(&self) -> String {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).full_path()
    }

    fn push(&self, to: Location) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == to {
            return false;
        }
        *current = to.clone();
        self.pushes.lock().unwrap_or_else(PoisonError::into_inner).push(to);
        true
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_owned());
    }
}

pub fn patient_session(token: &str) -> Session {
    Session {
        id: "u1".into(),
        account: "patient01".into(),
        mobile: "13230000001".into(),
        avatar: "https://cdn.test/avatar.png".into(),
        token: token.into(),
    }
}

/// A client wired to mocks, with handles to each collaborator.
pub struct Harness {
    pub client: HttpClient,
    pub transport: Arc<MockTransport>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(transport: MockTransport) -> Self {
        Self::at("/home", transport)
    }

    /// Harness whose navigator starts at `path`.
    pub fn at(path: &str, transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let session = Arc::new(SessionStore::in_memory());
        let navigator = Arc::new(RecordingNavigator::at(path));
        let notifier = Arc::new(RecordingNotifier::default());
        let base_url = crate::config::parse_base_url(DEFAULT_BASE_URL).expect("default base url parses");
        let client = HttpClient::new(
            base_url,
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&session),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        Self { client, transport, session, navigator, notifier }
    }

    pub fn signed_in(self, token: &str) -> Self {
        self.session.set(patient_session(token));
        self
    }
}
