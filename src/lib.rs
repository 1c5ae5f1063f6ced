//! Client library for the consult (online medical consultation) patient API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every network call goes through [`http::HttpClient`], which reads the
//! bearer token from the shared [`session::SessionStore`] and reports expired
//! sessions to a [`router::Navigator`]. The [`router::Router`] consults the
//! [`router::NavigationGuard`] on every route change. Typed endpoint wrappers
//! live in [`services`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod router;
pub mod services;
pub mod session;

pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::{ApiError, TransportError};
pub use http::HttpClient;
pub use router::{Location, NavigationGuard, Navigator, Router};
pub use session::{Session, SessionStore};
