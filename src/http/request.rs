//! Request descriptors and the pure preparation stages of the pipeline.
//!
//! `prepare` turns `(path, method, data)` into a [`PreparedRequest`] with the
//! data placed in the query string (GET/DELETE) or the body (POST/PUT).
//! `attach_auth` adds the bearer header. Neither touches the network.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Write-style methods send their data as a body.
    #[must_use]
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

// =============================================================================
// MULTIPART
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime: Option<String>, bytes: Vec<u8> },
}

/// Multipart form body, used for file uploads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Form {
    pub parts: Vec<FormPart>,
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File { name: name.into(), file_name: file_name.into(), mime, bytes });
        self
    }
}

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// Caller-supplied request data, before placement.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestData {
    #[default]
    None,
    Json(Value),
    Form(Form),
}

impl RequestData {
    /// Serialize any value into JSON request data.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the value cannot be represented as JSON.
    pub fn json<D: Serialize + ?Sized>(data: &D) -> Result<Self, ApiError> {
        serde_json::to_value(data)
            .map(Self::Json)
            .map_err(|e| ApiError::Request(format!("request data not serializable: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// A request ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl PreparedRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }
}

// =============================================================================
// STAGES
// =============================================================================

/// Resolve `path` against `base` and place `data` in the query or the body.
///
/// # Errors
///
/// Returns [`ApiError::Request`] if the path does not form a valid URL, a
/// multipart form is given to a read-style method, or a file part names an
/// unparseable content type.
pub fn prepare(base: &Url, path: &str, method: Method, data: RequestData) -> Result<PreparedRequest, ApiError> {
    let mut url = base
        .join(path.trim_start_matches('/'))
        .map_err(|e| ApiError::Request(format!("invalid request path {path}: {e}")))?;

    let body = if method.carries_body() {
        match data {
            RequestData::None => Body::Empty,
            RequestData::Json(value) => Body::Json(value),
            RequestData::Form(form) => {
                check_form(&form)?;
                Body::Multipart(form)
            }
        }
    } else {
        match data {
            RequestData::None => {}
            RequestData::Json(value) => {
                let pairs = query_pairs(&value);
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(&pairs);
                }
            }
            RequestData::Form(_) => {
                return Err(ApiError::Request(format!("{method} {path} cannot carry a multipart body")));
            }
        }
        Body::Empty
    };

    Ok(PreparedRequest { method, url, headers: Vec::new(), body })
}

fn check_form(form: &Form) -> Result<(), ApiError> {
    for part in &form.parts {
        if let FormPart::File { file_name, mime: Some(mime), .. } = part {
            if let Err(e) = reqwest::multipart::Part::bytes(Vec::new()).mime_str(mime) {
                return Err(ApiError::Request(format!("invalid content type {mime:?} for {file_name}: {e}")));
            }
        }
    }
    Ok(())
}

/// Add `Authorization: Bearer <token>` when a non-empty token is present.
#[must_use]
pub fn attach_auth(mut request: PreparedRequest, token: Option<&str>) -> PreparedRequest {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        request.headers.push((AUTHORIZATION.to_owned(), format!("Bearer {token}")));
    }
    request
}

/// Flatten JSON data into query pairs.
///
/// Nulls are skipped, arrays repeat the key as `key[]`, nested objects are
/// sent as JSON text. A non-object top level yields no pairs.
fn query_pairs(value: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = value else {
        if !value.is_null() {
            tracing::warn!(%value, "ignoring non-object query data");
        }
        return Vec::new();
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let key = format!("{key}[]");
                pairs.extend(items.iter().filter(|v| !v.is_null()).map(|v| (key.clone(), scalar_text(v))));
            }
            other => pairs.push((key.clone(), scalar_text(other))),
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
