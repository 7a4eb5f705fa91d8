//! Normalization of failures into a serializable structure.
//!
//! Any failure a handler produces is turned into an [`ErrorResult`] before it is
//! written out. The [`Failure`] trait is the extraction step: it names the
//! failure, describes it, optionally declares an HTTP status and copies any
//! extra identifying fields into [`Attachments`].

use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use micro_readall::protocol::{ParseError, SendError};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::extract::DecodeError;

const RESERVED_KEYS: [&str; 3] = ["name", "message", "status"];

/// Ordered extra fields of a failure.
///
/// Inserting a key that already exists replaces its value in place, the
/// original position is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachments {
    entries: Vec<(String, Value)>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A value that can be reported as a failure.
pub trait Failure {
    /// A short classifier, `"Error"` unless the failure knows better
    fn name(&self) -> String {
        "Error".to_string()
    }

    /// Human readable description
    fn message(&self) -> String;

    /// An explicit HTTP status, used verbatim when present
    fn status(&self) -> Option<StatusCode> {
        None
    }

    /// Copies extra identifying fields
    fn attach(&self, _attachments: &mut Attachments) {}
}

/// The normalized form of a failure.
///
/// `Display` is always `"<name>: <message>"`. Serializing it yields an object
/// with `name`, `message`, the optional `status` and then every attachment whose
/// key does not shadow one of those three.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    name: String,
    message: String,
    status: Option<StatusCode>,
    attachments: Attachments,
}

impl ErrorResult {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), message: message.into(), status: None, attachments: Attachments::new() }
    }

    /// Builds the normalized form of `failure`
    pub fn normalize<F: Failure + ?Sized>(failure: &F) -> Self {
        let mut attachments = Attachments::new();
        failure.attach(&mut attachments);

        Self { name: failure.name(), message: failure.message(), status: failure.status(), attachments }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn attach(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attachments.insert(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    /// Converts to a JSON value, the body of an error response.
    ///
    /// Attachments are already JSON values, so serialization only fails on a
    /// broken `Serializer`; it then falls back to the `name: message` form as a
    /// JSON string, never to the `Debug` form other response values use.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            warn!(cause = %e, name = %self.name, "failed to serialize error result");
            Value::String(self.to_string())
        })
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl StdError for ErrorResult {}

impl Serialize for ErrorResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(status) = self.status {
            map.serialize_entry("status", &status.as_u16())?;
        }
        for (key, value) in self.attachments.iter().filter(|(key, _)| !RESERVED_KEYS.contains(key)) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A failure declared by application code, carrying the status to respond with.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StatusError {
    status: StatusCode,
    name: String,
    message: String,
    attachments: Attachments,
}

impl StatusError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, name: "Error".to_string(), message: message.into(), attachments: Attachments::new() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn attach(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attachments.insert(key, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl Failure for str {
    fn message(&self) -> String {
        self.to_string()
    }
}

impl Failure for String {
    fn message(&self) -> String {
        self.clone()
    }
}

impl Failure for ErrorResult {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }

    fn attach(&self, attachments: &mut Attachments) {
        for (key, value) in self.attachments.iter() {
            attachments.insert(key, value.clone());
        }
    }
}

impl Failure for StatusError {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn status(&self) -> Option<StatusCode> {
        Some(self.status)
    }

    fn attach(&self, attachments: &mut Attachments) {
        for (key, value) in self.attachments.iter() {
            attachments.insert(key, value.clone());
        }
    }
}

impl Failure for ParseError {
    fn name(&self) -> String {
        "ParseError".to_string()
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn attach(&self, attachments: &mut Attachments) {
        let kind = match self {
            ParseError::Transport { .. } => "transport",
            ParseError::UnexpectedEof => "unexpected_eof",
            ParseError::UnknownEncoding { name } => {
                attachments.insert("encoding", name.as_str());
                "unknown_encoding"
            }
            ParseError::InvalidBody { .. } => "invalid_body",
            ParseError::Io { .. } => "io",
        };
        attachments.insert("kind", kind);
    }
}

impl Failure for SendError {
    fn name(&self) -> String {
        "SendError".to_string()
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn attach(&self, attachments: &mut Attachments) {
        let kind = match self {
            SendError::Closed => "closed",
            SendError::InvalidHeader { .. } => "invalid_header",
            SendError::Io { .. } => "io",
        };
        attachments.insert("kind", kind);
    }
}

impl Failure for DecodeError {
    fn name(&self) -> String {
        match self {
            DecodeError::Body(e) => e.name(),
            _ => "DecodeError".to_string(),
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn attach(&self, attachments: &mut Attachments) {
        match self {
            DecodeError::Body(e) => e.attach(attachments),
            DecodeError::Json { source } => {
                attachments.insert("kind", self.kind());
                attachments.insert("line", source.line());
                attachments.insert("column", source.column());
            }
            DecodeError::Form { .. } | DecodeError::Query { .. } => attachments.insert("kind", self.kind()),
        }
    }
}

impl Failure for dyn StdError + 'static {
    fn message(&self) -> String {
        self.to_string()
    }

    fn attach(&self, attachments: &mut Attachments) {
        attach_causes(self.source(), attachments);
    }
}

impl Failure for dyn StdError + Send + Sync + 'static {
    fn message(&self) -> String {
        self.to_string()
    }

    fn attach(&self, attachments: &mut Attachments) {
        attach_causes(self.source(), attachments);
    }
}

fn attach_causes(mut source: Option<&(dyn StdError + 'static)>, attachments: &mut Attachments) {
    let mut causes = Vec::new();
    while let Some(cause) = source {
        causes.push(Value::String(cause.to_string()));
        source = cause.source();
    }

    if !causes.is_empty() {
        attachments.insert("causes", causes);
    }
}
