//! Response negotiation.
//!
//! [`Reply`] wraps a [`ResponseSink`] together with the negotiation context of
//! one response: the `Accept` preference of the request and the current status.
//! Every finishing method consumes the reply, writes exactly one status, at most
//! one content type, at most one body and one end, then hands the sink back.
//!
//! # Status defaulting
//!
//! A reply starts at the configured success status. [`Reply::set_status`]
//! always wins. The error, redirect and die helpers only pick their own status
//! while the reply is still at the success default, so an explicitly chosen
//! status survives them.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, StatusCode};
use micro_readall::protocol::SendError;
use serde::Serialize;
use tracing::debug;

use crate::config::ReplyConfig;
use crate::error::{ErrorResult, Failure};
use crate::negotiate::{Format, json_text, negotiate};
use crate::request::IncomingMessage;
use crate::sink::ResponseSink;

const NGJSON_PREFIX: &str = ")]}',\n";
const XJSON_PREFIX: &str = "for (;;);";
const APPLICATION_X_JAVASCRIPT: &str = "application/x-javascript";

/// The outbound half of an exchange, see the [module documentation](self).
pub struct Reply<K> {
    sink: K,
    status: StatusCode,
    accept: Option<String>,
    config: Arc<ReplyConfig>,
}

impl<K: ResponseSink> Reply<K> {
    /// Creates a reply with the default configuration
    pub fn new(sink: K, accept: Option<&str>) -> Self {
        Self::with_config(sink, accept, Arc::new(ReplyConfig::default()))
    }

    pub fn with_config(sink: K, accept: Option<&str>, config: Arc<ReplyConfig>) -> Self {
        Self { sink, status: config.success(), accept: accept.map(str::to_string), config }
    }

    /// Creates a reply negotiating on the `Accept` header of `request`
    pub fn for_request<S>(request: &IncomingMessage<S>, sink: K, config: Arc<ReplyConfig>) -> Self {
        Self::with_config(sink, request.header().accept(), config)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// The `Accept` preference, the configured default when the request sent none
    pub fn accept(&self) -> &str {
        self.accept.as_deref().unwrap_or_else(|| self.config.default_accept())
    }

    pub fn format(&self) -> Format {
        negotiate(self.accept())
    }

    pub fn config(&self) -> &ReplyConfig {
        &self.config
    }

    fn is_default_status(&self) -> bool {
        self.status == self.config.success()
    }

    /// Writes `value` in the negotiated format: JSON text for JSON preferences,
    /// the `Display` form otherwise.
    pub async fn respond<T>(self, value: &T) -> Result<K, SendError>
    where
        T: Serialize + Display + Debug + ?Sized,
    {
        let format = self.format();
        let body = match format {
            Format::Json => json_text(value),
            Format::Text => value.to_string(),
        };
        self.finish(Some(HeaderValue::from_static(format.content_type())), Some(Bytes::from(body))).await
    }

    /// Normalizes `failure` and responds with it.
    ///
    /// A status declared by the failure is used verbatim. Without one, the reply
    /// switches to the configured client error status if it is still at the
    /// success default. The JSON body comes from [`ErrorResult::to_json`], so an
    /// error result never degrades to the `Debug` form used by [`Reply::respond`].
    pub async fn respond_error<F: Failure + ?Sized>(mut self, failure: &F) -> Result<K, SendError> {
        let result = ErrorResult::normalize(failure);
        match result.status() {
            Some(status) => self.status = status,
            None if self.is_default_status() => self.status = self.config.client_error(),
            None => {}
        }

        debug!(status = %self.status, error = %result, "respond with error");
        let format = self.format();
        let body = match format {
            Format::Json => result.to_json().to_string(),
            Format::Text => result.to_string(),
        };
        self.finish(Some(HeaderValue::from_static(format.content_type())), Some(Bytes::from(body))).await
    }

    pub async fn json<T: Serialize + Debug + ?Sized>(self, value: &T) -> Result<K, SendError> {
        let body = json_text(value);
        self.finish(Some(HeaderValue::from_static(Format::Json.content_type())), Some(Bytes::from(body))).await
    }

    /// JSON prefixed with `)]}',\n`, a guard against JSON hijacking that clients
    /// strip before parsing
    pub async fn ngjson<T: Serialize + Debug + ?Sized>(self, value: &T) -> Result<K, SendError> {
        let body = format!("{NGJSON_PREFIX}{}", json_text(value));
        self.finish(Some(HeaderValue::from_static(Format::Json.content_type())), Some(Bytes::from(body))).await
    }

    /// JSON prefixed with `for (;;);`, served as `application/x-javascript`
    pub async fn xjson<T: Serialize + Debug + ?Sized>(self, value: &T) -> Result<K, SendError> {
        let body = format!("{XJSON_PREFIX}{}", json_text(value));
        self.finish(Some(HeaderValue::from_static(APPLICATION_X_JAVASCRIPT)), Some(Bytes::from(body))).await
    }

    pub async fn html(self, html: &str) -> Result<K, SendError> {
        let body = Bytes::copy_from_slice(html.as_bytes());
        self.finish(Some(HeaderValue::from_static("text/html")), Some(body)).await
    }

    pub async fn text(self, text: &str) -> Result<K, SendError> {
        let body = Bytes::copy_from_slice(text.as_bytes());
        self.finish(Some(HeaderValue::from_static(Format::Text.content_type())), Some(body)).await
    }

    /// Redirects to `location`, with the configured redirect status unless a
    /// status was already chosen
    pub async fn redirect(mut self, location: &str) -> Result<K, SendError> {
        let value = HeaderValue::from_str(location).map_err(SendError::invalid_header)?;
        if self.is_default_status() {
            self.status = self.config.redirect();
        }

        self.sink.set_header(LOCATION, value);
        let body = format!("Redirecting to: {location}");
        self.finish(None, Some(Bytes::from(body))).await
    }

    /// Fails the exchange with the configured server error status unless a
    /// status was already chosen
    pub async fn die(mut self, message: Option<&str>) -> Result<K, SendError> {
        if self.is_default_status() {
            self.status = self.config.server_error();
        }

        let body = match message {
            Some(message) => format!("Failure: {message}"),
            None => "Failure".to_string(),
        };
        self.finish(Some(HeaderValue::from_static(Format::Text.content_type())), Some(Bytes::from(body))).await
    }

    /// Ends the response with the current status and no body
    pub async fn end(self) -> Result<K, SendError> {
        self.finish(None, None).await
    }

    /// Writes `body` as is under `content_type`
    pub async fn write_all(self, content_type: &str, body: impl Into<Bytes>) -> Result<K, SendError> {
        let content_type = HeaderValue::from_str(content_type).map_err(SendError::invalid_header)?;
        self.finish(Some(content_type), Some(body.into())).await
    }

    async fn finish(mut self, content_type: Option<HeaderValue>, body: Option<Bytes>) -> Result<K, SendError> {
        let size = body.as_ref().map_or(0, Bytes::len);
        debug!(status = %self.status, content_type = ?content_type, size, "send reply");

        self.sink.set_status(self.status);
        if let Some(content_type) = content_type {
            self.sink.set_header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = body {
            self.sink.write(body).await?;
        }
        self.sink.end().await?;
        Ok(self.sink)
    }
}

impl<K> Debug for Reply<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply").field("status", &self.status).field("accept", &self.accept).finish_non_exhaustive()
    }
}
