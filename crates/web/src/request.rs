//! Inbound message handling.
//!
//! [`IncomingMessage`] pairs the request header with the body accumulator that
//! owns the request's transport. Every consumer reads the body through the
//! message, the transport itself is never handed out.

use std::fmt;

use bytes::{Buf, Bytes};
use futures::Stream;
use http::{HeaderMap, Method, Request, Uri};
use micro_readall::protocol::body::{BodyAccumulator, BodyStream, Read, TextEncoding};
use micro_readall::protocol::{ParseError, PayloadItem, RequestHeader};

/// An inbound HTTP message: its header plus the per-message body state.
///
/// The body state belongs to this message only, it is created with it and
/// dropped with it.
pub struct IncomingMessage<S> {
    header: RequestHeader,
    body: BodyAccumulator<S>,
}

impl<S> IncomingMessage<S> {
    /// Creates a message from its header and the transport delivering its body
    pub fn new(header: impl Into<RequestHeader>, transport: S) -> Self {
        Self { header: header.into(), body: BodyAccumulator::new(transport) }
    }

    /// Returns a reference to the underlying RequestHeader
    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        self.header.method()
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        self.header.uri()
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        self.header.headers()
    }

    /// Returns the body accumulator of this message
    pub fn body(&self) -> &BodyAccumulator<S> {
        &self.body
    }

    /// Reads the whole body, see [`BodyAccumulator::read`]
    pub fn read(&self, encoding: Option<TextEncoding>) -> Read<'_, S> {
        self.body.read(encoding)
    }
}

impl<B> IncomingMessage<BodyStream<B>> {
    /// Wraps a `http::Request` whose body implements `http_body::Body`
    pub fn from_request(request: Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts, BodyStream::new(body))
    }
}

impl<S, D, E> IncomingMessage<S>
where
    S: Stream<Item = Result<PayloadItem<D>, E>> + Unpin,
    D: Buf,
    E: Into<ParseError>,
{
    /// Reads the whole body as raw bytes
    pub async fn read_bytes(&self) -> Result<Bytes, ParseError> {
        self.body.read_bytes().await
    }

    /// Reads the whole body as text decoded with `encoding`
    pub async fn read_text(&self, encoding: TextEncoding) -> Result<String, ParseError> {
        self.body.read_text(encoding).await
    }
}

impl<S> fmt::Debug for IncomingMessage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingMessage").field("header", &self.header).field("body", &self.body).finish()
    }
}
