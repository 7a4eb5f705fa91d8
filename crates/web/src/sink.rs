//! The outbound side of an exchange.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use micro_readall::protocol::SendError;

/// Accepts a status, headers and a byte payload for one response.
///
/// Status and headers may be set until the first write. `end` finishes the
/// response, later writes fail with [`SendError::Closed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseSink: Send {
    fn set_status(&mut self, status: StatusCode);

    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    async fn write(&mut self, data: Bytes) -> Result<(), SendError>;

    async fn end(&mut self) -> Result<(), SendError>;
}

/// A [`ResponseSink`] that keeps the whole response in memory.
#[derive(Debug)]
pub struct BufferedSink {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    ended: bool,
}

impl Default for BufferedSink {
    fn default() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: BytesMut::new(), ended: false }
    }
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Converts the buffered state into an `http::Response`
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body.freeze());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[async_trait]
impl ResponseSink for BufferedSink {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    async fn write(&mut self, data: Bytes) -> Result<(), SendError> {
        if self.ended {
            return Err(SendError::Closed);
        }
        self.body.extend_from_slice(&data);
        Ok(())
    }

    async fn end(&mut self) -> Result<(), SendError> {
        if self.ended {
            return Err(SendError::Closed);
        }
        self.ended = true;
        Ok(())
    }
}
