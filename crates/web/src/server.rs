//! Runs one request/response exchange in memory.
//!
//! [`Exchange`] wraps an `http::Request` into an [`IncomingMessage`] and a
//! [`Reply`] backed by a [`BufferedSink`], runs a handler over both and turns
//! the finished sink back into an `http::Response`. It is the glue between an
//! HTTP service layer and the negotiation types of this crate.

use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use micro_readall::protocol::body::BodyStream;
use tracing::{debug, error};

use crate::config::ReplyConfig;
use crate::request::IncomingMessage;
use crate::responder::Reply;
use crate::sink::BufferedSink;

#[derive(Debug, Default)]
pub struct ExchangeBuilder {
    config: Option<ReplyConfig>,
}

impl ExchangeBuilder {
    fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: ReplyConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Exchange {
        Exchange { config: Arc::new(self.config.unwrap_or_default()) }
    }
}

#[derive(Debug, Clone)]
pub struct Exchange {
    config: Arc<ReplyConfig>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Exchange {
    pub fn builder() -> ExchangeBuilder {
        ExchangeBuilder::new()
    }

    pub fn config(&self) -> &ReplyConfig {
        &self.config
    }

    /// Runs `handler` over `request`.
    ///
    /// The handler returns the sink handed back by one of the finishing methods
    /// of [`Reply`]. A handler error is logged and answered with a bare response
    /// carrying the configured server error status.
    pub async fn serve<B, F, Fut, E>(&self, request: Request<B>, handler: F) -> Response<Bytes>
    where
        F: FnOnce(IncomingMessage<BodyStream<B>>, Reply<BufferedSink>) -> Fut,
        Fut: Future<Output = Result<BufferedSink, E>>,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let message = IncomingMessage::from_request(request);
        let reply = Reply::for_request(&message, BufferedSink::new(), Arc::clone(&self.config));
        debug!(method = %message.method(), uri = %message.uri(), accept = reply.accept(), "serve exchange");

        match handler(message, reply).await {
            Ok(sink) => sink.into_response(),
            Err(e) => {
                let e: Box<dyn Error + Send + Sync> = e.into();
                error!(cause = %e, "handler failed, respond with server error");

                let mut response = Response::new(Bytes::new());
                *response.status_mut() = self.config.server_error();
                response
            }
        }
    }
}

/// Runs `handler` over `request` with the default configuration, see [`Exchange::serve`]
pub async fn serve<B, F, Fut, E>(request: Request<B>, handler: F) -> Response<Bytes>
where
    F: FnOnce(IncomingMessage<BodyStream<B>>, Reply<BufferedSink>) -> Fut,
    Fut: Future<Output = Result<BufferedSink, E>>,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    Exchange::default().serve(request, handler).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusError;
    use http::StatusCode;
    use http_body_util::Full;

    #[tokio::test]
    async fn handler_error_is_server_error() {
        let request = Request::new(Full::new(Bytes::new()));
        let response =
            serve(request, |_req, _reply| async { Err::<BufferedSink, _>(StatusError::forbidden("hidden")) }).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn configured_exchange() {
        let exchange = Exchange::builder()
            .config(ReplyConfig::default().with_server_error(StatusCode::BAD_GATEWAY))
            .build();
        assert_eq!(exchange.config().server_error(), StatusCode::BAD_GATEWAY);

        let request = Request::new(Full::new(Bytes::new()));
        let response = exchange.serve(request, |_req, reply| async move { reply.die(None).await }).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.body(), &Bytes::from_static(b"Failure"));
    }

    #[tokio::test]
    async fn accept_header_reaches_reply() {
        let request =
            Request::builder().header(http::header::ACCEPT, "application/json").body(Full::new(Bytes::new())).unwrap();
        let response = serve(request, |_req, reply| async move { reply.respond("quoted").await }).await;

        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "application/json");
        assert_eq!(response.body(), &Bytes::from_static(b"\"quoted\""));
    }
}
