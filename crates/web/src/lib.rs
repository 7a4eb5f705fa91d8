//! Body decoding and content negotiation for HTTP exchanges.
//!
//! The inbound side is an [`IncomingMessage`]: the request header plus a body
//! accumulator that reads the transport once and serves every consumer, see
//! [`micro_readall`]. [`extract`] decodes the body by method and content type.
//!
//! The outbound side is a [`Reply`]: it negotiates JSON or text from the
//! `Accept` preference, normalizes failures through [`error`] and writes to a
//! [`ResponseSink`].
//!
//! # Example
//! ```
//! use bytes::Bytes;
//! use http::Request;
//! use http_body_util::Full;
//! use micro_negotiate::serve;
//!
//! # futures::executor::block_on(async {
//! let request = Request::post("/length").body(Full::new(Bytes::from("This is only a test, so chill."))).unwrap();
//! let response = serve(request, |req, reply| async move {
//!     let text = req.read_text(micro_readall::protocol::body::TextEncoding::Utf8).await;
//!     match text {
//!         Ok(text) => reply.respond(&text.len()).await,
//!         Err(e) => reply.respond_error(&e).await,
//!     }
//! })
//! .await;
//!
//! assert_eq!(response.body(), &Bytes::from_static(b"30"));
//! # });
//! ```

mod config;
mod request;
mod responder;
mod server;
mod sink;

pub mod error;
pub mod extract;
pub mod negotiate;

pub use config::ReplyConfig;
pub use request::IncomingMessage;
pub use responder::Reply;
pub use server::Exchange;
pub use server::ExchangeBuilder;
pub use server::serve;
pub use sink::BufferedSink;
pub use sink::ResponseSink;
