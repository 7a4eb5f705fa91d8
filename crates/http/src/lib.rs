//! Read an HTTP request body once, deliver it to every consumer.
//!
//! This crate is the transport side of `micro-negotiate`: it owns the body of an
//! inbound message and makes sure the underlying chunk stream is consumed at most
//! once, no matter how many logical consumers ask for the payload, or when.
//!
//! # Example
//!
//! ```
//! use futures::stream;
//! use micro_readall::protocol::body::{BodyAccumulator, TextEncoding};
//! use micro_readall::protocol::{ParseError, PayloadItem};
//!
//! # futures::executor::block_on(async {
//! let transport = stream::iter(vec![
//!     Ok::<_, ParseError>(PayloadItem::from("This is only a test, ")),
//!     Ok(PayloadItem::from("so chill.")),
//!     Ok(PayloadItem::Eof),
//! ]);
//! let body = BodyAccumulator::new(transport);
//!
//! // two consumers, one transport
//! let (text, bytes) = futures::join!(body.read_text(TextEncoding::Utf8), body.read_bytes());
//! assert_eq!(text.unwrap().len(), 30);
//! assert_eq!(bytes.unwrap().len(), 30);
//!
//! // a late consumer gets the cached payload
//! assert_eq!(body.read_text(TextEncoding::Hex).await.unwrap().len(), 60);
//! # });
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: payload items, request header, error types
//! - [`protocol::body`]: the accumulator, text encodings and the `http_body` adapter
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: transport and decoding errors while reading a body
//! - [`protocol::SendError`]: errors while writing a response
//!
//! # Limitations
//!
//! - No timeout or cancellation at this layer, a read on a transport that never
//!   ends never resolves; wrap it in `tokio::time::timeout` when needed
//! - The whole body is buffered in memory

pub mod protocol;
