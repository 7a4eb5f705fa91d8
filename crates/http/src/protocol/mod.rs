//! Core protocol types for the inbound side of an HTTP message.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): [`PayloadItem`], one signal of a body
//!   transport, either a chunk or the end of stream
//!
//! - **Request Processing** ([`request`]): [`RequestHeader`], the method, URI and
//!   headers of an inbound message, including the `Content-Type` and `Accept`
//!   values used for negotiation
//!
//! - **Body Accumulation** ([`body`]): [`body::BodyAccumulator`] reads the
//!   transport once and fans the payload out to any number of readers
//!
//! - **Error Handling** ([`error`]):
//!   - [`ParseError`]: errors reading a request body
//!   - [`SendError`]: errors writing a response

mod message;
pub use message::PayloadItem;

mod request;
pub use request::RequestHeader;

mod error;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
