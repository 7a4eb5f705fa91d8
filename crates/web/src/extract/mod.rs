//! Structured decoding of request bodies.
//!
//! [`IncomingMessage::read_data`](crate::IncomingMessage::read_data) turns a
//! request into a [`BodyData`] value:
//!
//! - requests whose method carries no body (`GET`, `HEAD`, ...) decode their
//!   query string, the body transport is left untouched
//! - `application/json` bodies decode to a JSON value, an empty body is `Null`
//! - `application/x-www-form-urlencoded` bodies decode to ordered pairs
//! - anything else is handed back as raw bytes
//!
//! Typed variants are available through `read_json`, `read_form` and
//! `read_query`.
//!
//! # Example
//! ```
//! # use serde::Deserialize;
//! # use micro_negotiate::IncomingMessage;
//! # use micro_negotiate::extract::DecodeError;
//! # use micro_readall::protocol::body::BodyStream;
//! # use http_body::Body;
//! # use std::fmt::Display;
//! # #[allow(dead_code)]
//! #[derive(Deserialize, Debug)]
//! struct Params {
//!     name: String,
//!     zip: String,
//! }
//!
//! # #[allow(dead_code)]
//! async fn handle<B>(req: IncomingMessage<BodyStream<B>>) -> Result<String, DecodeError>
//! where
//!     B: Body + Unpin,
//!     B::Error: Display,
//! {
//!     let params: Params = req.read_json().await?;
//!     Ok(format!("received params: {:?}", params))
//! }
//! ```

mod content_kind;
mod decoder;
mod error;
mod form;

pub use content_kind::ContentKind;
pub use decoder::BodyData;
pub use error::DecodeError;
pub use form::FormData;
