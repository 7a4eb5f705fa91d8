//! HTTP request body accumulation.
//!
//! A request body arrives as a transport of chunks, possibly read by several
//! independent consumers: a logging layer, a decoder, the handler itself. This
//! module makes sure the transport is consumed exactly once while every consumer
//! still gets the full payload.
//!
//! # Architecture
//!
//! - [`BodyAccumulator`]: owns the transport and the per-message stream state,
//!   hands out [`Read`] futures
//! - [`TextEncoding`] / [`BodyContent`]: each read may decode the shared bytes
//!   with its own encoding
//! - [`BodyStream`]: turns any `http_body::Body` into a chunk transport
//!
//! # Transport
//!
//! A transport is any `Stream<Item = Result<PayloadItem<D>, E>> + Unpin` where
//! `D: bytes::Buf` and `E: Into<ParseError>`. `PayloadItem::Eof` ends it; a stream
//! closing without `Eof` is reported as [`ParseError::UnexpectedEof`].
//!
//! [`ParseError::UnexpectedEof`]: crate::protocol::ParseError::UnexpectedEof

mod accumulator;
mod body_stream;
mod encoding;

pub use accumulator::BodyAccumulator;
pub use accumulator::Phase;
pub use accumulator::Read;
pub use body_stream::BodyStream;
pub use encoding::BodyContent;
pub use encoding::TextEncoding;
