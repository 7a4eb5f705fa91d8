use std::fmt::Display;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while reading an inbound body.
///
/// The type is `Clone` because a single transport failure is delivered to every
/// consumer waiting on the same body.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("transport closed before the end of body")]
    UnexpectedEof,

    #[error("unknown text encoding: {name}")]
    UnknownEncoding { name: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io { source: Arc<io::Error> },
}

impl ParseError {
    pub fn transport<S: Display>(reason: S) -> Self {
        Self::Transport { reason: reason.to_string() }
    }

    pub fn unknown_encoding<S: ToString>(name: S) -> Self {
        Self::UnknownEncoding { name: name.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: Arc::new(e.into()) }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::io(e)
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("response already ended")]
    Closed,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_clones_share_io_source() {
        let error = ParseError::io(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
        let cloned = error.clone();

        assert_eq!(error.to_string(), "io error: peer reset");
        assert_eq!(cloned.to_string(), error.to_string());
    }

    #[test]
    fn io_errors_convert() {
        let parse: ParseError = io::Error::new(io::ErrorKind::UnexpectedEof, "short read").into();
        assert!(matches!(parse, ParseError::Io { ref source } if source.kind() == io::ErrorKind::UnexpectedEof));

        let send: SendError = io::Error::other("disk full").into();
        assert_eq!(send.to_string(), "io error: disk full");
    }
}
