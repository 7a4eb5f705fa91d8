use micro_readall::protocol::ParseError;
use thiserror::Error;

/// Errors raised while decoding a request body into a structured value.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// reading the body itself failed, the transport error is passed through unchanged
    #[error(transparent)]
    Body(#[from] ParseError),

    #[error("invalid json body: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid form body: {source}")]
    Form {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("invalid query string: {source}")]
    Query {
        #[from]
        source: serde_qs::Error,
    },
}

impl DecodeError {
    /// A short machine readable classifier of the error
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Body(_) => "body",
            DecodeError::Json { .. } => "json",
            DecodeError::Form { .. } => "form",
            DecodeError::Query { .. } => "query",
        }
    }
}
