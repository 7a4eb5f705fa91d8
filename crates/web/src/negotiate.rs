//! Output format selection from the `Accept` preference.

use std::fmt::Debug;

use serde::Serialize;
use tracing::warn;

/// The encoding a response body is written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Text => "text/plain",
        }
    }
}

/// Picks the response format for an `Accept` preference.
///
/// Any preference mentioning `application/json`, in any case and at any
/// position, is answered with JSON. Everything else gets plain text. Quality
/// values are not weighed, a full `Accept` parser can replace this function
/// without touching its callers.
pub fn negotiate(accept: &str) -> Format {
    if accept.to_ascii_lowercase().contains("application/json") {
        Format::Json
    } else {
        Format::Text
    }
}

/// Serializes `value` to JSON text. A value that refuses to serialize is
/// reported as the JSON string of its `Debug` form.
///
/// Error results don't go through here, they use the `name: message` form of
/// [`ErrorResult::to_json`](crate::error::ErrorResult::to_json).
pub(crate) fn json_text<T: Serialize + Debug + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!(cause = %e, "failed to serialize response value, falling back to debug form");
        let fallback = format!("{value:?}");
        serde_json::to_string(&fallback).unwrap_or(fallback)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;
    use std::collections::HashMap;

    #[test]
    fn json_anywhere_in_accept() {
        assert_eq!(negotiate("application/json"), Format::Json);
        assert_eq!(negotiate("text/html, Application/JSON;q=0.9"), Format::Json);
        assert_eq!(negotiate("APPLICATION/JSON"), Format::Json);
        assert_eq!(negotiate("application/jsonp"), Format::Json);
    }

    #[test]
    fn everything_else_is_text() {
        assert_eq!(negotiate("text/plain"), Format::Text);
        assert_eq!(negotiate("*/*"), Format::Text);
        assert_eq!(negotiate(""), Format::Text);
        assert_eq!(negotiate("application/xml, text/json"), Format::Text);
    }

    #[test]
    fn content_types() {
        assert_eq!(Format::Json.content_type(), mime::APPLICATION_JSON.as_ref());
        assert_eq!(Format::Text.content_type(), mime::TEXT_PLAIN.as_ref());
    }

    #[derive(Debug)]
    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not today"))
        }
    }

    #[test]
    fn serialization_failure_falls_back_to_debug() {
        assert_eq!(json_text(&Broken), r#""Broken""#);

        let mut map = HashMap::new();
        map.insert("name", "Chris");
        assert_eq!(json_text(&map), r#"{"name":"Chris"}"#);
    }
}
