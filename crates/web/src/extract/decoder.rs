use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, Bytes};
use futures::Stream;
use micro_readall::protocol::{ParseError, PayloadItem};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::IncomingMessage;
use crate::extract::{ContentKind, DecodeError, FormData};

/// A request body decoded according to its method and declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyData {
    /// a JSON typed request with an empty body
    Null,
    /// a JSON typed request body
    Json(Value),
    /// a form typed request body
    Form(FormData),
    /// the query string of a request whose method carries no body
    Query(FormData),
    /// any other body, unmodified
    Raw(Bytes),
}

impl BodyData {
    /// Returns a top level field as text.
    ///
    /// JSON strings are returned as is, other JSON values in their JSON form.
    /// Forms and queries return the first value sent for `key`.
    pub fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match self {
            BodyData::Json(Value::Object(object)) => object.get(key).map(|value| match value {
                Value::String(s) => Cow::Borrowed(s.as_str()),
                other => Cow::Owned(other.to_string()),
            }),
            BodyData::Form(form) | BodyData::Query(form) => form.get(key).map(Cow::Borrowed),
            BodyData::Null | BodyData::Json(_) | BodyData::Raw(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BodyData::Null)
    }
}

impl Serialize for BodyData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BodyData::Null => serializer.serialize_unit(),
            BodyData::Json(value) => value.serialize(serializer),
            BodyData::Form(form) | BodyData::Query(form) => form.serialize(serializer),
            BodyData::Raw(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl fmt::Display for BodyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyData::Null => f.write_str("null"),
            BodyData::Json(value) => write!(f, "{value}"),
            BodyData::Form(form) | BodyData::Query(form) => write!(f, "{form}"),
            BodyData::Raw(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl<S, D, E> IncomingMessage<S>
where
    S: Stream<Item = Result<PayloadItem<D>, E>> + Unpin,
    D: Buf,
    E: Into<ParseError>,
{
    /// Decodes the request into a [`BodyData`].
    ///
    /// Requests whose method carries no body decode their query string and never
    /// touch the body transport. Other requests read the whole body, then decode
    /// it by content type; transport errors are passed through unchanged.
    pub async fn read_data(&self) -> Result<BodyData, DecodeError> {
        if !self.header().need_body() {
            let query = self.header().query().unwrap_or_default();
            return Ok(BodyData::Query(FormData::parse(query.as_bytes())?));
        }

        let bytes = self.read_bytes().await?;
        let kind = ContentKind::detect(self.header().content_type());
        debug!(?kind, size = bytes.len(), "decode request body");

        match kind {
            ContentKind::Json if bytes.is_empty() => Ok(BodyData::Null),
            ContentKind::Json => Ok(BodyData::Json(serde_json::from_slice(&bytes)?)),
            ContentKind::Form => Ok(BodyData::Form(FormData::parse(&bytes)?)),
            ContentKind::Other => Ok(BodyData::Raw(bytes)),
        }
    }

    /// Reads the body and deserializes it from JSON, whatever the declared content type
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let bytes = self.read_bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Reads the body and deserializes it from `application/x-www-form-urlencoded`
    pub async fn read_form<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let bytes = self.read_bytes().await?;
        Ok(serde_urlencoded::from_bytes(&bytes)?)
    }

    /// Deserializes the query string, a missing query is treated as empty
    pub async fn read_query<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let query = self.header().query().unwrap_or_default();
        Ok(serde_qs::from_str(query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use http::{Method, Request};
    use indoc::indoc;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    type Item = Result<PayloadItem, ParseError>;
    type Transport = stream::Iter<std::vec::IntoIter<Item>>;

    fn message(method: Method, uri: &str, kind: Option<&str>, body: &'static str) -> IncomingMessage<Transport> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(kind) = kind {
            builder = builder.header(http::header::CONTENT_TYPE, kind);
        }
        let header = builder.body(()).unwrap();

        let mut items: Vec<Item> = Vec::new();
        if !body.is_empty() {
            items.push(Ok(PayloadItem::from(body)));
        }
        items.push(Ok(PayloadItem::Eof));

        IncomingMessage::new(header, stream::iter(items))
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Params {
        id: String,
        title: String,
    }

    #[tokio::test]
    async fn empty_json_is_null() {
        let req = message(Method::POST, "/", Some("application/json"), "");
        let data = req.read_data().await.unwrap();

        assert!(data.is_null());
        assert_eq!(data.to_string(), "null");
    }

    #[tokio::test]
    async fn json_body() {
        let body = indoc! {r#"
            {
                "id": "king",
                "title": "tortuga",
                "count": 3
            }
        "#};
        let req = message(Method::POST, "/extract-title", Some("Application/Json; charset=utf-8"), body);
        let data = req.read_data().await.unwrap();

        assert_eq!(data, BodyData::Json(json!({"id": "king", "title": "tortuga", "count": 3})));
        assert_eq!(data.field("title").as_deref(), Some("tortuga"));
        assert_eq!(data.field("count").as_deref(), Some("3"));
        assert_eq!(data.field("missing"), None);
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let req = message(Method::POST, "/", Some("application/json"), "{\"id\": ");
        let error = req.read_data().await.unwrap_err();

        assert!(matches!(error, DecodeError::Json { .. }));
        assert_eq!(error.kind(), "json");
    }

    #[tokio::test]
    async fn form_body() {
        let form = Some("application/x-www-form-urlencoded");
        let req = message(Method::POST, "/extract-id", form, "id=king&title=tortuga");
        let data = req.read_data().await.unwrap();

        assert!(matches!(data, BodyData::Form(_)));
        assert_eq!(data.field("id").as_deref(), Some("king"));
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"id":"king","title":"tortuga"}"#);
    }

    #[tokio::test]
    async fn other_body_is_raw() {
        let req = message(Method::PUT, "/", Some("text/plain"), "just text");
        assert_eq!(req.read_data().await.unwrap(), BodyData::Raw(Bytes::from_static(b"just text")));

        let req = message(Method::POST, "/", None, "no type");
        assert_eq!(req.read_data().await.unwrap(), BodyData::Raw(Bytes::from_static(b"no type")));
    }

    #[tokio::test]
    async fn get_decodes_query_without_touching_body() {
        let touched = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&touched);
        let transport = stream::poll_fn(move |_cx| {
            flag.store(true, Ordering::SeqCst);
            std::task::Poll::Ready(Some(Ok::<_, ParseError>(PayloadItem::<Bytes>::Eof)))
        });

        let header = Request::builder().method(Method::GET).uri("/search?q=chill&page=2").body(()).unwrap();
        let req = IncomingMessage::new(header, transport);

        let data = req.read_data().await.unwrap();
        assert!(matches!(data, BodyData::Query(_)));
        assert_eq!(data.field("q").as_deref(), Some("chill"));
        assert_eq!(data.field("page").as_deref(), Some("2"));
        assert!(!touched.load(Ordering::SeqCst));
        assert!(!req.body().is_consumed());
    }

    #[tokio::test]
    async fn get_without_query_is_empty() {
        let req = message(Method::GET, "/", None, "");
        assert_eq!(req.read_data().await.unwrap(), BodyData::Query(FormData::default()));
    }

    #[tokio::test]
    async fn transport_error_passes_through() {
        let items: Vec<Item> = vec![Ok(PayloadItem::from("{")), Err(ParseError::transport("reset by peer"))];
        let header =
            Request::builder().method(Method::POST).header("content-type", "application/json").body(()).unwrap();
        let req = IncomingMessage::new(header, stream::iter(items));

        let error = req.read_data().await.unwrap_err();
        assert!(matches!(error, DecodeError::Body(ParseError::Transport { .. })));
        assert_eq!(error.to_string(), "transport error: reset by peer");
    }

    #[tokio::test]
    async fn decoding_and_raw_reads_share_the_body() {
        let req = message(Method::POST, "/", Some("application/json"), r#"{"id":"king","title":"tortuga"}"#);

        let (data, raw, typed) = futures::join!(req.read_data(), req.read_bytes(), req.read_json::<Params>());

        assert_eq!(data.unwrap().field("id").as_deref(), Some("king"));
        assert_eq!(raw.unwrap().len(), 31);
        assert_eq!(typed.unwrap(), Params { id: "king".to_string(), title: "tortuga".to_string() });
    }

    #[tokio::test]
    async fn typed_form_and_query() {
        let form = Some("application/x-www-form-urlencoded");
        let req = message(Method::POST, "/?id=q&title=from-query", form, "id=king&title=tortuga");

        let form: Params = req.read_form().await.unwrap();
        assert_eq!(form, Params { id: "king".to_string(), title: "tortuga".to_string() });

        let query: Params = req.read_query().await.unwrap();
        assert_eq!(query.title, "from-query");

        let req_without_query = message(Method::GET, "/", None, "");
        assert!(matches!(req_without_query.read_query::<Params>().await, Err(DecodeError::Query { .. })));
    }
}
