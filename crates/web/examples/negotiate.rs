use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response};
use http_body_util::Full;
use serde::Serialize;
use std::fmt;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use micro_negotiate::error::StatusError;
use micro_negotiate::{BufferedSink, IncomingMessage, Reply, ReplyConfig, Exchange};
use micro_readall::protocol::body::BodyStream;

#[derive(Serialize, Debug)]
struct Greeting {
    name: String,
    length: usize,
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hello {}, you sent {} bytes", self.name, self.length)
    }
}

async fn greet(
    req: IncomingMessage<BodyStream<Full<Bytes>>>,
    reply: Reply<BufferedSink>,
) -> Result<BufferedSink, micro_readall::protocol::SendError> {
    // a logging layer and the handler both read the body, the transport is read once
    let (raw, data) = futures::join!(req.read_bytes(), req.read_data());

    let data = match data {
        Ok(data) => data,
        Err(e) => return reply.respond_error(&e).await,
    };

    let Some(name) = data.field("name") else {
        return reply.respond_error(&StatusError::bad_request("missing field: name").attach("field", "name")).await;
    };

    let greeting = Greeting { name: name.into_owned(), length: raw.map(|raw| raw.len()).unwrap_or_default() };
    reply.respond(&greeting).await
}

fn print(label: &str, response: &Response<Bytes>) {
    info!(
        label,
        status = %response.status(),
        content_type = ?response.headers().get(CONTENT_TYPE),
        body = %String::from_utf8_lossy(response.body()),
        "exchange finished"
    );
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let exchange = Exchange::builder().config(ReplyConfig::default()).build();

    let json_request = Request::builder()
        .method(Method::POST)
        .uri("/greet")
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .body(Full::new(Bytes::from_static(br#"{"name":"Chris"}"#)))
        .expect("valid request");
    print("json", &exchange.serve(json_request, greet).await);

    let form_request = Request::builder()
        .method(Method::POST)
        .uri("/greet")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Full::new(Bytes::from_static(b"name=Chris")))
        .expect("valid request");
    print("form", &exchange.serve(form_request, greet).await);

    let missing_request = Request::builder()
        .method(Method::GET)
        .uri("/greet?nickname=chris")
        .header(ACCEPT, "application/json")
        .body(Full::new(Bytes::new()))
        .expect("valid request");
    print("missing", &exchange.serve(missing_request, greet).await);
}
