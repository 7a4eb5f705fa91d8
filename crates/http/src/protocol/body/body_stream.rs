use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use http_body::Body;
use pin_project_lite::pin_project;
use tracing::trace;

use crate::protocol::{ParseError, PayloadItem};

pin_project! {
    /// Adapts any [`http_body::Body`] into the chunk transport a
    /// [`BodyAccumulator`](super::BodyAccumulator) consumes.
    ///
    /// - data frames become [`PayloadItem::Chunk`]
    /// - trailer frames are skipped
    /// - the end of the body becomes [`PayloadItem::Eof`]
    /// - a body error becomes [`ParseError::Transport`], nothing is yielded after it
    #[derive(Debug)]
    pub struct BodyStream<B> {
        #[pin]
        body: B,
        ended: bool,
    }
}

impl<B> BodyStream<B> {
    pub fn new(body: B) -> Self {
        Self { body, ended: false }
    }
}

impl<B> Stream for BodyStream<B>
where
    B: Body,
    B::Error: Display,
{
    type Item = Result<PayloadItem<B::Data>, ParseError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.ended {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.body.as_mut().poll_frame(cx)) {
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(data) => return Poll::Ready(Some(Ok(PayloadItem::Chunk(data)))),
                    Err(_trailers) => trace!("skip non data frame"),
                },
                Some(Err(e)) => {
                    *this.ended = true;
                    return Poll::Ready(Some(Err(ParseError::transport(e))));
                }
                None => {
                    *this.ended = true;
                    return Poll::Ready(Some(Ok(PayloadItem::Eof)));
                }
            }
        }
    }
}
