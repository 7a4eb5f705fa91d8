use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker, ready};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures::task::{ArcWake, waker};
use futures::{Stream, StreamExt};
use tracing::{debug, trace, warn};

use crate::protocol::body::{BodyContent, TextEncoding};
use crate::protocol::{ParseError, PayloadItem};

/// The read phase of a body. Transitions only move forward:
/// `NotStarted -> Reading -> Ended`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// nobody has asked for the body yet, the transport is untouched
    NotStarted,
    /// the transport is being consumed
    Reading,
    /// the transport reached end of stream or failed, the outcome is final
    Ended,
}

/// BodyAccumulator reads a chunked body transport exactly once and hands the
/// complete payload to every consumer that asks for it.
///
/// # Design
///
/// Consumers call [`BodyAccumulator::read`] through a shared reference, as many
/// times as they like, concurrently or one after another. The returned [`Read`]
/// futures cooperate through one shared stream state:
///
/// - the first poll moves the phase from `NotStarted` to `Reading`
/// - every pending reader is recorded as a waiter, in registration order
/// - any pending reader may poll the transport; the transport never sees a
///   reader's own waker but a shared notifier, and a notification from the
///   transport wakes every registered waiter
/// - when the transport ends, the buffer is frozen, the phase becomes `Ended` and
///   every waiter is woken in registration order
/// - readers arriving after `Ended` get the cached outcome without touching the
///   transport
///
/// A reader that stays alive without being polled again never holds up the
/// others, and neither does one that is dropped.
///
/// A transport error is terminal: the phase becomes `Ended`, the transport is
/// dropped, and the same error is delivered to all current and future readers.
pub struct BodyAccumulator<S> {
    state: Mutex<StreamState<S>>,
}

struct StreamState<S> {
    phase: Phase,
    transport: Option<S>,
    buffer: BytesMut,
    outcome: Option<Result<Bytes, ParseError>>,
    waiters: Arc<Waiters>,
    notifier: Waker,
    next_reader: u64,
}

struct Waiter {
    reader: u64,
    waker: Waker,
}

/// Wakers of the pending readers, in registration order.
///
/// It is the waker handed to the transport: a wake drains the set and wakes
/// every reader, each of them registers again on its next pending poll.
#[derive(Default)]
struct Waiters {
    list: Mutex<Vec<Waiter>>,
}

impl Waiters {
    fn lock(&self) -> MutexGuard<'_, Vec<Waiter>> {
        self.list.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, reader: u64, waker: &Waker) {
        let mut list = self.lock();
        match list.iter_mut().find(|waiter| waiter.reader == reader) {
            Some(waiter) => {
                if !waiter.waker.will_wake(waker) {
                    waiter.waker.clone_from(waker);
                }
            }
            None => list.push(Waiter { reader, waker: waker.clone() }),
        }
    }

    fn remove(&self, reader: u64) {
        self.lock().retain(|waiter| waiter.reader != reader);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    // wakes outside the lock, a woken reader may poll on this thread right away
    fn wake_all(&self) {
        let waiters = mem::take(&mut *self.lock());
        for waiter in waiters {
            waiter.waker.wake();
        }
    }
}

impl ArcWake for Waiters {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.wake_all();
    }
}

impl<S> BodyAccumulator<S> {
    /// Takes ownership of the transport. Nothing is read until the first
    /// [`Read`] future is polled.
    pub fn new(transport: S) -> Self {
        let waiters = Arc::new(Waiters::default());
        let state = StreamState {
            phase: Phase::NotStarted,
            transport: Some(transport),
            buffer: BytesMut::new(),
            outcome: None,
            notifier: waker(Arc::clone(&waiters)),
            waiters,
            next_reader: 0,
        };
        Self { state: Mutex::new(state) }
    }

    /// Returns the current read phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Returns true once the transport has been touched, the body can't be
    /// handed to anything else from then on.
    pub fn is_consumed(&self) -> bool {
        self.phase() != Phase::NotStarted
    }

    /// Reads the whole body.
    ///
    /// With `None` the future resolves to [`BodyContent::Bytes`], with an encoding
    /// it resolves to [`BodyContent::Text`] decoded from the same shared bytes.
    pub fn read(&self, encoding: Option<TextEncoding>) -> Read<'_, S> {
        Read { accumulator: self, encoding, reader: None }
    }

    // the lock is never held across an await point, a poisoned state is still consistent
    fn lock(&self) -> MutexGuard<'_, StreamState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, D, E> BodyAccumulator<S>
where
    S: Stream<Item = Result<PayloadItem<D>, E>> + Unpin,
    D: Buf,
    E: Into<ParseError>,
{
    /// Reads the whole body as raw bytes.
    pub async fn read_bytes(&self) -> Result<Bytes, ParseError> {
        self.read(None).await.map(BodyContent::into_bytes)
    }

    /// Reads the whole body as text decoded with `encoding`.
    pub async fn read_text(&self, encoding: TextEncoding) -> Result<String, ParseError> {
        match self.read(Some(encoding)).await? {
            BodyContent::Text(text) => Ok(text),
            BodyContent::Bytes(bytes) => Ok(encoding.decode(&bytes)),
        }
    }
}

impl<S> StreamState<S> {
    fn next_reader_id(&mut self) -> u64 {
        let id = self.next_reader;
        self.next_reader += 1;
        id
    }

    fn finish(&mut self, outcome: Result<Bytes, ParseError>) {
        self.phase = Phase::Ended;
        self.transport = None;
        self.outcome = Some(outcome);
    }

    fn poll_transport<D, E>(&mut self) -> Poll<()>
    where
        S: Stream<Item = Result<PayloadItem<D>, E>> + Unpin,
        D: Buf,
        E: Into<ParseError>,
    {
        loop {
            let Some(transport) = self.transport.as_mut() else {
                self.finish(Err(ParseError::invalid_body("body transport is gone while reading")));
                return Poll::Ready(());
            };

            let mut cx = Context::from_waker(&self.notifier);
            match ready!(transport.poll_next_unpin(&mut cx)) {
                Some(Ok(PayloadItem::Chunk(data))) => {
                    trace!(size = data.remaining(), "received body chunk");
                    self.buffer.put(data);
                }

                Some(Ok(PayloadItem::Eof)) => {
                    let bytes = mem::take(&mut self.buffer).freeze();
                    debug!(size = bytes.len(), waiters = self.waiters.len(), "finished reading body");
                    self.finish(Ok(bytes));
                    return Poll::Ready(());
                }

                Some(Err(e)) => {
                    let e: ParseError = e.into();
                    warn!(cause = %e, waiters = self.waiters.len(), "body transport failed");
                    self.finish(Err(e));
                    return Poll::Ready(());
                }

                None => {
                    warn!(size = self.buffer.len(), "body transport closed before end of stream");
                    self.finish(Err(ParseError::UnexpectedEof));
                    return Poll::Ready(());
                }
            }
        }
    }
}

impl<S> fmt::Debug for BodyAccumulator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("BodyAccumulator")
            .field("phase", &state.phase)
            .field("buffered", &state.buffer.len())
            .field("waiters", &state.waiters.len())
            .finish_non_exhaustive()
    }
}

/// Future returned by [`BodyAccumulator::read`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Read<'a, S> {
    accumulator: &'a BodyAccumulator<S>,
    encoding: Option<TextEncoding>,
    reader: Option<u64>,
}

impl<S> fmt::Debug for Read<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Read").field("encoding", &self.encoding).field("reader", &self.reader).finish()
    }
}

impl<S, D, E> Future for Read<'_, S>
where
    S: Stream<Item = Result<PayloadItem<D>, E>> + Unpin,
    D: Buf,
    E: Into<ParseError>,
{
    type Output = Result<BodyContent, ParseError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = this.accumulator.lock();
        let reader = *this.reader.get_or_insert_with(|| state.next_reader_id());

        if state.phase == Phase::NotStarted {
            debug!("start reading body");
            state.phase = Phase::Reading;
        }

        if state.phase == Phase::Reading {
            // registered before polling, a notification racing the poll still reaches this reader
            state.waiters.register(reader, cx.waker());
            if state.poll_transport().is_pending() {
                return Poll::Pending;
            }
        }

        state.waiters.remove(reader);
        let waiters = Arc::clone(&state.waiters);
        let outcome = state
            .outcome
            .clone()
            .unwrap_or_else(|| Err(ParseError::invalid_body("body ended without an outcome")));
        drop(state);

        // registration order
        waiters.wake_all();

        Poll::Ready(outcome.map(|bytes| BodyContent::new(bytes, this.encoding)))
    }
}

impl<S> Drop for Read<'_, S> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader {
            self.accumulator.lock().waiters.remove(reader);
        }
    }
}
