//! Async flavor of the counting adapter

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, ReadBuf};

use crate::stream::{StreamCounter, StreamObserver};
use crate::types::BytesReceived;

pin_project! {
    /// Async response-body wrapper that counts everything read through it
    ///
    /// Same contract as [`CountingReader`](crate::stream::CountingReader):
    /// one completion signal on end-of-stream, one error signal on the first
    /// failed poll, nothing after either.
    #[derive(Debug)]
    pub struct CountingBody<R, O> {
        #[pin]
        inner: R,
        counter: StreamCounter<O>,
        done: bool,
    }
}

impl<R, O: StreamObserver> CountingBody<R, O> {
    #[must_use]
    pub fn new(inner: R, observer: O) -> Self {
        Self {
            inner,
            counter: StreamCounter::new(observer),
            done: false,
        }
    }

    /// Bytes counted so far
    #[must_use]
    pub const fn bytes_read(&self) -> BytesReceived {
        self.counter.bytes_read()
    }

    /// Unwrap, discarding the counter state
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead, O: StreamObserver> AsyncRead for CountingBody<R, O> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let had_capacity = buf.remaining() > 0;
        let before = buf.filled().len();

        match this.inner.poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                if !*this.done {
                    let n = buf.filled().len() - before;
                    if n == 0 && had_capacity {
                        *this.done = true;
                        this.counter.on_eof();
                    } else {
                        this.counter.on_read(n);
                    }
                }
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => {
                if !*this.done {
                    *this.done = true;
                    this.counter.on_error(&e);
                }
                Poll::Ready(Err(e))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
