//! Response-body byte counting
//!
//! [`StreamCounter`] accumulates bytes read from a response body and signals
//! its observer exactly once: with the total on end-of-stream, or with the
//! error plus bytes-read-so-far on a failed read. The adapters
//! ([`CountingReader`] here, [`CountingBody`](crate::stream::CountingBody)
//! for async bodies) drive a counter from a real stream and guarantee the
//! single-signal contract even when callers keep polling after the end.

mod body;

pub use body::CountingBody;

use std::io::{self, ErrorKind, Read};

use crate::types::BytesReceived;

/// Receives the outcome of counting one response body
pub trait StreamObserver {
    /// The stream ended normally after `total` bytes
    fn on_complete(&mut self, total: BytesReceived);

    /// The stream failed after `read_so_far` bytes
    fn on_error(&mut self, error: &io::Error, read_so_far: BytesReceived);
}

/// Running byte count for one response body
///
/// `on_read` may be called any number of times by the single stream
/// consumer. `on_eof` and `on_error` each forward to the observer once; the
/// wrapped stream is expected to signal end-of-data only once (calling
/// `on_eof` twice double-reports). The adapters below enforce this; use them
/// unless you are wiring a custom stream.
#[derive(Debug)]
pub struct StreamCounter<O> {
    observer: O,
    total: BytesReceived,
}

impl<O: StreamObserver> StreamCounter<O> {
    #[must_use]
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            total: BytesReceived::ZERO,
        }
    }

    /// Add `n` successfully read bytes to the running total
    #[inline]
    pub fn on_read(&mut self, n: usize) {
        self.total.add(n);
    }

    /// Signal end-of-stream; reports the accumulated total to the observer
    pub fn on_eof(&mut self) {
        self.observer.on_complete(self.total);
    }

    /// Signal a read failure; reports the error and bytes-so-far
    pub fn on_error(&mut self, error: &io::Error) {
        self.observer.on_error(error, self.total);
    }

    /// Bytes counted so far
    #[must_use]
    #[inline]
    pub const fn bytes_read(&self) -> BytesReceived {
        self.total
    }

    /// Recover the observer
    pub fn into_observer(self) -> O {
        self.observer
    }
}

/// Blocking reader adapter that counts everything read through it
///
/// Signals the counter once on the first `Ok(0)` for a non-empty buffer
/// (end-of-stream) or on the first non-retryable error; reads after the
/// terminal signal pass through uncounted.
#[derive(Debug)]
pub struct CountingReader<R, O> {
    inner: R,
    counter: StreamCounter<O>,
    done: bool,
}

impl<R: Read, O: StreamObserver> CountingReader<R, O> {
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

impl<R: Read, O: StreamObserver> Read for CountingReader<R, O> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.inner.read(buf);
        if self.done {
            return result;
        }
        match &result {
            // Ok(0) on an empty buffer says nothing about the stream
            Ok(0) if !buf.is_empty() => {
                self.done = true;
                self.counter.on_eof();
            }
            Ok(n) => self.counter.on_read(*n),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                self.done = true;
                self.counter.on_error(e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Observer that records every terminal signal it receives
    #[derive(Debug, Default)]
    pub(crate) struct RecordingObserver {
        pub completions: Vec<u64>,
        pub errors: Vec<(ErrorKind, u64)>,
    }

    impl StreamObserver for RecordingObserver {
        fn on_complete(&mut self, total: BytesReceived) {
            self.completions.push(total.as_u64());
        }

        fn on_error(&mut self, error: &io::Error, read_so_far: BytesReceived) {
            self.errors.push((error.kind(), read_so_far.as_u64()));
        }
    }

    /// Reader that yields some bytes then fails
    struct FailingReader {
        remaining: usize,
        kind: ErrorKind,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(self.kind, "simulated failure"));
            }
            let n = self.remaining.min(buf.len());
            buf[..n].fill(b'x');
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_eof_reports_sum_of_reads() {
        let mut counter = StreamCounter::new(RecordingObserver::default());
        counter.on_read(10);
        counter.on_read(10);
        counter.on_eof();

        let observer = counter.into_observer();
        assert_eq!(observer.completions, vec![20]);
        assert!(observer.errors.is_empty());
    }

    #[test]
    fn test_eof_with_no_reads_reports_zero() {
        let mut counter = StreamCounter::new(RecordingObserver::default());
        counter.on_eof();
        assert_eq!(counter.into_observer().completions, vec![0]);
    }

    #[test]
    fn test_error_reports_bytes_so_far() {
        let mut counter = StreamCounter::new(RecordingObserver::default());
        counter.on_read(7);
        counter.on_error(&io::Error::new(ErrorKind::ConnectionReset, "reset"));

        let observer = counter.into_observer();
        assert!(observer.completions.is_empty());
        assert_eq!(observer.errors, vec![(ErrorKind::ConnectionReset, 7)]);
    }

    #[test]
    fn test_counting_reader_full_body() {
        let body = vec![b'a'; 300];
        let mut reader = CountingReader::new(Cursor::new(body), RecordingObserver::default());

        let mut sink = Vec::new();
        let copied = io::copy(&mut reader, &mut sink).expect("copy succeeds");
        assert_eq!(copied, 300);
        assert_eq!(reader.bytes_read().as_u64(), 300);

        // io::copy observed EOF; exactly one completion
        let observer = reader.counter.into_observer();
        assert_eq!(observer.completions, vec![300]);
        assert!(observer.errors.is_empty());
    }

    #[test]
    fn test_counting_reader_signals_eof_once() {
        let mut reader = CountingReader::new(Cursor::new(vec![1u8, 2, 3]), RecordingObserver::default());

        let mut buf = [0u8; 8];
        while reader.read(&mut buf).expect("read") > 0 {}
        // keep reading past the end
        assert_eq!(reader.read(&mut buf).expect("read"), 0);
        assert_eq!(reader.read(&mut buf).expect("read"), 0);

        let observer = reader.counter.into_observer();
        assert_eq!(observer.completions, vec![3]);
    }

    #[test]
    fn test_counting_reader_empty_buffer_is_not_eof() {
        let mut reader = CountingReader::new(Cursor::new(vec![9u8; 4]), RecordingObserver::default());

        assert_eq!(reader.read(&mut []).expect("read"), 0);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).expect("read"), 4);
        assert_eq!(reader.read(&mut buf).expect("read"), 0);

        let observer = reader.counter.into_observer();
        assert_eq!(observer.completions, vec![4]);
    }

    #[test]
    fn test_counting_reader_error_path() {
        let failing = FailingReader {
            remaining: 5,
            kind: ErrorKind::ConnectionReset,
        };
        let mut reader = CountingReader::new(failing, RecordingObserver::default());

        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).expect("first read"), 5);
        assert!(reader.read(&mut buf).is_err());
        // a second failed read is no longer reported
        assert!(reader.read(&mut buf).is_err());

        let observer = reader.counter.into_observer();
        assert!(observer.completions.is_empty());
        assert_eq!(observer.errors, vec![(ErrorKind::ConnectionReset, 5)]);
    }
}
