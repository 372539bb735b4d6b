//! Deadline-bounded writes
//!
//! Each write is handed to a worker thread that owns the inner writer; the
//! calling thread waits for the result with a deadline. A write that misses
//! the deadline returns 0 bytes written and its eventual result is
//! discarded. The worker keeps draining queued writes in order, so a
//! timed-out write may still land on the inner writer later — callers that
//! need strict ordering must not reuse a timed-out writer.

use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::warn;

enum Request {
    Write(Vec<u8>),
    Flush,
}

struct Job {
    request: Request,
    reply: mpsc::SyncSender<io::Result<usize>>,
}

pub struct TimeoutWriter {
    jobs: mpsc::Sender<Job>,
    timeout: Duration,
}

impl TimeoutWriter {
    pub fn new<W: Write + Send + 'static>(mut inner: W, timeout: Duration) -> Self {
        let (jobs, queue) = mpsc::channel::<Job>();

        // The worker owns the inner writer and exits when the handle is
        // dropped. It is deliberately not joined: a stuck inner write must
        // not be able to hang the dropping thread.
        thread::spawn(move || {
            for job in queue {
                let result = match job.request {
                    Request::Write(buf) => inner.write(&buf),
                    Request::Flush => inner.flush().map(|()| 0),
                };
                // The caller may have timed out and dropped the receiver.
                let _ = job.reply.send(result);
            }
        });

        Self { jobs, timeout }
    }

    fn submit(&self, request: Request) -> io::Result<usize> {
        let (reply, result) = mpsc::sync_channel(1);
        self.jobs
            .send(Job { request, reply })
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "writer worker exited"))?;

        match result.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "write timed out");
                Ok(0)
            }
            Err(RecvTimeoutError::Disconnected) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "writer worker exited",
            )),
        }
    }
}

impl Write for TimeoutWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(Request::Write(buf.to_vec()))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.submit(Request::Flush).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct SlowWriter(Duration);

    impl Write for SlowWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            thread::sleep(self.0);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn fast_writes_pass_through() {
        let mut w = TimeoutWriter::new(Vec::new(), Duration::from_millis(500));
        let before = Instant::now();
        let n = w.write(b"hello world").unwrap();
        assert_eq!(n, 11);
        assert!(
            before.elapsed() < Duration::from_millis(100),
            "fast write must not wait for the deadline"
        );
    }

    #[test]
    fn slow_write_reports_zero() {
        let mut w = TimeoutWriter::new(
            SlowWriter(Duration::from_millis(500)),
            Duration::from_millis(100),
        );
        let before = Instant::now();
        let n = w.write(b"hello world").unwrap();
        let took = before.elapsed();

        assert_eq!(n, 0, "timed-out write reports nothing written");
        assert!(took >= Duration::from_millis(90), "deadline must be waited out");
        assert!(took < Duration::from_millis(400), "call must not wait for the writer");
    }

    #[test]
    fn flush_is_bounded_too() {
        let mut w = TimeoutWriter::new(Vec::new(), Duration::from_millis(200));
        w.write(b"abc").unwrap();
        w.flush().unwrap();
    }
}
