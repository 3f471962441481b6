//! An in-memory duplex byte pipe for driving a [`svnwire::Client`] against a
//! [`svnwire::Server`] in the same test process, with no child process or
//! socket involved.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Clone)]
struct Channel {
    buf: Arc<Mutex<VecDeque<u8>>>,
    cond: Arc<Condvar>,
    closed: Arc<Mutex<bool>>,
}

impl Channel {
    fn new() -> Self {
        Channel {
            buf: Arc::new(Mutex::new(VecDeque::new())),
            cond: Arc::new(Condvar::new()),
            closed: Arc::new(Mutex::new(false)),
        }
    }

    fn push(&self, data: &[u8]) {
        let mut buf = self.buf.lock().unwrap();
        buf.extend(data.iter().copied());
        self.cond.notify_all();
    }

    fn close(&self) {
        *self.closed.lock().unwrap() = true;
        self.cond.notify_all();
    }

    fn pop(&self, out: &mut [u8]) -> usize {
        let mut buf = self.buf.lock().unwrap();
        while buf.is_empty() {
            if *self.closed.lock().unwrap() {
                return 0;
            }
            buf = self.cond.wait(buf).unwrap();
        }
        let n = out.len().min(buf.len());
        for slot in out.iter_mut().take(n) {
            *slot = buf.pop_front().unwrap();
        }
        n
    }
}

pub struct PipeReader(Channel);

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.0.pop(buf))
    }
}

pub struct PipeWriter(Channel);

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.push(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        // Lets the peer's blocked read return a clean end-of-stream once
        // this end stops sending, the same signal a closed socket gives.
        self.0.close();
    }
}

/// Builds a connected `(client_end, server_end)` pair; each end is a
/// `(Read, Write)` half usable directly as `Connection`'s `R`/`W` params.
pub fn duplex_pair() -> ((PipeReader, PipeWriter), (PipeReader, PipeWriter)) {
    let client_to_server = Channel::new();
    let server_to_client = Channel::new();
    let client = (
        PipeReader(server_to_client.clone()),
        PipeWriter(client_to_server.clone()),
    );
    let server = (PipeReader(client_to_server), PipeWriter(server_to_client));
    (client, server)
}
