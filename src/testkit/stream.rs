//! Channel-backed [`StreamConnector`] for feed tests.
//!
//! Each `open` creates a fresh duplex pair. The client half goes to the
//! dispatcher; the [`RemoteEnd`] is queued for the test to play the exchange.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Result, TransportError};
use crate::port::{DuplexStream, Frame, StreamConnector};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
pub struct ScriptedConnector {
    remotes: Mutex<VecDeque<RemoteEnd>>,
    urls: Mutex<Vec<String>>,
    fail_next: AtomicBool,
    opened: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `open` fail with a refused connection.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Take the oldest remote end not yet taken.
    pub fn remote(&self) -> Option<RemoteEnd> {
        self.remotes.lock().pop_front()
    }

    /// Successful opens so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl StreamConnector for ScriptedConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn DuplexStream>> {
        self.urls.lock().push(url.to_string());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "scripted connect failure",
            ))
            .into());
        }

        let (to_client, client_rx) = mpsc::unbounded_channel();
        let (client_tx, from_client) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        self.remotes.lock().push_back(RemoteEnd {
            to_client,
            from_client,
            closed: Arc::clone(&closed),
        });
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            rx: client_rx,
            tx: client_tx,
            closed,
        }))
    }
}

/// The exchange side of a scripted stream.
pub struct RemoteEnd {
    to_client: mpsc::UnboundedSender<Result<Frame>>,
    from_client: mpsc::UnboundedReceiver<Frame>,
    closed: Arc<AtomicBool>,
}

impl RemoteEnd {
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.to_client.send(Ok(Frame::Text(text.into())));
    }

    pub fn push_binary(&self, bytes: Vec<u8>) {
        let _ = self.to_client.send(Ok(Frame::Binary(bytes)));
    }

    /// Deliver a transport error to the client.
    pub fn fail(&self, error: TransportError) {
        let _ = self.to_client.send(Err(error.into()));
    }

    /// Drop the remote end; the client sees end of stream.
    pub fn hang_up(self) {}

    /// Next frame the client sent, waiting up to two seconds.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        tokio::time::timeout(RECV_TIMEOUT, self.from_client.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next text frame the client sent; binary frames are skipped.
    pub async fn next_text(&mut self) -> Option<String> {
        loop {
            match self.next_frame().await? {
                Frame::Text(text) => return Some(text),
                Frame::Binary(_) => continue,
            }
        }
    }

    /// Whether the client closed the stream.
    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct ScriptedStream {
    rx: mpsc::UnboundedReceiver<Result<Frame>>,
    tx: mpsc::UnboundedSender<Frame>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl DuplexStream for ScriptedStream {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        self.tx
            .send(frame)
            .map_err(|_| TransportError::Closed.into())
    }

    async fn recv(&mut self) -> Option<Result<Frame>> {
        self.rx.recv().await
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.rx.close();
        Ok(())
    }
}
