//! Fixed-interval background polling of the unread-message count

use crate::error::Result;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Messages from the poller thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Unread(u64),
    Failed(String),
}

pub struct UnreadPoller {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    events: Receiver<PollEvent>,
}

impl UnreadPoller {
    /// Poll once right away, then every `interval` until stopped
    pub fn spawn<F>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Result<u64> + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (tx, events) = unbounded();

        let handle = thread::spawn(move || loop {
            let event = match fetch() {
                Ok(count) => PollEvent::Unread(count),
                Err(e) => {
                    warn!(error = %e, "unread count poll failed");
                    PollEvent::Failed(e.user_message())
                }
            };
            if tx.send(event).is_err() {
                break;
            }

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        debug!(?interval, "unread poller started");
        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            events,
        }
    }

    pub fn events(&self) -> &Receiver<PollEvent> {
        &self.events
    }

    /// Newest event received since the last call, if any
    pub fn latest(&self) -> Option<PollEvent> {
        self.events.try_iter().last()
    }

    /// Cancel the poller and wait for its thread to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!("unread poller stopped");
        }
    }
}

impl Drop for UnreadPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
