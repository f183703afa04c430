//! Reactor handle and one-shot timers
//!
//! The server runs on a single-threaded tokio runtime. [`Reactor`] is the
//! handlers' view of it: it arms one-shot timers whose callbacks run on the
//! same thread once the delay has elapsed, and it creates the
//! [`PendingResponse`] holders those callbacks deliver.
//!
//! A [`Tracker`] counts live connections, pending holders and armed
//! timers so tests can check that nothing accumulates between requests.

use crate::pending::{Completion, PendingResponse};
use crate::Result;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Live-resource counters shared by a server and its reactor
#[derive(Debug, Default)]
pub struct Tracker {
    /// Open connections
    connections: AtomicU64,
    /// Pending response holders not yet released
    pending: AtomicU64,
    /// Timers armed but not yet fired
    timers: AtomicU64,
}

impl Tracker {
    /// Create a new tracker
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn connection_opened(&self) {
        self.connections.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn connection_closed(&self) {
        self.connections.fetch_sub(1, Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn pending_created(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn pending_released(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Current open connection count
    #[inline]
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::SeqCst)
    }

    /// Current pending response holder count
    #[inline]
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::SeqCst)
    }

    /// Timers armed and not yet fired
    #[inline]
    pub fn timers(&self) -> u64 {
        self.timers.load(Ordering::SeqCst)
    }
}

/// Handle to the event loop the handlers run on
#[derive(Debug, Clone)]
pub struct Reactor {
    handle: Handle,
    tracker: Arc<Tracker>,
}

impl Reactor {
    /// Create a reactor on the given runtime
    pub fn new(handle: Handle, tracker: Arc<Tracker>) -> Self {
        Self { handle, tracker }
    }

    /// Reactor for the runtime the caller is running on.
    ///
    /// Fails with [`Error::Runtime`](crate::Error::Runtime) outside a tokio
    /// runtime.
    pub fn current(tracker: Arc<Tracker>) -> Result<Self> {
        Ok(Self::new(Handle::try_current()?, tracker))
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Park `completion` with its prepared `body` until it is delivered
    pub fn hold(&self, completion: Completion, body: Bytes) -> PendingResponse {
        PendingResponse::new(completion, body, &self.tracker)
    }

    /// Run `callback` once, on the reactor, after `delay` has elapsed.
    ///
    /// Returns immediately. The timer cannot be cancelled through this
    /// API; the returned handle is only useful to await its completion.
    pub fn schedule_once<F>(&self, delay: Duration, callback: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let timer = ArmedTimer::new(&self.tracker);
        tracing::debug!(delay_ms = delay.as_millis() as u64, "timer armed");

        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            drop(timer);
            callback();
        })
    }
}

/// Counts a timer as armed until it fires or is dropped with the runtime
struct ArmedTimer {
    tracker: Arc<Tracker>,
}

impl ArmedTimer {
    fn new(tracker: &Arc<Tracker>) -> Self {
        tracker.timers.fetch_add(1, Ordering::SeqCst);
        Self {
            tracker: Arc::clone(tracker),
        }
    }
}

impl Drop for ArmedTimer {
    fn drop(&mut self) {
        self.tracker.timers.fetch_sub(1, Ordering::SeqCst);
    }
}
