//! Request context and deferred responses
//!
//! Every dispatched request carries a [`Completion`], a one-shot handle
//! that delivers its response. Handlers that answer later park the handle
//! together with the prepared body in a [`PendingResponse`] until a timer
//! (or a blocking sleep) says it is time to reply.

use crate::reactor::Tracker;
use crate::{Request, Response};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Receiving half of a [`Completion`], awaited by the connection task
pub type Reply = oneshot::Receiver<Response>;

/// One-shot capability to deliver the response for a single request.
///
/// `send` consumes the handle, so a request can never be answered twice.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Response>,
}

impl Completion {
    /// Create a completion handle and the reply it resolves
    pub fn channel() -> (Self, Reply) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Deliver the response.
    ///
    /// Returns `false` when the connection went away before the reply was
    /// ready; the response is dropped in that case.
    pub fn send(self, response: Response) -> bool {
        if self.tx.send(response).is_err() {
            tracing::debug!("client disconnected before response was sent");
            return false;
        }
        true
    }
}

/// A routed request together with its completion handle
#[derive(Debug)]
pub struct RequestContext {
    request: Request,
    completion: Completion,
}

impl RequestContext {
    /// Wrap a request, returning the reply its handler will resolve
    pub fn new(request: Request) -> (Self, Reply) {
        let (completion, reply) = Completion::channel();
        (
            Self {
                request,
                completion,
            },
            reply,
        )
    }

    /// Raw query string, without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.request.query.as_deref()
    }

    /// Answer right away
    pub fn respond(self, response: Response) -> bool {
        self.completion.send(response)
    }

    /// Give up the request, keeping only the handle that answers it
    pub fn into_completion(self) -> Completion {
        self.completion
    }
}

/// A request whose 200 response has been prepared but not yet sent.
///
/// Owns both the completion handle and the body. [`deliver`](Self::deliver)
/// sends and releases them together; there is no way to release one
/// without the other.
#[derive(Debug)]
pub struct PendingResponse {
    completion: Completion,
    body: Bytes,
    _guard: PendingGuard,
}

impl PendingResponse {
    pub(crate) fn new(completion: Completion, body: Bytes, tracker: &Arc<Tracker>) -> Self {
        Self {
            completion,
            body,
            _guard: PendingGuard::new(tracker),
        }
    }

    /// Send the held body with status 200, consuming the holder
    pub fn deliver(self) -> bool {
        let Self {
            completion, body, ..
        } = self;
        tracing::debug!(bytes = body.len(), "delivering pending response");
        completion.send(Response::text(body))
    }
}

/// Keeps the tracker's pending count in step with live holders
#[derive(Debug)]
struct PendingGuard {
    tracker: Arc<Tracker>,
}

impl PendingGuard {
    fn new(tracker: &Arc<Tracker>) -> Self {
        tracker.pending_created();
        Self {
            tracker: Arc::clone(tracker),
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.tracker.pending_released();
    }
}
