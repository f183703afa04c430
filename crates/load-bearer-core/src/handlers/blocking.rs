//! `/block` responder

use crate::body;
use crate::pending::RequestContext;
use crate::query::effective_delay;
use crate::reactor::Reactor;
use std::time::{Duration, Instant};

/// Reply 200 `Waited {d} ms` after sleeping `d` milliseconds on the
/// reactor thread.
///
/// Nothing else on the server makes progress while this runs, which is the
/// point: it behaves like a single-threaded backend with no concurrency.
pub fn blocking_response(reactor: &Reactor, ctx: RequestContext) {
    let wait = effective_delay(ctx.query());
    let pending = reactor.hold(ctx.into_completion(), body::waited(wait));

    stall(Duration::from_millis(wait));

    pending.deliver();
}

/// Block the current thread for the full `delay`.
///
/// Waking early is fatal: the process aborts instead of answering after a
/// shorter wait than was asked for.
fn stall(delay: Duration) {
    let started = Instant::now();
    std::thread::sleep(delay);

    let slept = started.elapsed();
    if slept < delay {
        tracing::error!(
            requested_ms = delay.as_millis() as u64,
            slept_ms = slept.as_millis() as u64,
            "blocking sleep ended early, aborting"
        );
        std::process::abort();
    }
}
