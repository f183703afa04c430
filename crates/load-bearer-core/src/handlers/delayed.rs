//! `/delay` responder

use crate::body;
use crate::pending::RequestContext;
use crate::query::effective_delay;
use crate::reactor::Reactor;
use std::time::Duration;

/// Reply 200 `Waited {d} ms` once `d` milliseconds have passed.
///
/// Arms a one-shot timer and returns immediately; the reactor keeps
/// serving other connections and timers during the wait.
pub fn delayed_response(reactor: &Reactor, ctx: RequestContext) {
    let wait = effective_delay(ctx.query());
    let pending = reactor.hold(ctx.into_completion(), body::waited(wait));

    reactor.schedule_once(Duration::from_millis(wait), move || {
        pending.deliver();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::Tracker;
    use crate::{Method, RequestBuilder, StatusCode};
    use std::sync::Arc;

    fn delay_request(query: &str) -> crate::Request {
        RequestBuilder::new(Method::GET, "/delay").query(query).build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_before_delay() {
        let reactor = Reactor::current(Arc::new(Tracker::new())).unwrap();
        let (ctx, mut reply) = RequestContext::new(delay_request("delay=100"));

        delayed_response(&reactor, ctx);
        assert!(reply.try_recv().is_err());
        assert_eq!(reactor.tracker().pending(), 1);
        assert_eq!(reactor.tracker().timers(), 1);

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(reply.try_recv().is_err());

        let response = reply.await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body_string().as_deref(), Some("Waited 100 ms"));
        assert_eq!(reactor.tracker().pending(), 0);
        assert_eq!(reactor.tracker().timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_requests() {
        let reactor = Reactor::current(Arc::new(Tracker::new())).unwrap();
        let (slow, slow_reply) = RequestContext::new(delay_request("delay=300"));
        let (fast, mut fast_reply) = RequestContext::new(delay_request("delay=10"));

        delayed_response(&reactor, slow);
        delayed_response(&reactor, fast);
        assert_eq!(reactor.tracker().pending(), 2);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let response = fast_reply.try_recv().unwrap();
        assert_eq!(response.body_string().as_deref(), Some("Waited 10 ms"));
        assert_eq!(reactor.tracker().pending(), 1);

        let response = slow_reply.await.unwrap();
        assert_eq!(response.body_string().as_deref(), Some("Waited 300 ms"));
        assert_eq!(reactor.tracker().pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_and_negative_delay() {
        let reactor = Reactor::current(Arc::new(Tracker::new())).unwrap();

        for query in ["", "delay=abc", "delay=-40"] {
            let (ctx, reply) = RequestContext::new(delay_request(query));
            delayed_response(&reactor, ctx);
            let response = reply.await.unwrap();
            assert_eq!(response.body_string().as_deref(), Some("Waited 0 ms"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_outlives_disconnect() {
        let reactor = Reactor::current(Arc::new(Tracker::new())).unwrap();
        let (ctx, reply) = RequestContext::new(delay_request("delay=50"));

        delayed_response(&reactor, ctx);
        drop(reply);
        assert_eq!(reactor.tracker().pending(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(reactor.tracker().pending(), 0);
        assert_eq!(reactor.tracker().timers(), 0);
    }
}
