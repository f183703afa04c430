//! `/` responder

use crate::body;
use crate::pending::RequestContext;
use crate::reactor::Reactor;
use crate::Response;

/// Reply 200 `OK` straight away, whatever the method or query
pub fn null_response(_reactor: &Reactor, ctx: RequestContext) {
    ctx.respond(Response::text(body::ok()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::Tracker;
    use crate::{Method, RequestBuilder, StatusCode};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_answers_before_returning() {
        let reactor = Reactor::current(Arc::new(Tracker::new())).unwrap();
        let request = RequestBuilder::new(Method::POST, "/")
            .query("delay=500")
            .build();
        let (ctx, mut reply) = RequestContext::new(request);

        null_response(&reactor, ctx);

        let response = reply.try_recv().unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body_string().as_deref(), Some("OK"));
        assert_eq!(reactor.tracker().timers(), 0);
        assert_eq!(reactor.tracker().pending(), 0);
    }

    #[tokio::test]
    async fn test_identical_responses() {
        let reactor = Reactor::current(Arc::new(Tracker::new())).unwrap();

        let bodies: Vec<_> = (0..5)
            .map(|_| {
                let (ctx, mut reply) = RequestContext::new(crate::Request::new(Method::GET, "/"));
                null_response(&reactor, ctx);
                reply.try_recv().unwrap().body
            })
            .collect();

        assert!(bodies.iter().all(|b| b == "OK"));
    }
}
