//! Request handlers
//!
//! Three responders, one per path:
//! - `/` answers `OK` at once
//! - `/delay` answers `Waited {d} ms` after `d` milliseconds without
//!   holding up the reactor
//! - `/block` answers the same after stalling the whole reactor thread
//!
//! All of them ignore the request method.

pub mod blocking;
pub mod delayed;
pub mod immediate;

use crate::pending::RequestContext;
use crate::reactor::Reactor;
use crate::{Result, Router};

pub use blocking::blocking_response;
pub use delayed::delayed_response;
pub use immediate::null_response;

/// Path of the immediate responder
pub const NULL_RESP_PATH: &str = "/";
/// Path of the non-blocking delayed responder
pub const DELAYED_RESP_PATH: &str = "/delay";
/// Path of the blocking delayed responder
pub const BLOCKING_RESP_PATH: &str = "/block";

/// A request handler.
///
/// Handlers run on the reactor thread and must either answer through the
/// context's completion before returning or hand it to something that will.
pub type Handler = fn(&Reactor, RequestContext);

/// Route table with the three built-in responders
pub fn routes() -> Result<Router<Handler>> {
    let mut router: Router<Handler> = Router::new();
    router.route(NULL_RESP_PATH, null_response)?;
    router.route(DELAYED_RESP_PATH, delayed_response)?;
    router.route(BLOCKING_RESP_PATH, blocking_response)?;
    Ok(router)
}
