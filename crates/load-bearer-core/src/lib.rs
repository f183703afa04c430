//! load-bearer-core: a stupidly simple HTTP server for load tests
//!
//! Three responders let a test harness compare a well-behaved asynchronous
//! backend against a worst-case synchronous one with the same binary:
//! - `/` - `OK`, immediately
//! - `/delay?delay=N` - `Waited N ms` after N ms, other requests keep flowing
//! - `/block?delay=N` - `Waited N ms` after N ms, the whole server stalls
//!
//! Everything runs on one single-threaded tokio runtime.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod body;
pub mod error;
pub mod handlers;
pub mod pending;
pub mod query;
pub mod reactor;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

// Re-exports
pub use error::{Error, Result};
pub use handlers::Handler;
pub use pending::{Completion, PendingResponse, RequestContext};
pub use reactor::{Reactor, Tracker};
pub use request::{Method, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use router::Router;
pub use server::{Server, ServerConfig, ServerState};
