//! HTTP server bootstrap
//!
//! - Single-threaded tokio runtime: every handler runs on one thread
//! - hyper HTTP/1.1 connection driver per accepted socket
//! - Path routing to the built-in responders
//! - TCP_NODELAY for low latency

use crate::handlers::{self, Handler};
use crate::pending::RequestContext;
use crate::reactor::{Reactor, Tracker};
use crate::{Request, Response, Result, Router};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Interface bound when none is configured
pub const DEFAULT_LISTEN_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Port bound when none is configured
pub const DEFAULT_LISTEN_PORT: u16 = 5000;

const LISTEN_BACKLOG: i32 = 1024;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind
    pub listen_address: IpAddr,
    /// TCP port to bind
    pub listen_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS,
            listen_port: DEFAULT_LISTEN_PORT,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.listen_port)
    }
}

/// State shared by every connection of one server
pub struct ServerState {
    pub router: Router<Handler>,
    pub reactor: Reactor,
}

impl ServerState {
    pub fn new(router: Router<Handler>, reactor: Reactor) -> Self {
        Self { router, reactor }
    }

    /// Route a request and wait for its handler to answer
    pub async fn handle(&self, req: Request) -> Response {
        let Some(handler) = self.router.find(&req.path).copied() else {
            tracing::debug!(method = %req.method, path = %req.path, "no route");
            return Response::not_found();
        };

        tracing::debug!(method = %req.method, path = %req.path, query = ?req.query, "dispatch");
        let (ctx, reply) = RequestContext::new(req);
        handler(&self.reactor, ctx);

        match reply.await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!("handler dropped its completion without answering");
                Response::internal_error("Internal Server Error")
            }
        }
    }
}

/// A bound, not yet running, load-bearer server
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl Server {
    /// Bind the listening socket and register the built-in routes.
    ///
    /// Must be called from inside the tokio runtime that will run the
    /// server; fails with [`Error::Runtime`](crate::Error::Runtime)
    /// otherwise.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let reactor = Reactor::current(Arc::new(Tracker::new()))?;

        let socket = create_optimized_socket(&config.socket_addr())?;
        let listener = TcpListener::from_std(socket.into())?;
        let state = Arc::new(ServerState::new(handlers::routes()?, reactor));

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Resource counters of this server
    pub fn tracker(&self) -> Arc<Tracker> {
        Arc::clone(self.state.reactor.tracker())
    }

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves.
    ///
    /// Stops accepting at that point; connections and timers still in
    /// flight are dropped along with the runtime.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self { listener, state } = self;

        tracing::info!(addr = %listener.local_addr()?, "listening");

        tokio::select! {
            _ = accept_loop(listener, state) => {}
            _ = shutdown => tracing::info!("shutting down"),
        }

        Ok(())
    }
}

async fn accept_loop(listener: TcpListener, state: Arc<ServerState>) {
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper_util::rt::TokioIo;

    let tracker = Arc::clone(state.reactor.tracker());

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };

        let state = Arc::clone(&state);
        let conn_tracker = Arc::clone(&tracker);
        conn_tracker.connection_opened();

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move {
                    let response = state.handle(from_hyper_request(&req)).await;
                    Ok::<_, Infallible>(to_hyper_response(response))
                }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                // Only log if not a normal connection close
                if !e.is_incomplete_message() {
                    tracing::warn!(%peer, error = %e, "connection error");
                }
            }

            conn_tracker.connection_closed();
        });
    }
}

/// Build a current-thread runtime: the single event loop all handlers share
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Bind `config` and serve until Ctrl-C
pub fn run(config: ServerConfig) -> Result<()> {
    build_runtime()?.block_on(async move {
        let server = Server::bind(&config)?;
        server
            .run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
                    std::future::pending::<()>().await;
                }
            })
            .await
    })
}

/// Create a TCP listening socket with optimizations
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // TCP_NODELAY - disable Nagle's algorithm for lower latency
    socket.set_nodelay(true)?;

    socket.bind(&(*addr).into())?;
    socket.listen(LISTEN_BACKLOG)?;

    // tokio requires a non-blocking listener
    socket.set_nonblocking(true)?;

    Ok(socket)
}

/// Convert hyper request to our Request type
///
/// Keeps the request line only; headers and body are never consulted.
pub fn from_hyper_request<B>(req: &hyper::Request<B>) -> Request {
    let uri = req.uri();

    let mut request = Request::new(req.method().clone(), uri.path());
    request.query = uri.query().map(|s| s.to_string());
    request
}

/// Convert our Response to hyper Response
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut response = hyper::Response::new(Full::new(res.body));
    *response.status_mut() = http::StatusCode::from_u16(res.status.as_u16())
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

    for (name, value) in &res.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().append(name, value);
        }
    }

    response
}
