//! load-bearer: stupidly simple HTTP server for performance and load tests

use anyhow::Context;
use clap::Parser;
use load_bearer_core::server::{self, ServerConfig, DEFAULT_LISTEN_PORT};
use std::io::IsTerminal;
use std::net::IpAddr;

// Use mimalloc for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Serve `/` (immediate), `/delay` (non-blocking delay) and `/block`
/// (process-stalling delay) for load and latency testing.
#[derive(Debug, Parser)]
#[clap(name = "load-bearer", version)]
struct Cli {
    /// Interface to bind
    #[clap(long, short = 'a', default_value = "0.0.0.0")]
    listen_address: IpAddr,

    /// TCP port to bind
    #[clap(long, short = 'p', default_value_t = DEFAULT_LISTEN_PORT)]
    listen_port: u16,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            listen_address: cli.listen_address,
            listen_port: cli.listen_port,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let config = ServerConfig::from(Cli::parse());
    let addr = config.socket_addr();

    server::run(config).with_context(|| format!("load-bearer failed serving on {addr}"))
}
