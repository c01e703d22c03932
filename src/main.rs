//! Process entry point: initializes tracing, loads configuration from
//! the environment, and runs the server until shutdown. Grounded on the
//! teacher's `bin/legit_poker_server.rs` `init_tracing` pattern, with
//! the clap/JSON-toggle/shuffler-bootstrap machinery dropped since this
//! binary has no equivalent surface to configure.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crabs_moltem::config::ServerConfig;
use crabs_moltem::server::run_server;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    run_server(config).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::fmt().with_env_filter(filter).with_target(false).compact().init();
}
