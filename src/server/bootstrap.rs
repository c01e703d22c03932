//! Process bootstrap: wires the config-loaded ledger, auth, and the two
//! table runtimes into one [`AppState`], builds the router, and serves
//! it with graceful shutdown. Grounded on the teacher's
//! `server/bootstrap.rs` listener/serve skeleton, stripped of its
//! Postgres/Supabase/ZK-specific wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::ledger::{Ledger, LedgerConfig};
use crate::poker::TableStakes;
use crate::runtime::{CrapsRuntime, PokerRuntime};

use super::routes::build_router;
use super::state::AppState;

const LOG_TARGET: &str = "server::bootstrap";
const CRAPS_TABLE_ID: &str = "crabs-main";
const POKER_TABLE_ID: &str = "moltem-main";

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let ledger = Arc::new(
        Ledger::open(LedgerConfig {
            min_deposit: config.min_deposit,
            min_cashout: config.min_cashout,
            journal_path: config.journal_path.clone(),
        })
        .context("failed to open ledger journal")?,
    );

    let auth = crate::auth::Auth::new(config.token_secret.clone().into_bytes());

    let craps = CrapsRuntime::new(CRAPS_TABLE_ID, config.craps_min_bet, config.craps_max_bet, ledger.clone());

    let poker = PokerRuntime::new(
        POKER_TABLE_ID,
        TableStakes {
            small_blind: config.poker_small_blind,
            big_blind: config.poker_big_blind,
        },
        config.poker_total_seats,
        config.poker_min_buy_in,
        config.poker_max_buy_in,
        ledger.clone(),
    );

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState { config, ledger, auth, craps, poker });
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(target: LOG_TARGET, %bind_addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!(target: LOG_TARGET, "shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target: LOG_TARGET, "shutdown signal received");
}
