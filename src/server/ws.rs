//! WebSocket subscription endpoints (§6): a client opens one socket per
//! table and receives its visibility-filtered event projection,
//! snapshot first, as JSON-encoded [`crate::events::EventEnvelope`]
//! frames. Identity is fixed at subscribe time and never changes for
//! the lifetime of the socket, per §4.7.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::warn;

use crate::events::Viewer;

use super::state::AppState;

const LOG_TARGET: &str = "server::ws";

#[derive(Deserialize)]
pub struct WsQuery {
    /// Bearer token for a player connection; absent means spectator.
    #[serde(default)]
    token: Option<String>,
}

pub async fn craps_ws(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let viewer = resolve_viewer(&state, query.token.as_deref());
    ws.on_upgrade(move |socket| async move {
        let sub = state.craps.subscribe(viewer).await;
        run_socket(socket, sub, &state.craps.table_id).await;
    })
}

pub async fn poker_ws(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let viewer = resolve_viewer(&state, query.token.as_deref());
    ws.on_upgrade(move |socket| async move {
        let sub = state.poker.subscribe(viewer).await;
        run_socket(socket, sub, &state.poker.table_id).await;
    })
}

fn resolve_viewer(state: &AppState, token: Option<&str>) -> Viewer {
    match token {
        None => Viewer::Spectator,
        Some(token) if token == state.config.operator_key => Viewer::OperatorObserver,
        Some(token) => match state.auth.verify_token(token) {
            Ok(wallet) => Viewer::Player(wallet),
            Err(_) => Viewer::Spectator,
        },
    }
}

/// Streams envelopes to the client until the socket closes or the
/// subscriber is dropped from the bus (slow-consumer disconnect, §4.7).
async fn run_socket(mut socket: WebSocket, mut sub: crate::events::Subscription, table: &str) {
    loop {
        tokio::select! {
            envelope = sub.rx.recv() => {
                let Some(envelope) = envelope else { break };
                let payload = match serde_json::to_string(&envelope) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(target: LOG_TARGET, %table, %err, "failed to encode event envelope");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}

