use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::EndpointClass;
use crate::craps::BetKind;
use crate::runtime::RuntimeError;

use super::dto::*;
use super::error::ApiError;
use super::state::{bearer_wallet, check_rate_limit, client_key, require_operator, AppState};
use super::ws;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/auth/challenge", get(auth_challenge))
        .route("/auth/verify", post(auth_verify))
        .route("/rules", get(rules))
        .route("/table/state", get(table_state))
        .route("/activity", get(activity))
        .route("/player/:wallet", get(player_public))
        .route("/player/me", get(player_me))
        .route("/cashout", post(cashout))
        .route("/table/join", post(craps_join))
        .route("/table/leave", post(craps_leave))
        .route("/bet/place", post(craps_place_bet))
        .route("/shooter/roll", post(craps_roll))
        .route("/table/sit", post(poker_sit))
        .route("/table/stand", post(poker_stand))
        .route("/action", post(poker_action))
        .route("/chat", post(poker_chat))
        .route("/operator/deposit", post(operator_deposit))
        .route("/operator/cashout/complete", post(operator_complete_cashout))
        .route("/operator/cashouts", get(operator_cashouts))
        .route("/operator/house", get(operator_house))
        .route("/operator/ledger", get(operator_ledger))
        .route("/ws/craps", get(ws::craps_ws))
        .route("/ws/poker", get(ws::poker_ws))
        .layer(middleware::from_fn(super::logging::log_requests))
        .layer(cors)
        .with_state(state)
}

// ---- auth -----------------------------------------------------------

async fn auth_challenge(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    check_rate_limit(&state, &client_key(&headers, None), EndpointClass::Auth)?;
    let wallet = parse_wallet(&query.wallet).map_err(ApiError::bad_request)?;
    let issued = state.auth.issue_challenge(&wallet);
    Ok(Json(ChallengeResponse {
        nonce: issued.nonce,
        message: issued.message,
        expiry: issued.expiry,
    }))
}

async fn auth_verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    check_rate_limit(&state, &client_key(&headers, None), EndpointClass::Auth)?;
    let wallet = parse_wallet(&body.wallet).map_err(ApiError::bad_request)?;
    let issued = state
        .auth
        .verify_challenge(&wallet, &body.signature, body.nonce, &body.message)?;
    Ok(Json(TokenResponse { token: issued.token, expiry: issued.expiry }))
}

// ---- common game endpoints -------------------------------------------

async fn rules() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "games": ["crabs", "moltem"],
        "craps_bet_kinds": BetKind::ALL,
        "poker_actions": ["fold", "check", "call", "bet", "raise", "all_in"],
        "error_taxonomy": [
            "validation", "authentication", "authorization", "phase",
            "resource", "duplicate", "rate_limit",
        ],
    }))
}

async fn table_state(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "craps": state.craps.public_state().await,
        "poker": state.poker.public_state().await,
    }))
}

async fn activity(State(_state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    // Live activity is delivered over the WebSocket stream; the
    // snapshot-on-subscribe semantics in §4.7 mean there is no separate
    // durable activity log to page through here.
    Json(serde_json::json!({ "events": [] }))
}

async fn player_public(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(wallet): axum::extract::Path<String>,
) -> Result<Json<PlayerPublicResponse>, ApiError> {
    let wallet = parse_wallet(&wallet).map_err(ApiError::bad_request)?;
    Ok(Json(PlayerPublicResponse {
        wallet: wallet.to_string(),
        balance: state.ledger.balance(&wallet),
    }))
}

async fn player_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    Ok(Json(serde_json::json!({
        "craps": state.craps.player_state(&wallet).await,
        "poker": state.poker.player_state(&wallet).await,
    })))
}

async fn cashout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CashoutRequestBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    let to_address = match body.to_address {
        Some(raw) => parse_wallet(&raw).map_err(ApiError::bad_request)?,
        None => wallet.clone(),
    };
    // A wallet seated at either table must stand/leave before cashing
    // out (§4.6); each runtime's own cashout_request only guards its
    // own table, so both are consulted here.
    if state.poker.player_state(&wallet).await["seated"] == serde_json::json!(true) {
        return Err(RuntimeError::SeatedCannotCashout.into());
    }
    state.craps.cashout_request(&wallet, body.amount, &to_address).await?;
    Ok(Json(serde_json::json!({ "status": "pending" })))
}

// ---- craps ------------------------------------------------------------

async fn craps_join(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<(), ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    state.craps.join(wallet).await?;
    Ok(())
}

async fn craps_leave(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<(), ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    state.craps.leave(&wallet).await?;
    Ok(())
}

async fn craps_place_bet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<PlaceBetRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    let bet = state.craps.place_bet(wallet, body.kind, body.amount).await?;
    Ok(Json(serde_json::to_value(bet).unwrap_or(serde_json::Value::Null)))
}

async fn craps_roll(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    let outcome = state.craps.roll(&wallet).await?;
    Ok(Json(serde_json::json!({
        "dice": outcome.dice,
        "phase_after": outcome.phase_after,
        "point_after": outcome.point_after,
    })))
}

// ---- poker --------------------------------------------------------------

async fn poker_sit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SitRequest>,
) -> Result<(), ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    state.poker.sit(wallet, body.buy_in).await?;
    Ok(())
}

async fn poker_stand(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<(), ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    state.poker.stand(&wallet).await?;
    Ok(())
}

async fn poker_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ActionRequest>,
) -> Result<(), ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    let action = body.into_player_action().map_err(ApiError::bad_request)?;
    state.poker.act(&wallet, action).await?;
    Ok(())
}

async fn poker_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChatRequest>,
) -> Result<(), ApiError> {
    let wallet = bearer_wallet(&state, &headers)?;
    check_rate_limit(&state, &client_key(&headers, Some(&wallet)), EndpointClass::GameAction)?;
    state.poker.chat(&wallet, body.message).await?;
    Ok(())
}

// ---- operator -----------------------------------------------------------

async fn operator_deposit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<OperatorDepositRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_operator(&state, &headers)?;
    let wallet = parse_wallet(&body.wallet).map_err(ApiError::bad_request)?;
    let record = state.ledger.confirm_deposit(&wallet, body.amount, &body.tx_ref)?;
    Ok(Json(serde_json::to_value(record).unwrap_or(serde_json::Value::Null)))
}

async fn operator_complete_cashout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<OperatorCompleteCashoutRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_operator(&state, &headers)?;
    let record = state.ledger.complete_cashout(body.id, &body.tx_ref)?;
    Ok(Json(serde_json::to_value(record).unwrap_or(serde_json::Value::Null)))
}

async fn operator_cashouts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_operator(&state, &headers)?;
    Ok(Json(serde_json::to_value(state.ledger.list_pending()).unwrap_or(serde_json::Value::Null)))
}

async fn operator_house(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_operator(&state, &headers)?;
    Ok(Json(serde_json::to_value(state.ledger.house_pnl()).unwrap_or(serde_json::Value::Null)))
}

async fn operator_ledger(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_operator(&state, &headers)?;
    Ok(Json(serde_json::to_value(state.ledger.journal(None, 1000)).unwrap_or(serde_json::Value::Null)))
}

