use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{Auth, ClientKey, EndpointClass};
use crate::config::ServerConfig;
use crate::ledger::Ledger;
use crate::runtime::{CrapsRuntime, PokerRuntime};
use crate::server::error::ApiError;
use crate::wallet::Wallet;

/// Everything a request handler needs: the shared ledger, auth
/// singleton, one runtime per table, and the static config (operator
/// key, money-policy minimums). One instance lives for the process.
pub struct AppState {
    pub config: ServerConfig,
    pub ledger: Arc<Ledger>,
    pub auth: Auth,
    pub craps: CrapsRuntime,
    pub poker: PokerRuntime,
}

/// Extracts `Authorization: Bearer <token>` and resolves it to a
/// wallet via the token issuer.
pub fn bearer_wallet(state: &AppState, headers: &HeaderMap) -> Result<Wallet, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("no_token"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("bad_token"))?;
    Ok(state.auth.verify_token(token)?)
}

/// Validates the `X-Operator-Key` header against the configured
/// operator key (§6 operator endpoints).
pub fn require_operator(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get("x-operator-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided == state.config.operator_key && !provided.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("operator_key_required"))
    }
}

pub fn client_key(headers: &HeaderMap, wallet: Option<&Wallet>) -> ClientKey {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    ClientKey {
        ip,
        wallet: wallet.map(|w| w.to_string()),
    }
}

pub fn check_rate_limit(state: &AppState, key: &ClientKey, class: EndpointClass) -> Result<(), ApiError> {
    Ok(state.auth.rate_limiter.check(key, class)?)
}
