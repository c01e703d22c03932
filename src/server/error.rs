//! Transport-facing error envelope (§7): every error response is a
//! status code plus `{error, code?}`, never internal exception text.
//! Grounded on the teacher's `server/error.rs` `ApiError`, widened with
//! a `code` field so agents can programmatically branch on failure kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::auth::{AuthError, RateLimitError};
use crate::craps::CrapsError;
use crate::ledger::LedgerError;
use crate::poker::TableError;
use crate::runtime::RuntimeError;

const LOG_TARGET: &str = "server::error";

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Unauthorized(&'static str),
    RateLimited { retry_after_secs: u64 },
    Conflict(&'static str),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, code, retry_after_secs) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string(), None, None),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None, None),
            ApiError::Unauthorized(code) => {
                (StatusCode::UNAUTHORIZED, "authentication failed".to_string(), Some(code), None)
            }
            ApiError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate limit exceeded".to_string(),
                Some("rate_limited"),
                Some(retry_after_secs),
            ),
            ApiError::Conflict(code) => (StatusCode::CONFLICT, code.to_string(), Some(code), None),
            ApiError::Internal(message) => {
                error!(target: LOG_TARGET, %message, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string(), None, None)
            }
        };
        (status, Json(ErrorBody { error, code, retry_after_secs })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::NoChallenge => "no_challenge",
            AuthError::Mismatch => "challenge_mismatch",
            AuthError::Expired => "challenge_expired",
            AuthError::BadSignature => "bad_signature",
            AuthError::BadToken => "bad_token",
            AuthError::TokenExpired => "token_expired",
        };
        ApiError::Unauthorized(code)
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        ApiError::RateLimited { retry_after_secs: err.retry_after_secs }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::BelowMinimum => ApiError::Conflict("below_minimum"),
            LedgerError::InsufficientChips => ApiError::Conflict("insufficient_chips"),
            LedgerError::UnknownCashout(_) => ApiError::NotFound,
            LedgerError::Durability(message) | LedgerError::Load(message) => ApiError::internal(message),
        }
    }
}

impl From<CrapsError> for ApiError {
    fn from(err: CrapsError) -> Self {
        let code = match err {
            CrapsError::NotShooter => "not_shooter",
            CrapsError::BadPhase { .. } => "bad_phase",
            CrapsError::DuplicateBet => "duplicate_bet",
            CrapsError::ActiveBets => "active_bets",
            CrapsError::BadAmount => "bad_amount",
            CrapsError::NoShooter => "no_shooter",
            CrapsError::NotSeated => "not_seated",
            CrapsError::AlreadySeated => "already_seated",
        };
        ApiError::Conflict(code)
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        let code = match err {
            TableError::HandInProgress => "hand_in_progress",
            TableError::NotEnoughPlayers => "not_enough_players",
            TableError::SeatTaken => "seat_taken",
            TableError::TableFull => "table_full",
            TableError::NotSeated => "not_seated",
            TableError::HandInProgressForWallet => "hand_in_progress_for_wallet",
            TableError::BadBuyIn => "bad_buy_in",
            TableError::NoHandInProgress => "no_hand_in_progress",
            TableError::NotYourTurn => "not_your_turn",
            TableError::Action(_) => "illegal_action",
            TableError::State(_) => "illegal_state_transition",
        };
        ApiError::Conflict(code)
    }
}

impl From<RuntimeError> for ApiError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::InsufficientChips => ApiError::Conflict("insufficient_chips"),
            RuntimeError::Craps(e) => e.into(),
            RuntimeError::Poker(e) => e.into(),
            RuntimeError::Ledger(e) => e.into(),
            RuntimeError::RateLimited(e) => e.into(),
            RuntimeError::ChatTooLong => ApiError::bad_request("chat message exceeds the maximum length"),
            RuntimeError::SeatedCannotCashout => ApiError::Conflict("seated_cannot_cashout"),
        }
    }
}
