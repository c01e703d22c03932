//! Process-wide configuration, loaded once at startup from the
//! environment (optionally via a `.env` file) the way the teacher's own
//! binary entry point loads its Supabase/RPC settings. Missing required
//! configuration (the operator key) is a non-zero exit, per §6 "Exit
//! codes" — not a recoverable runtime error.

use std::env;
use std::path::PathBuf;

use crate::money::Chips;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JOURNAL_PATH: &str = "ledger.journal.json";
const DEFAULT_MIN_DEPOSIT: u128 = 1;
const DEFAULT_MIN_CASHOUT: u128 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the server needs to boot: where to bind, where the ledger
/// journal lives, the secrets used to sign session tokens and to
/// authenticate the operator console, and the money-policy minimums.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub journal_path: PathBuf,
    pub token_secret: String,
    pub operator_key: String,
    pub min_deposit: Chips,
    pub min_cashout: Chips,
    pub craps_min_bet: Chips,
    pub craps_max_bet: Chips,
    pub poker_total_seats: u8,
    pub poker_small_blind: Chips,
    pub poker_big_blind: Chips,
    pub poker_min_buy_in: Chips,
    pub poker_max_buy_in: Chips,
}

impl ServerConfig {
    /// Loads configuration from the process environment, first merging
    /// in a `.env` file if one is present (silently ignored if absent —
    /// a deployed process is expected to set real environment variables).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();

        let operator_key = require_env("OPERATOR_KEY")?;
        let token_secret = env::var("TOKEN_SECRET").unwrap_or_else(|_| operator_key.clone());

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            journal_path: env::var("JOURNAL_PATH")
                .unwrap_or_else(|_| DEFAULT_JOURNAL_PATH.to_string())
                .into(),
            token_secret,
            operator_key,
            min_deposit: parse_chips("MIN_DEPOSIT", DEFAULT_MIN_DEPOSIT)?,
            min_cashout: parse_chips("MIN_CASHOUT", DEFAULT_MIN_CASHOUT)?,
            craps_min_bet: parse_chips("CRAPS_MIN_BET", 1)?,
            craps_max_bet: parse_chips("CRAPS_MAX_BET", 1_000_000)?,
            poker_total_seats: parse_u8("POKER_TOTAL_SEATS", 6)?,
            poker_small_blind: parse_chips("POKER_SMALL_BLIND", 1)?,
            poker_big_blind: parse_chips("POKER_BIG_BLIND", 2)?,
            poker_min_buy_in: parse_chips("POKER_MIN_BUY_IN", 50)?,
            poker_max_buy_in: parse_chips("POKER_MAX_BUY_IN", 500)?,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_chips(name: &'static str, default: u128) -> Result<Chips, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(Chips::new(default)),
        Ok(raw) => raw
            .parse::<u128>()
            .map(Chips::new)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn parse_u8(name: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse::<u8>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
