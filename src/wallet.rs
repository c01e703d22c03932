//! Wallet address identity: an opaque, case-normalized hex string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 20-byte hex wallet address, normalized to lowercase on construction.
///
/// Equality and hashing are case-insensitive by construction: every wallet
/// that enters the system is normalized once, here, and compared as plain
/// strings everywhere else.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet(String);

impl Wallet {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x` + 40 lowercase hex chars.
    pub fn is_well_formed(&self) -> bool {
        let body = self.0.strip_prefix("0x").unwrap_or(&self.0);
        body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Wallet {
    fn from(value: String) -> Self {
        Wallet::new(value)
    }
}

impl From<&str> for Wallet {
    fn from(value: &str) -> Self {
        Wallet::new(value)
    }
}
