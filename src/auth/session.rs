//! Self-describing bearer session tokens.
//!
//! A token encodes `wallet:expiry` plus an HMAC-SHA256 tag keyed by a
//! process-wide server secret. `verify_token` recomputes the tag rather
//! than consulting any server-side session table, so tokens stay valid
//! across a restart even though the auth challenge store does not (§4.3,
//! §5: "a restart invalidates challenges but not issued tokens").

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::errors::AuthError;
use crate::wallet::Wallet;

pub const TOKEN_TTL_HOURS: i64 = 24;

type HmacSha256 = Hmac<Sha256>;

pub struct TokenIssuer {
    secret: Vec<u8>,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn issue(&self, wallet: &Wallet) -> (String, DateTime<Utc>) {
        let expiry = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
        (self.encode(wallet, expiry), expiry)
    }

    pub fn verify(&self, token: &str) -> Result<Wallet, AuthError> {
        let mut parts = token.split('.');
        let payload_b64 = parts.next().ok_or(AuthError::BadToken)?;
        let tag_b64 = parts.next().ok_or(AuthError::BadToken)?;
        if parts.next().is_some() {
            return Err(AuthError::BadToken);
        }

        let expected_tag = self.tag(payload_b64.as_bytes());
        let given_tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| AuthError::BadToken)?;
        if !constant_time_eq(&expected_tag, &given_tag) {
            return Err(AuthError::BadToken);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::BadToken)?;
        let payload = String::from_utf8(payload).map_err(|_| AuthError::BadToken)?;
        let mut fields = payload.splitn(2, ':');
        let wallet_str = fields.next().ok_or(AuthError::BadToken)?;
        let expiry_str = fields.next().ok_or(AuthError::BadToken)?;
        let expiry_unix: i64 = expiry_str.parse().map_err(|_| AuthError::BadToken)?;
        let expiry = DateTime::from_timestamp(expiry_unix, 0).ok_or(AuthError::BadToken)?;

        if Utc::now() > expiry {
            return Err(AuthError::TokenExpired);
        }

        Ok(Wallet::new(wallet_str))
    }

    fn encode(&self, wallet: &Wallet, expiry: DateTime<Utc>) -> String {
        let payload = format!("{}:{}", wallet.as_str(), expiry.timestamp());
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let tag = self.tag(payload_b64.as_bytes());
        let tag_b64 = URL_SAFE_NO_PAD.encode(tag);
        format!("{payload_b64}.{tag_b64}")
    }

    fn tag(&self, payload_b64: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(payload_b64);
        mac.finalize().into_bytes().to_vec()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_round_trips() {
        let issuer = TokenIssuer::new("test-secret");
        let wallet = Wallet::new("0xabc123");
        let (token, _expiry) = issuer.issue(&wallet);
        let verified = issuer.verify(&token).unwrap();
        assert_eq!(verified, wallet);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret");
        let wallet = Wallet::new("0xabc123");
        let (token, _) = issuer.issue(&wallet);
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(issuer.verify(&tampered).is_err());
    }

    #[test]
    fn survives_a_fresh_issuer_with_same_secret() {
        // simulates a process restart: a new TokenIssuer instance, same
        // secret, still validates a previously issued token.
        let wallet = Wallet::new("0xdead");
        let (token, _) = TokenIssuer::new("shared-secret").issue(&wallet);
        let verified = TokenIssuer::new("shared-secret").verify(&token).unwrap();
        assert_eq!(verified, wallet);
    }
}
