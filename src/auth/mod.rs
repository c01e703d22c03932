//! Challenge issuance, signature verification, session tokens, and rate
//! limiting (§4.3).

pub mod challenge;
pub mod errors;
pub mod rate_limit;
pub mod session;
pub mod signature;

use chrono::{DateTime, Utc};
use tracing::info;

pub use errors::{AuthError, RateLimitError};

use challenge::{Challenge, ChallengeStore};
use rate_limit::RateLimiter;
use session::TokenIssuer;

use crate::wallet::Wallet;

const LOG_TARGET: &str = "auth";

pub use rate_limit::{ClientKey, EndpointClass};

pub struct IssuedChallenge {
    pub nonce: u64,
    pub message: String,
    pub expiry: DateTime<Utc>,
}

pub struct IssuedToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

/// Process-wide auth singleton: challenge store, token issuer, and rate
/// limiter. Dependency-injected rather than a module-level global (§9).
pub struct Auth {
    challenges: ChallengeStore,
    tokens: TokenIssuer,
    pub rate_limiter: RateLimiter,
}

impl Auth {
    pub fn new(token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            challenges: ChallengeStore::new(),
            tokens: TokenIssuer::new(token_secret),
            rate_limiter: RateLimiter::new(),
        }
    }

    pub fn issue_challenge(&self, wallet: &Wallet) -> IssuedChallenge {
        let Challenge {
            nonce,
            message,
            expiry,
            ..
        } = self.challenges.issue(wallet);
        IssuedChallenge {
            nonce,
            message,
            expiry,
        }
    }

    pub fn verify_challenge(
        &self,
        wallet: &Wallet,
        signature: &str,
        nonce: u64,
        message: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.challenges.verify(wallet, signature, nonce, message)?;
        let (token, expiry) = self.tokens.issue(wallet);
        info!(target: LOG_TARGET, %wallet, "session token issued");
        Ok(IssuedToken { token, expiry })
    }

    pub fn verify_token(&self, token: &str) -> Result<Wallet, AuthError> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::{RecoveryId, Signature, SigningKey};
    use sha3::{Digest, Keccak256};

    fn eip191_hash(message: &str) -> [u8; 32] {
        let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
        let mut hasher = Keccak256::new();
        hasher.update(prefix.as_bytes());
        hasher.update(message.as_bytes());
        hasher.finalize().into()
    }

    fn wallet_for(key: &SigningKey) -> Wallet {
        let uncompressed = key.verifying_key().to_encoded_point(false);
        let bytes = uncompressed.as_bytes();
        let mut hasher = Keccak256::new();
        hasher.update(&bytes[1..]);
        let hash = hasher.finalize();
        Wallet::new(format!("0x{}", hex::encode(&hash[12..])))
    }

    fn sign(key: &SigningKey, message: &str) -> String {
        let digest = eip191_hash(message);
        let (sig, recovery_id): (Signature, RecoveryId) =
            key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn full_challenge_and_verify_cycle_issues_a_token() {
        let auth = Auth::new("test-secret");
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let wallet = wallet_for(&key);

        let issued = auth.issue_challenge(&wallet);
        let signature = sign(&key, &issued.message);

        let token = auth
            .verify_challenge(&wallet, &signature, issued.nonce, &issued.message)
            .unwrap();

        let recovered = auth.verify_token(&token.token).unwrap();
        assert_eq!(recovered, wallet);
    }

    #[test]
    fn one_shot_challenge_cannot_be_replayed() {
        let auth = Auth::new("test-secret");
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let wallet = wallet_for(&key);

        let issued = auth.issue_challenge(&wallet);
        let signature = sign(&key, &issued.message);

        auth.verify_challenge(&wallet, &signature, issued.nonce, &issued.message)
            .unwrap();

        let err = auth
            .verify_challenge(&wallet, &signature, issued.nonce, &issued.message)
            .unwrap_err();
        assert!(matches!(err, AuthError::NoChallenge));
    }
}
