//! Challenge issuance and one-shot verification (§4.3).

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;

use crate::auth::errors::AuthError;
use crate::auth::signature::recover_wallet;
use crate::wallet::Wallet;

const CHALLENGE_TTL_MINUTES: i64 = 5;
/// Opportunistic eviction kicks in once the store crosses this size —
/// "order of thousands" per §4.3.
const EVICTION_THRESHOLD: usize = 2048;

#[derive(Clone, Debug)]
pub struct Challenge {
    pub wallet: Wallet,
    pub nonce: u64,
    pub message: String,
    pub expiry: DateTime<Utc>,
}

pub struct ChallengeStore {
    challenges: DashMap<Wallet, Challenge>,
    evictions: AtomicU64,
}

impl Default for ChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self {
            challenges: DashMap::new(),
            evictions: AtomicU64::new(0),
        }
    }

    /// Issues a fresh challenge for `wallet`, replacing any prior pending
    /// one (§4.3: "replacing any prior").
    pub fn issue(&self, wallet: &Wallet) -> Challenge {
        self.maybe_evict_expired();

        let nonce = rand::rngs::OsRng.next_u64();
        let expiry = Utc::now() + Duration::minutes(CHALLENGE_TTL_MINUTES);
        let message = canonical_message(wallet, nonce, expiry);
        let challenge = Challenge {
            wallet: wallet.clone(),
            nonce,
            message,
            expiry,
        };
        self.challenges.insert(wallet.clone(), challenge.clone());
        challenge
    }

    /// Verifies a signed challenge response. One-shot: the challenge is
    /// removed whether verification succeeds or fails with `Expired`, but
    /// left in place on a `Mismatch` so the legitimate holder can retry.
    pub fn verify(
        &self,
        wallet: &Wallet,
        signature: &str,
        nonce: u64,
        message: &str,
    ) -> Result<(), AuthError> {
        let pending = self
            .challenges
            .get(wallet)
            .map(|entry| entry.value().clone())
            .ok_or(AuthError::NoChallenge)?;

        if pending.nonce != nonce || pending.message != message {
            return Err(AuthError::Mismatch);
        }

        if Utc::now() > pending.expiry {
            self.challenges.remove(wallet);
            return Err(AuthError::Expired);
        }

        let recovered = recover_wallet(message, signature).ok_or(AuthError::BadSignature)?;
        if &recovered != wallet {
            return Err(AuthError::BadSignature);
        }

        // Success: one-shot, remove regardless.
        self.challenges.remove(wallet);
        Ok(())
    }

    fn maybe_evict_expired(&self) {
        if self.challenges.len() < EVICTION_THRESHOLD {
            return;
        }
        let now = Utc::now();
        self.challenges.retain(|_, c| c.expiry > now);
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}

fn canonical_message(wallet: &Wallet, nonce: u64, expiry: DateTime<Utc>) -> String {
    format!(
        "CRABS/Molt'em auth: {} nonce {} expires {}",
        wallet.as_str(),
        nonce,
        expiry.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_without_challenge_fails() {
        let store = ChallengeStore::new();
        let wallet = Wallet::new("0xabc");
        let err = store.verify(&wallet, "0xdead", 1, "msg").unwrap_err();
        assert!(matches!(err, AuthError::NoChallenge));
    }

    #[test]
    fn mismatched_nonce_fails_without_consuming_challenge() {
        let store = ChallengeStore::new();
        let wallet = Wallet::new("0xabc");
        let challenge = store.issue(&wallet);

        let err = store
            .verify(&wallet, "0xdead", challenge.nonce + 1, &challenge.message)
            .unwrap_err();
        assert!(matches!(err, AuthError::Mismatch));

        // challenge is still pending, unlike a successful/expired verify
        assert!(store.challenges.contains_key(&wallet));
    }
}
