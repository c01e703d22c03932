//! EIP-191 personal-message signature verification over secp256k1.
//!
//! Wallets sign `"\x19Ethereum Signed Message:\n" + len(message) + message`
//! and hand back a 65-byte `(r, s, v)` signature. We recover the signer's
//! public key from the hash and derive its address the standard way:
//! the low 20 bytes of `keccak256(uncompressed_pubkey[1..])`.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::wallet::Wallet;

/// Recovers the signing wallet address from a hex-encoded 65-byte
/// signature over `message`. Returns `None` on any malformed input or a
/// signature that does not recover cleanly — the caller maps this to
/// `AuthError::BadSignature`.
pub fn recover_wallet(message: &str, signature_hex: &str) -> Option<Wallet> {
    let sig_bytes = decode_hex(signature_hex)?;
    if sig_bytes.len() != 65 {
        return None;
    }
    let (rs, v_byte) = sig_bytes.split_at(64);
    let signature = Signature::from_slice(rs).ok()?;
    let recovery_id = normalize_recovery_id(v_byte[0])?;

    let digest = eip191_hash(message);
    let verifying_key =
        VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id).ok()?;

    Some(address_from_public_key(&verifying_key))
}

fn eip191_hash(message: &str) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

fn address_from_public_key(key: &VerifyingKey) -> Wallet {
    let uncompressed = key.to_encoded_point(false);
    let bytes = uncompressed.as_bytes(); // 0x04 || X(32) || Y(32)
    let mut hasher = Keccak256::new();
    hasher.update(&bytes[1..]);
    let hash = hasher.finalize();
    Wallet::new(format!("0x{}", hex::encode(&hash[12..])))
}

fn normalize_recovery_id(v: u8) -> Option<RecoveryId> {
    let normalized = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return None,
    };
    RecoveryId::from_byte(normalized)
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::SigningKey;

    fn sign_message(key: &SigningKey, message: &str) -> String {
        let digest = eip191_hash(message);
        let (sig, recovery_id): (Signature, RecoveryId) =
            key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn recovers_the_signing_wallet() {
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let address = address_from_public_key(key.verifying_key());
        let message = "CRABS/Molt'em auth: test nonce 1 expires now";
        let signature = sign_message(&key, message);

        let recovered = recover_wallet(message, &signature).unwrap();
        assert_eq!(recovered, address);
    }

    #[test]
    fn rejects_signature_over_wrong_message() {
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let signature = sign_message(&key, "message a");
        let recovered = recover_wallet("message b", &signature).unwrap();
        assert_ne!(recovered, address_from_public_key(key.verifying_key()));
    }

    #[test]
    fn rejects_malformed_signature() {
        assert!(recover_wallet("hello", "0xnothex").is_none());
        assert!(recover_wallet("hello", "0x1234").is_none());
    }
}
