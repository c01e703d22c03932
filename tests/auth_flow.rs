//! Challenge-response wallet auth end to end: issue, sign, verify, and
//! the one-shot guarantee that a spent challenge cannot be replayed
//! (§4.3).

use crabs_moltem::auth::Auth;
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

fn address_from_key(key: &SigningKey) -> crabs_moltem::wallet::Wallet {
    let uncompressed = key.verifying_key().to_encoded_point(false);
    let bytes = uncompressed.as_bytes();
    let mut hasher = Keccak256::new();
    hasher.update(&bytes[1..]);
    let hash = hasher.finalize();
    crabs_moltem::wallet::Wallet::new(format!("0x{}", hex::encode(&hash[12..])))
}

fn sign(key: &SigningKey, message: &str) -> String {
    let digest = eip191_hash(message);
    let (sig, recovery_id): (Signature, RecoveryId) = key.sign_prehash_recoverable(&digest).unwrap();
    let mut bytes = sig.to_bytes().to_vec();
    bytes.push(27 + recovery_id.to_byte());
    format!("0x{}", hex::encode(bytes))
}

#[test]
fn challenge_issue_sign_verify_round_trips_to_a_usable_token() {
    let auth = Auth::new(b"test-server-secret".to_vec());
    let key = SigningKey::random(&mut rand::rngs::OsRng);
    let wallet = address_from_key(&key);

    let challenge = auth.issue_challenge(&wallet);
    let signature = sign(&key, &challenge.message);

    let issued = auth
        .verify_challenge(&wallet, &signature, challenge.nonce, &challenge.message)
        .unwrap();

    let recovered = auth.verify_token(&issued.token).unwrap();
    assert_eq!(recovered, wallet);
}

#[test]
fn a_spent_challenge_cannot_be_replayed() {
    let auth = Auth::new(b"test-server-secret".to_vec());
    let key = SigningKey::random(&mut rand::rngs::OsRng);
    let wallet = address_from_key(&key);

    let challenge = auth.issue_challenge(&wallet);
    let signature = sign(&key, &challenge.message);

    auth.verify_challenge(&wallet, &signature, challenge.nonce, &challenge.message)
        .unwrap();

    let replay = auth.verify_challenge(&wallet, &signature, challenge.nonce, &challenge.message);
    assert!(replay.is_err());
}

#[test]
fn signature_from_a_different_key_is_rejected() {
    let auth = Auth::new(b"test-server-secret".to_vec());
    let key = SigningKey::random(&mut rand::rngs::OsRng);
    let impostor = SigningKey::random(&mut rand::rngs::OsRng);
    let wallet = address_from_key(&key);

    let challenge = auth.issue_challenge(&wallet);
    let forged_signature = sign(&impostor, &challenge.message);

    let err = auth
        .verify_challenge(&wallet, &forged_signature, challenge.nonce, &challenge.message)
        .unwrap_err();
    assert!(matches!(err, crabs_moltem::auth::AuthError::Mismatch | crabs_moltem::auth::AuthError::BadSignature));
}
