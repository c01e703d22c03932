use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no challenge pending for this wallet")]
    NoChallenge,
    #[error("nonce or message does not match the issued challenge")]
    Mismatch,
    #[error("challenge has expired")]
    Expired,
    #[error("signature verification failed")]
    BadSignature,
    #[error("token is malformed")]
    BadToken,
    #[error("token has expired")]
    TokenExpired,
}

#[derive(Debug, Error)]
#[error("rate limit exceeded, retry after {retry_after_secs}s")]
pub struct RateLimitError {
    pub retry_after_secs: u64,
}
