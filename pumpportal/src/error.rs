use solana_sdk::signer::SignerError;
use thiserror::Error;

/// Problems with the claimer's environment or key material.
///
/// Raised before any network call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("invalid RPC endpoint {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("secret key belongs to {derived}, not {expected}")]
    KeyMismatch { expected: String, derived: String },
}

#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("PumpPortal error {status}: {body}")]
    Portal { status: u16, body: String },

    #[error("invalid PumpPortal response: {0}")]
    InvalidResponse(String),

    #[error("transaction error: {0}")]
    Rpc(String),

    #[error("no transaction signature received")]
    MissingSignature,

    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("transaction decode error: {0}")]
    Decode(#[from] bincode::Error),

    #[error("signing error: {0}")]
    Signing(#[from] SignerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClaimError>;
