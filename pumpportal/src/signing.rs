use base64::Engine;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::transaction::VersionedTransaction;

use crate::error::{ConfigError, Result};

/// Parse a private key from a bs58 string.
///
/// Accepts either a 64-byte keypair (wallet export format) or a 32-byte secret.
pub fn keypair_from_base58(key: &str) -> std::result::Result<Keypair, ConfigError> {
    let bytes = bs58::decode(key.trim())
        .into_vec()
        .map_err(|e| ConfigError::InvalidSecretKey(format!("bs58 decode error: {e}")))?;

    match bytes.len() {
        64 => Keypair::try_from(bytes.as_slice())
            .map_err(|e| ConfigError::InvalidSecretKey(format!("invalid keypair: {e}"))),
        32 => keypair_from_seed(&bytes)
            .map_err(|e| ConfigError::InvalidSecretKey(format!("invalid secret: {e}"))),
        n => Err(ConfigError::InvalidSecretKey(format!(
            "unexpected key length: {n}"
        ))),
    }
}

/// Decode an unsigned transaction and sign its message with `keypair`.
///
/// Whatever signatures the transaction arrived with are discarded.
pub fn sign_transaction(unsigned: &[u8], keypair: &Keypair) -> Result<VersionedTransaction> {
    let tx: VersionedTransaction = bincode::deserialize(unsigned)?;
    let signed = VersionedTransaction::try_new(tx.message, &[keypair])?;
    Ok(signed)
}

/// Serialize a transaction to the base64 wire form `sendTransaction` expects.
pub fn encode_transaction(tx: &VersionedTransaction) -> Result<String> {
    let bytes = bincode::serialize(tx)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
