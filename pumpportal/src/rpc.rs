use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::transaction::VersionedTransaction;
use tracing::{debug, warn};

use crate::error::{ClaimError, Result};
use crate::signing::encode_transaction;
use crate::types::BalanceReading;

/// Commitment the RPC node simulates against before relaying.
pub const PREFLIGHT_COMMITMENT: &str = "confirmed";

/// Raw JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ContextValue<T> {
    value: T,
}

/// One entry of a `getSignatureStatuses` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    /// True once the cluster reports `confirmed` or `finalized`.
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.confirmation_status.as_deref(),
            Some("confirmed") | Some("finalized")
        )
    }
}

/// Minimal Solana JSON-RPC client over HTTP.
#[derive(Debug)]
pub struct RpcHttpClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcHttpClient {
    pub fn new(url: &str) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// POST a JSON-RPC request and return the decoded envelope.
    ///
    /// The HTTP status is not checked; nodes report failures in the body.
    pub async fn call(&self, method: &str, params: Value) -> Result<RpcResponse> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let resp = self.client.post(&self.url).json(&body).send().await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `getBalance` for `address`.
    ///
    /// A response without `result` reads as a zero balance rather than an error.
    pub async fn get_balance(&self, address: &str) -> Result<BalanceReading> {
        let resp = self.call("getBalance", json!([address])).await?;
        let lamports = match resp.result {
            Some(result) => decode::<ContextValue<u64>>(result)?.value,
            None => {
                warn!(address, error = ?resp.error, "getBalance returned no result, assuming 0");
                0
            }
        };
        Ok(BalanceReading::new(address, lamports))
    }

    /// `sendTransaction` with base64 encoding and confirmed preflight.
    ///
    /// Returns the transaction signature reported by the node.
    pub async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<String> {
        let encoded = encode_transaction(tx)?;
        let params = json!([
            encoded,
            {
                "encoding": "base64",
                "skipPreflight": false,
                "preflightCommitment": PREFLIGHT_COMMITMENT,
            }
        ]);
        let resp = self.call("sendTransaction", params).await?;

        if let Some(error) = resp.error {
            return Err(ClaimError::Rpc(describe_rpc_error(&error)));
        }

        match resp.result {
            Some(Value::String(sig)) if !sig.is_empty() => Ok(sig),
            _ => Err(ClaimError::MissingSignature),
        }
    }

    /// `getSignatureStatuses` for one signature. `None` if the node has not seen it.
    pub async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>> {
        let params = json!([[signature], { "searchTransactionHistory": false }]);
        let resp = self.call("getSignatureStatuses", params).await?;

        if let Some(error) = resp.error {
            return Err(ClaimError::Rpc(describe_rpc_error(&error)));
        }

        let Some(result) = resp.result else {
            return Ok(None);
        };
        let statuses: ContextValue<Vec<Option<SignatureStatus>>> = decode(result)?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(ClaimError::Json)
}

/// Render a JSON-RPC error object as `message (code N)`, falling back to raw JSON.
pub fn describe_rpc_error(error: &Value) -> String {
    let message = error.get("message").and_then(Value::as_str);
    let code = error.get("code").and_then(Value::as_i64);
    match (message, code) {
        (Some(m), Some(c)) => format!("{m} (code {c})"),
        (Some(m), None) => m.to_string(),
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_rpc_error_with_code() {
        let err = json!({"code": -32002, "message": "Transaction simulation failed"});
        assert_eq!(
            describe_rpc_error(&err),
            "Transaction simulation failed (code -32002)"
        );
    }

    #[test]
    fn test_describe_rpc_error_without_message() {
        let err = json!("blockhash not found");
        assert_eq!(describe_rpc_error(&err), "\"blockhash not found\"");
    }

    #[test]
    fn test_signature_status_confirmation_levels() {
        let status: SignatureStatus = serde_json::from_value(json!({
            "slot": 10,
            "confirmations": null,
            "err": null,
            "confirmationStatus": "finalized"
        }))
        .unwrap();
        assert!(status.is_confirmed());
        assert!(status.err.is_none());

        let processed: SignatureStatus = serde_json::from_value(json!({
            "slot": 10,
            "confirmations": 0,
            "err": null,
            "confirmationStatus": "processed"
        }))
        .unwrap();
        assert!(!processed.is_confirmed());
    }

    #[test]
    fn test_response_envelope_missing_fields() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(resp.result.is_none());
        assert!(resp.error.is_none());
    }
}
