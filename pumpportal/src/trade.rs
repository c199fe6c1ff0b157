use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClaimError, Result};

/// Action tag that asks PumpPortal for a creator fee collection transaction.
pub const COLLECT_CREATOR_FEE: &str = "collectCreatorFee";

/// Fields that may carry the base64 transaction in a JSON reply, in lookup order.
const TRANSACTION_FIELDS: [&str; 4] = ["transaction", "tx", "base64", "swapTransaction"];

/// Client for PumpPortal's local transaction API.
///
/// The service builds an unsigned transaction; signing and submission stay local.
#[derive(Debug, Clone)]
pub struct TradeLocalClient {
    client: Client,
    url: String,
}

impl TradeLocalClient {
    pub fn new(url: &str) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    /// Request the serialized, unsigned `collectCreatorFee` transaction.
    ///
    /// The body is normally the raw transaction bytes. A reply with an
    /// `application/json` content type is read as an object holding the
    /// transaction in base64 instead.
    ///
    /// Anything but `200 OK` is returned as [`ClaimError::Portal`] with the body text.
    pub async fn collect_creator_fee(
        &self,
        public_key: &str,
        priority_fee: Decimal,
    ) -> Result<Vec<u8>> {
        let priority_fee = priority_fee.normalize().to_string();
        let form = [
            ("publicKey", public_key),
            ("action", COLLECT_CREATOR_FEE),
            ("priorityFee", priority_fee.as_str()),
        ];
        debug!(url = %self.url, priority_fee = %priority_fee, "requesting claim transaction");

        let resp = self.client.post(&self.url).form(&form).send().await?;

        if resp.status() != StatusCode::OK {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClaimError::Portal { status, body });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let body = resp.bytes().await?;
        if is_json {
            transaction_from_json(&body)
        } else {
            Ok(body.to_vec())
        }
    }
}

fn transaction_from_json(body: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ClaimError::InvalidResponse(format!("invalid JSON: {e}")))?;

    let encoded = TRANSACTION_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .ok_or_else(|| ClaimError::InvalidResponse(format!("missing transaction in {value}")))?;

    STANDARD
        .decode(encoded)
        .map_err(|e| ClaimError::InvalidResponse(format!("transaction is not base64: {e}")))
}
