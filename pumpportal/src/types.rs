use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::{lamports_to_sol, lamports_to_sol_decimal};

/// Marker that starts the single machine-readable line of a run.
pub const JSON_RESULT_PREFIX: &str = "JSON_RESULT:";

/// A wallet balance observed at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReading {
    pub address: String,
    pub lamports: u64,
    pub observed_at: DateTime<Utc>,
}

impl BalanceReading {
    pub fn new(address: impl Into<String>, lamports: u64) -> Self {
        Self {
            address: address.into(),
            lamports,
            observed_at: Utc::now(),
        }
    }

    /// Balance in SOL.
    pub fn sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }

    /// Balance in SOL, exact to the lamport.
    pub fn sol_decimal(&self) -> Decimal {
        lamports_to_sol_decimal(self.lamports)
    }
}

/// Balance change across a claim.
///
/// A negative raw change means the transaction fee outweighed whatever was
/// claimed; it is reported as a fee, never as a negative claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimDelta {
    /// `after - before` in lamports.
    pub raw_lamports: i128,
    /// `max(0, raw)`.
    pub claimed_lamports: u64,
    /// `max(0, -raw)`.
    pub fee_lamports: u64,
}

impl ClaimDelta {
    pub fn between(before: u64, after: u64) -> Self {
        let raw = i128::from(after) - i128::from(before);
        Self {
            raw_lamports: raw,
            claimed_lamports: after.saturating_sub(before),
            fee_lamports: before.saturating_sub(after),
        }
    }

    pub fn claimed_sol(&self) -> f64 {
        lamports_to_sol(self.claimed_lamports)
    }

    pub fn claimed_sol_decimal(&self) -> Decimal {
        lamports_to_sol_decimal(self.claimed_lamports)
    }

    pub fn fee_sol_decimal(&self) -> Decimal {
        lamports_to_sol_decimal(self.fee_lamports)
    }
}

/// Everything known about a submitted claim.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimReceipt {
    pub signature: String,
    pub before: BalanceReading,
    pub after: BalanceReading,
    pub delta: ClaimDelta,
}

impl ClaimReceipt {
    pub fn new(signature: String, before: BalanceReading, after: BalanceReading) -> Self {
        let delta = ClaimDelta::between(before.lamports, after.lamports);
        Self {
            signature,
            before,
            after,
            delta,
        }
    }
}

/// Outcome of one claim run.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimResult {
    Claimed(ClaimReceipt),
    Failed { error: String },
}

impl ClaimResult {
    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            Self::Claimed(receipt) => Some(receipt.signature.as_str()),
            Self::Failed { .. } => None,
        }
    }

    /// The payload handed to the calling process.
    pub fn payload(&self) -> JsonResult<'_> {
        match self {
            Self::Claimed(r) => JsonResult {
                success: true,
                signature: Some(r.signature.as_str()),
                balance_before: Some(r.before.sol()),
                balance_after: Some(r.after.sol()),
                claimed_sol: Some(r.delta.claimed_sol()),
                claimed_lamports: Some(r.delta.claimed_lamports),
                error: None,
            },
            Self::Failed { error } => JsonResult {
                success: false,
                signature: None,
                balance_before: None,
                balance_after: None,
                claimed_sol: None,
                claimed_lamports: None,
                error: Some(error.as_str()),
            },
        }
    }

    /// `JSON_RESULT:{...}` without a trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        Ok(format!(
            "{JSON_RESULT_PREFIX}{}",
            serde_json::to_string(&self.payload())?
        ))
    }
}

/// Wire shape of the `JSON_RESULT:` line.
#[derive(Debug, Serialize)]
pub struct JsonResult<'a> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_before: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_sol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_lamports: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}
