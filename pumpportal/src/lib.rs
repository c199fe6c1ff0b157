pub mod claim;
pub mod config;
pub mod error;
pub mod rpc;
pub mod signing;
pub mod trade;
pub mod types;
pub mod utils;

// ---- Top-level re-exports for ergonomic usage ----

pub use claim::{BalanceStage, ClaimProgress, FeeClaimer, NoProgress};
pub use config::{ClaimConfig, ConfirmationStrategy, SecretKey};
pub use error::{ClaimError, ConfigError, Result};
pub use rpc::{RpcHttpClient, SignatureStatus};
pub use trade::TradeLocalClient;
pub use types::{BalanceReading, ClaimDelta, ClaimReceipt, ClaimResult, JSON_RESULT_PREFIX};
