use std::time::Duration;

use clap::Parser;
use pumpportal::config::DEFAULT_TRADE_LOCAL_URL;
use pumpportal::{ClaimConfig, ConfirmationStrategy};
use rust_decimal::Decimal;

/// claim-fees — collect pump.fun creator fees for one wallet.
///
/// Wallet and RPC come from CLAIMER_PUBLIC_KEY, CLAIMER_SECRET_KEY_BASE58 and
/// SOLANA_RPC_ENDPOINT (environment or .env).
#[derive(Parser, Debug)]
#[command(name = "claim-fees", version)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Priority fee in SOL
    #[arg(long, default_value = "0.000001")]
    pub priority_fee: Decimal,

    /// PumpPortal transaction endpoint
    #[arg(long, default_value = DEFAULT_TRADE_LOCAL_URL)]
    pub trade_local_url: String,

    /// Seconds to wait after submitting before reading the balance again
    #[arg(long, default_value = "15")]
    pub confirm_delay_secs: u64,

    /// Poll the signature status instead of waiting a fixed delay
    #[arg(long)]
    pub poll_confirmation: bool,

    /// Interval between status polls (ms, at least 1)
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Give up polling after this many seconds and read the balance anyway
    #[arg(long, default_value = "60")]
    pub poll_timeout_secs: u64,
}

impl Args {
    pub fn confirmation(&self) -> ConfirmationStrategy {
        if self.poll_confirmation {
            ConfirmationStrategy::Poll {
                interval: Duration::from_millis(self.poll_interval_ms),
                timeout: Duration::from_secs(self.poll_timeout_secs),
            }
        } else {
            ConfirmationStrategy::FixedDelay(Duration::from_secs(self.confirm_delay_secs))
        }
    }

    /// Overlay run tunables onto a config loaded from the environment.
    pub fn apply(&self, config: &mut ClaimConfig) {
        config.priority_fee = self.priority_fee;
        config.trade_local_url = self.trade_local_url.clone();
        config.confirmation = self.confirmation();
    }
}
