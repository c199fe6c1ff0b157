//! The claim run: balance, fetch, sign, submit, wait, balance.

use reqwest::Client;
use solana_sdk::signature::Keypair;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::config::{ClaimConfig, ConfirmationStrategy};
use crate::error::{ClaimError, Result};
use crate::rpc::RpcHttpClient;
use crate::signing::sign_transaction;
use crate::trade::TradeLocalClient;
use crate::types::{BalanceReading, ClaimReceipt, ClaimResult};

/// Which side of the claim a balance read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStage {
    Before,
    After,
}

/// Observer for the steps of a claim run.
///
/// Every hook defaults to doing nothing.
pub trait ClaimProgress {
    fn started(&mut self, _wallet: &str) {}
    fn checking_balance(&mut self, _stage: BalanceStage) {}
    fn balance(&mut self, _stage: BalanceStage, _reading: &BalanceReading) {}
    fn requesting_transaction(&mut self) {}
    fn submitted(&mut self, _signature: &str) {}
    fn awaiting_confirmation(&mut self, _strategy: &ConfirmationStrategy) {}
    fn failed(&mut self, _error: &ClaimError) {}
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ClaimProgress for NoProgress {}

/// Claims creator fees for one wallet.
pub struct FeeClaimer {
    config: ClaimConfig,
    keypair: Keypair,
    rpc: RpcHttpClient,
    portal: TradeLocalClient,
}

impl FeeClaimer {
    /// Decode the key and prepare both HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::Config`] if the secret key is unusable or does
    /// not belong to the configured wallet.
    pub fn new(config: ClaimConfig) -> Result<Self> {
        let keypair = config.keypair()?;
        let http = Client::new();
        let rpc = RpcHttpClient::with_client(http.clone(), &config.rpc_endpoint);
        let portal = TradeLocalClient::with_client(http, &config.trade_local_url);
        Ok(Self {
            config,
            keypair,
            rpc,
            portal,
        })
    }

    /// Run one claim. Never fails: errors come back as [`ClaimResult::Failed`].
    pub async fn run<P>(&self, progress: &mut P) -> ClaimResult
    where
        P: ClaimProgress + ?Sized,
    {
        match self.claim(progress).await {
            Ok(receipt) => {
                info!(
                    signature = %receipt.signature,
                    before = receipt.before.lamports,
                    after = receipt.after.lamports,
                    claimed = receipt.delta.claimed_lamports,
                    fee = receipt.delta.fee_lamports,
                    "claim complete"
                );
                ClaimResult::Claimed(receipt)
            }
            Err(e) => {
                error!(error = %e, details = ?e, "claim failed");
                progress.failed(&e);
                ClaimResult::failed(&e)
            }
        }
    }

    async fn claim<P>(&self, progress: &mut P) -> Result<ClaimReceipt>
    where
        P: ClaimProgress + ?Sized,
    {
        let wallet = self.config.public_key.to_string();
        progress.started(&wallet);

        progress.checking_balance(BalanceStage::Before);
        let before = self.rpc.get_balance(&wallet).await?;
        info!(lamports = before.lamports, "balance before claim");
        progress.balance(BalanceStage::Before, &before);

        progress.requesting_transaction();
        let unsigned = self
            .portal
            .collect_creator_fee(&wallet, self.config.priority_fee)
            .await?;
        info!(bytes = unsigned.len(), "received claim transaction");

        let tx = sign_transaction(&unsigned, &self.keypair)?;
        let signature = self.rpc.send_transaction(&tx).await?;
        info!(signature = %signature, "transaction submitted");
        progress.submitted(&signature);

        progress.awaiting_confirmation(&self.config.confirmation);
        self.await_confirmation(&signature).await?;

        progress.checking_balance(BalanceStage::After);
        let after = self.rpc.get_balance(&wallet).await?;
        info!(lamports = after.lamports, "balance after claim");
        progress.balance(BalanceStage::After, &after);

        Ok(ClaimReceipt::new(signature, before, after))
    }

    async fn await_confirmation(&self, signature: &str) -> Result<()> {
        match self.config.confirmation {
            ConfirmationStrategy::FixedDelay(delay) => {
                sleep(delay).await;
                Ok(())
            }
            ConfirmationStrategy::Poll { interval, timeout } => {
                let deadline = Instant::now() + timeout;
                loop {
                    if let Some(status) = self.rpc.get_signature_status(signature).await? {
                        if let Some(err) = status.err {
                            return Err(ClaimError::TransactionFailed {
                                signature: signature.to_string(),
                                reason: err.to_string(),
                            });
                        }
                        if status.is_confirmed() {
                            info!(slot = status.slot, "transaction confirmed");
                            return Ok(());
                        }
                    }
                    if Instant::now() >= deadline {
                        warn!(
                            signature,
                            timeout_ms = timeout.as_millis() as u64,
                            "no confirmation before timeout, reading balance anyway"
                        );
                        return Ok(());
                    }
                    sleep(interval).await;
                }
            }
        }
    }
}
