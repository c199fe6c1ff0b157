use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

use crate::error::ConfigError;
use crate::signing::keypair_from_base58;
use crate::utils::mask;

pub const ENV_PUBLIC_KEY: &str = "CLAIMER_PUBLIC_KEY";
pub const ENV_SECRET_KEY: &str = "CLAIMER_SECRET_KEY_BASE58";
pub const ENV_RPC_ENDPOINT: &str = "SOLANA_RPC_ENDPOINT";

pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_TRADE_LOCAL_URL: &str = "https://pumpportal.fun/api/trade-local";
pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(15);

/// Priority fee bid sent with the claim, in SOL.
pub fn default_priority_fee() -> Decimal {
    Decimal::new(1, 6)
}

/// A base58 private key. `Debug` and `Display` only ever show a masked form.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw base58 string. Only the signer should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", mask(&self.0, 4))
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask(&self.0, 4))
    }
}

/// How the claimer waits between submitting and reading the balance again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStrategy {
    /// Sleep for a fixed time. Nothing checks that the transaction landed.
    FixedDelay(Duration),
    /// Poll `getSignatureStatuses` until confirmed, giving up after `timeout`.
    Poll { interval: Duration, timeout: Duration },
}

impl Default for ConfirmationStrategy {
    fn default() -> Self {
        Self::FixedDelay(DEFAULT_CONFIRMATION_DELAY)
    }
}

/// Everything a single claim run needs.
#[derive(Debug, Clone)]
pub struct ClaimConfig {
    /// Creator wallet whose fees are claimed.
    pub public_key: Pubkey,
    /// Private key of the creator wallet.
    pub secret_key: SecretKey,
    /// Solana JSON-RPC URL.
    pub rpc_endpoint: String,
    /// PumpPortal transaction-construction endpoint.
    pub trade_local_url: String,
    /// Priority fee in SOL.
    pub priority_fee: Decimal,
    pub confirmation: ConfirmationStrategy,
}

impl ClaimConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. The RPC endpoint falls back to
    /// [`DEFAULT_RPC_ENDPOINT`]; everything else not read from the lookup
    /// takes its default and can be overridden afterwards.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let public_key = var(ENV_PUBLIC_KEY).ok_or(ConfigError::MissingVar(ENV_PUBLIC_KEY))?;
        let secret_key = var(ENV_SECRET_KEY).ok_or(ConfigError::MissingVar(ENV_SECRET_KEY))?;
        let rpc_endpoint =
            var(ENV_RPC_ENDPOINT).unwrap_or_else(|| DEFAULT_RPC_ENDPOINT.to_string());

        let public_key = Pubkey::from_str(&public_key)
            .map_err(|e| ConfigError::InvalidPublicKey(format!("{public_key}: {e}")))?;
        validate_url(&rpc_endpoint)?;

        let config = Self {
            public_key,
            secret_key: SecretKey::new(secret_key),
            rpc_endpoint,
            trade_local_url: DEFAULT_TRADE_LOCAL_URL.to_string(),
            priority_fee: default_priority_fee(),
            confirmation: ConfirmationStrategy::default(),
        };

        // Fail before any network call if the key cannot sign for the wallet.
        config.keypair()?;
        Ok(config)
    }

    /// Decode the secret and check it signs for `public_key`.
    pub fn keypair(&self) -> Result<Keypair, ConfigError> {
        let keypair = keypair_from_base58(self.secret_key.expose())?;
        if keypair.pubkey() != self.public_key {
            return Err(ConfigError::KeyMismatch {
                expected: self.public_key.to_string(),
                derived: keypair.pubkey().to_string(),
            });
        }
        Ok(keypair)
    }
}

fn validate_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
