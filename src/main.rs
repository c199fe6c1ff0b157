mod cli;
mod error;
mod output;

use std::io::{self, Write};

use clap::Parser;
use pumpportal::{ClaimConfig, ClaimError, ClaimProgress, ClaimResult, ConfigError, FeeClaimer};
use tracing::{error, info};

use crate::output::Reporter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::Args::parse();

    // Initialize tracing; stdout belongs to the report.
    let filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    run(&args, |name| std::env::var(name).ok(), io::stdout()).await;
}

/// One claim from config to result line. Returns the writer for inspection.
async fn run<F, W>(args: &cli::Args, lookup: F, out: W) -> (ClaimResult, W)
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let mut reporter = Reporter::new(out);

    let result = match load_config(args, lookup) {
        Ok(config) => {
            info!(
                wallet = %config.public_key,
                rpc = %config.rpc_endpoint,
                priority_fee = %config.priority_fee,
                "claimer starting"
            );
            match FeeClaimer::new(config) {
                Ok(claimer) => claimer.run(&mut reporter).await,
                Err(e) => {
                    error!(error = %e, "claimer setup failed");
                    reporter.failed(&e);
                    ClaimResult::failed(&e)
                }
            }
        }
        Err(e) => {
            error!(error = %e, "configuration error, no claim attempted");
            reporter.config_error(&e);
            ClaimResult::failed(ClaimError::from(e))
        }
    };

    reporter.summary(&result);
    if let Err(e) = reporter.emit_result(&result) {
        error!(error = %e, "failed to write result line");
    }
    (result, reporter.into_inner())
}

fn load_config<F>(args: &cli::Args, lookup: F) -> Result<ClaimConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClaimConfig::from_lookup(lookup)?;
    args.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpportal::config::{ENV_PUBLIC_KEY, ENV_RPC_ENDPOINT, ENV_SECRET_KEY};
    use pumpportal::JSON_RESULT_PREFIX;
    use serde_json::{json, Value};
    use solana_sdk::signature::{Keypair, Signer};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn args(extra: &[&str]) -> cli::Args {
        let mut argv = vec!["claim-fees"];
        argv.extend_from_slice(extra);
        cli::Args::try_parse_from(argv).unwrap()
    }

    /// Every line that starts with the marker, plus the payload of the last line.
    fn result_lines(out: Vec<u8>) -> (Vec<String>, Value) {
        let text = String::from_utf8(out).unwrap();
        let marked: Vec<String> = text
            .split(['\r', '\n'])
            .filter(|l| l.starts_with(JSON_RESULT_PREFIX))
            .map(str::to_string)
            .collect();
        let last = text.lines().last().unwrap();
        let payload = serde_json::from_str(last.strip_prefix(JSON_RESULT_PREFIX).unwrap()).unwrap();
        (marked, payload)
    }

    #[tokio::test]
    async fn test_missing_env_emits_single_failure_line() {
        let (result, out) = run(&args(&[]), |_| None, Vec::new()).await;

        assert!(!result.is_success());
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.starts_with("ERROR: missing environment variable CLAIMER_PUBLIC_KEY."));

        let (marked, payload) = result_lines(out);
        assert_eq!(marked.len(), 1);
        assert_eq!(payload["success"], false);
        assert_eq!(
            payload["error"],
            "configuration error: missing environment variable CLAIMER_PUBLIC_KEY"
        );
    }

    #[tokio::test]
    async fn test_mismatched_key_makes_no_request() {
        let server = MockServer::start().await;
        let keypair = Keypair::new();
        let other = Keypair::new().pubkey().to_string();
        let secret = keypair.to_base58_string();
        let rpc = server.uri();
        let lookup = |name: &str| match name {
            ENV_PUBLIC_KEY => Some(other.clone()),
            ENV_SECRET_KEY => Some(secret.clone()),
            ENV_RPC_ENDPOINT => Some(rpc.clone()),
            _ => None,
        };

        let (result, out) = run(&args(&[]), lookup, Vec::new()).await;

        assert!(!result.is_success());
        let (marked, payload) = result_lines(out);
        assert_eq!(marked.len(), 1);
        assert!(payload["error"].as_str().unwrap().contains("secret key belongs to"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_run_ends_with_result_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "method": "getBalance" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": 1_000_000_000u64 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/trade-local"))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "upstream down\nJSON_RESULT:{\"success\":true}",
            ))
            .mount(&server)
            .await;

        let keypair = Keypair::new();
        let wallet = keypair.pubkey().to_string();
        let secret = keypair.to_base58_string();
        let rpc = server.uri();
        let lookup = |name: &str| match name {
            ENV_PUBLIC_KEY => Some(wallet.clone()),
            ENV_SECRET_KEY => Some(secret.clone()),
            ENV_RPC_ENDPOINT => Some(rpc.clone()),
            _ => None,
        };
        let portal = format!("{}/api/trade-local", server.uri());
        let cli = args(&["--trade-local-url", &portal, "--confirm-delay-secs", "0"]);

        let (result, out) = run(&cli, lookup, Vec::new()).await;

        assert!(!result.is_success());
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("PUMP.FUN CREATOR FEE CLAIMER"));
        assert!(text.contains("Balance before claim: 1.000000000 SOL"));
        assert!(text.contains("ERROR from PumpPortal: 500"));

        let (marked, payload) = result_lines(out);
        assert_eq!(marked.len(), 1);
        assert_eq!(payload["success"], false);
        assert!(payload.get("signature").is_none());
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("PumpPortal error 500"));
    }
}
