use std::io::Write;

use chrono::Local;
use pumpportal::utils::mask;
use pumpportal::{
    BalanceReading, BalanceStage, ClaimError, ClaimProgress, ClaimResult, ConfigError,
    ConfirmationStrategy, JSON_RESULT_PREFIX,
};
use tracing::warn;

use crate::error::ReportError;

const WIDTH: usize = 60;

/// Human-readable console output plus the final `JSON_RESULT:` line.
///
/// Only [`Reporter::emit_result`] writes a line starting with the marker;
/// any other text that would is indented.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        for line in text.split(['\r', '\n']) {
            let res = if line.starts_with(JSON_RESULT_PREFIX) {
                writeln!(self.out, "  {line}")
            } else {
                writeln!(self.out, "{line}")
            };
            if let Err(e) = res {
                warn!(error = %e, "failed to write progress line");
                return;
            }
        }
    }

    fn rule(&mut self, ch: char) {
        let rule = ch.to_string().repeat(WIDTH);
        self.line(&rule);
    }

    /// Missing or invalid environment; no claim is attempted.
    pub fn config_error(&mut self, err: &ConfigError) {
        match err {
            ConfigError::MissingVar(_) => self.line(&format!(
                "ERROR: {err}. Set CLAIMER_PUBLIC_KEY and CLAIMER_SECRET_KEY_BASE58 in the environment or a .env file."
            )),
            _ => self.line(&format!("ERROR: {err}")),
        }
    }

    /// Closing block for a successful claim. Failures were already printed.
    pub fn summary(&mut self, result: &ClaimResult) {
        let ClaimResult::Claimed(receipt) = result else {
            return;
        };

        self.line("");
        self.rule('=');
        self.line("CLAIM RESULT");
        self.rule('=');
        self.line(&format!(
            "Balance before claim: {} SOL",
            receipt.before.sol_decimal()
        ));
        self.line(&format!(
            "Balance after claim:  {} SOL",
            receipt.after.sol_decimal()
        ));
        self.rule('-');

        let delta = &receipt.delta;
        if delta.claimed_lamports > 0 {
            self.line(&format!(
                "\nAmount claimed: {} SOL",
                delta.claimed_sol_decimal()
            ));
        } else {
            self.line("\nAmount claimed: 0 SOL");
            if delta.fee_lamports > 0 {
                self.line(&format!("(Transaction fee: {} SOL)", delta.fee_sol_decimal()));
            }
        }
        self.rule('=');
        self.line("");
    }

    /// Write the single machine-readable line and flush.
    pub fn emit_result(&mut self, result: &ClaimResult) -> Result<(), ReportError> {
        let line = result.to_json_line()?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> ClaimProgress for Reporter<W> {
    fn started(&mut self, wallet: &str) {
        self.line("");
        self.rule('=');
        self.line("PUMP.FUN CREATOR FEE CLAIMER");
        self.rule('=');
        self.line(&format!(
            "Time: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        self.line(&format!("Wallet: {}", mask(wallet, 8)));
    }

    fn checking_balance(&mut self, stage: BalanceStage) {
        match stage {
            BalanceStage::Before => self.line("\nChecking wallet balance before claim..."),
            BalanceStage::After => self.line("\nChecking wallet balance after claim..."),
        }
    }

    fn balance(&mut self, stage: BalanceStage, reading: &BalanceReading) {
        // The after balance is shown in the summary block.
        if stage == BalanceStage::Before {
            self.line(&format!(
                "Balance before claim: {} SOL",
                reading.sol_decimal()
            ));
        }
    }

    fn requesting_transaction(&mut self) {
        self.line("\nClaiming creator fees...");
    }

    fn submitted(&mut self, signature: &str) {
        self.line("\nSUCCESS! Transaction sent!");
        self.line(&format!("Signature: {signature}"));
        self.line(&format!("Solscan: https://solscan.io/tx/{signature}"));
    }

    fn awaiting_confirmation(&mut self, strategy: &ConfirmationStrategy) {
        match strategy {
            ConfirmationStrategy::FixedDelay(delay) => self.line(&format!(
                "\nWaiting for confirmation ({} seconds)...",
                delay.as_secs()
            )),
            ConfirmationStrategy::Poll { timeout, .. } => self.line(&format!(
                "\nPolling for confirmation (up to {} seconds)...",
                timeout.as_secs()
            )),
        }
    }

    fn failed(&mut self, error: &ClaimError) {
        match error {
            ClaimError::Portal { status, body } => {
                self.line(&format!("ERROR from PumpPortal: {status}"));
                self.line(body);
            }
            ClaimError::Rpc(message) => self.line(&format!("Transaction error: {message}")),
            ClaimError::MissingSignature => self.line("No transaction signature received"),
            other => self.line(&format!("\nERROR: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpportal::ClaimReceipt;
    use serde_json::Value;
    use std::time::Duration;

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn claimed(before: u64, after: u64) -> ClaimResult {
        ClaimResult::Claimed(ClaimReceipt::new(
            "sig123".into(),
            BalanceReading::new("wallet", before),
            BalanceReading::new("wallet", after),
        ))
    }

    fn result_lines(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|l| l.starts_with(JSON_RESULT_PREFIX))
            .collect()
    }

    #[test]
    fn test_full_success_run_emits_one_result_line() {
        let mut r = Reporter::new(Vec::new());
        r.started("7EcDhSYGxXyscszYEp35KHN8vvw3svAuLKTzXwCFLtV");
        r.checking_balance(BalanceStage::Before);
        r.balance(BalanceStage::Before, &BalanceReading::new("w", 1_000_000_000));
        r.requesting_transaction();
        r.submitted("sig123");
        r.awaiting_confirmation(&ConfirmationStrategy::FixedDelay(Duration::from_secs(15)));
        r.checking_balance(BalanceStage::After);
        let result = claimed(1_000_000_000, 1_050_000_000);
        r.summary(&result);
        r.emit_result(&result).unwrap();

        let text = output(r);
        assert!(text.contains("Wallet: 7EcDhSYG...zXwCFLtV"));
        assert!(text.contains("Balance before claim: 1.000000000 SOL"));
        assert!(text.contains("Balance after claim:  1.050000000 SOL"));
        assert!(text.contains("Amount claimed: 0.050000000 SOL"));
        assert!(text.contains("Solscan: https://solscan.io/tx/sig123"));
        assert!(text.contains("Waiting for confirmation (15 seconds)..."));

        let lines = result_lines(&text);
        assert_eq!(lines.len(), 1);
        assert_eq!(text.lines().last().unwrap(), lines[0]);
        let v: Value = serde_json::from_str(&lines[0][JSON_RESULT_PREFIX.len()..]).unwrap();
        assert!(v["success"].is_boolean());
        assert_eq!(v["claimed_lamports"], 50_000_000);
    }

    #[test]
    fn test_fee_only_summary_shows_fee() {
        let mut r = Reporter::new(Vec::new());
        r.summary(&claimed(2_000_100_000, 1_999_900_000));
        let text = output(r);
        assert!(text.contains("Amount claimed: 0 SOL"));
        assert!(text.contains("(Transaction fee: 0.000200000 SOL)"));
    }

    #[test]
    fn test_unchanged_balance_has_no_fee_line() {
        let mut r = Reporter::new(Vec::new());
        r.summary(&claimed(5, 5));
        let text = output(r);
        assert!(text.contains("Amount claimed: 0 SOL"));
        assert!(!text.contains("Transaction fee"));
    }

    #[test]
    fn test_portal_failure_output() {
        let mut r = Reporter::new(Vec::new());
        let err = ClaimError::Portal {
            status: 500,
            body: "upstream down".into(),
        };
        r.failed(&err);
        let result = ClaimResult::failed(&err);
        r.summary(&result);
        r.emit_result(&result).unwrap();

        let text = output(r);
        assert!(text.contains("ERROR from PumpPortal: 500"));
        assert!(text.contains("upstream down"));
        assert!(!text.contains("CLAIM RESULT"));
        let lines = result_lines(&text);
        assert_eq!(lines.len(), 1);
        let v: Value = serde_json::from_str(&lines[0][JSON_RESULT_PREFIX.len()..]).unwrap();
        assert_eq!(v["success"], false);
        assert!(v.get("signature").is_none());
    }

    #[test]
    fn test_progress_text_cannot_forge_marker() {
        let mut r = Reporter::new(Vec::new());
        r.failed(&ClaimError::Portal {
            status: 502,
            body: "oops\nJSON_RESULT:{\"success\":true}".into(),
        });
        r.emit_result(&ClaimResult::failed("boom")).unwrap();

        let text = output(r);
        let lines = result_lines(&text);
        assert_eq!(lines, vec![r#"JSON_RESULT:{"success":false,"error":"boom"}"#]);
        assert!(text.contains("  JSON_RESULT:{\"success\":true}"));
    }

    #[test]
    fn test_carriage_return_cannot_forge_marker() {
        let mut r = Reporter::new(Vec::new());
        r.failed(&ClaimError::Portal {
            status: 502,
            body: "oops\rJSON_RESULT:{\"success\":true}".into(),
        });
        r.emit_result(&ClaimResult::failed("boom")).unwrap();

        let text = output(r);
        let marked: Vec<&str> = text
            .split(['\r', '\n'])
            .filter(|l| l.starts_with(JSON_RESULT_PREFIX))
            .collect();
        assert_eq!(marked, vec![r#"JSON_RESULT:{"success":false,"error":"boom"}"#]);
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_missing_env_message() {
        let mut r = Reporter::new(Vec::new());
        r.config_error(&ConfigError::MissingVar("CLAIMER_PUBLIC_KEY"));
        let text = output(r);
        assert!(text.starts_with("ERROR: missing environment variable CLAIMER_PUBLIC_KEY."));
        assert!(text.contains("CLAIMER_SECRET_KEY_BASE58"));
    }

    #[test]
    fn test_poll_wait_message() {
        let mut r = Reporter::new(Vec::new());
        r.awaiting_confirmation(&ConfirmationStrategy::Poll {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(60),
        });
        assert!(output(r).contains("Polling for confirmation (up to 60 seconds)..."));
    }
}
