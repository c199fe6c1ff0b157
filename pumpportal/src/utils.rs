use rust_decimal::Decimal;
use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Decimal places of one SOL expressed in lamports.
pub const SOL_DECIMALS: u32 = 9;

/// Convert lamports to SOL as a float, for the JSON handoff payload.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert lamports to an exact SOL decimal with nine places, for display.
pub fn lamports_to_sol_decimal(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), SOL_DECIMALS)
}

/// Shorten a secret or identifier to `prefix...suffix`.
///
/// Strings too short to hide anything are fully masked.
pub fn mask(value: &str, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= keep * 2 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}
