//! Fixed-point conversions between the protocol's three numeric units:
//! SOL (display unit), lamports (1e-9 SOL, the integer unit fees are
//! carried in), and micro-lamports (1e-6 lamport, priority-fee prices).
//!
//! Amounts stay in integer lamports internally; SOL only appears as a
//! 9-decimal string at the display edge, so no floating point is ever
//! involved.

use crate::error::SolError;

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
const MICRO_PER_LAMPORT: u128 = 1_000_000;

/// Format a lamport amount as a SOL string with 9 decimal places.
pub fn lamports_to_sol(lamports: u64) -> String {
    format!(
        "{}.{:09}",
        lamports / LAMPORTS_PER_SOL,
        lamports % LAMPORTS_PER_SOL
    )
}

/// Parse a SOL amount (integer or decimal text, at most 9 fractional
/// digits) into lamports.
pub fn sol_to_lamports(sol: &str) -> Result<u64, SolError> {
    let invalid = || SolError::Decode(format!("invalid SOL amount: {sol}"));

    let (whole, fraction) = match sol.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (sol, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut frac_lamports = 0u64;
    if !fraction.is_empty() {
        let digits: u64 = fraction.parse().map_err(|_| invalid())?;
        frac_lamports = digits * 10u64.pow(9 - fraction.len() as u32);
    }

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(frac_lamports))
        .ok_or_else(invalid)
}

/// Rescale micro-lamports to whole lamports, rounding up.
pub fn micro_to_lamports(micro_lamports: u128) -> u64 {
    micro_lamports.div_ceil(MICRO_PER_LAMPORT) as u64
}

pub fn lamports_to_micro(lamports: u64) -> u128 {
    lamports as u128 * MICRO_PER_LAMPORT
}
