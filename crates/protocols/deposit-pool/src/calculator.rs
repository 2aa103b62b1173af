//! Deposit Calculator
//!
//! Pure math for the deposit flow. No async, no node.
//!
//! The minimum-output floor:
//!   min_out = quote - floor(quote * slippage_bps / 10_000)
//!
//! so `0 <= min_out <= quote` for every tolerance, and a tolerance of 0 bps
//! demands the full quote.

use alloy_primitives::U256;
use lrt_core::constants::BPS_DENOM;

use crate::constants::GAS_LIMIT_BUFFER_PCT;

/// Derive the minimum acceptable receipt-token output from a quote.
///
/// `slippage_bps` above 10_000 is treated as 10_000 (accept anything).
pub fn minimum_output(quote: U256, slippage_bps: u16) -> U256 {
    let bps = U256::from(slippage_bps.min(BPS_DENOM));
    let denom = U256::from(BPS_DENOM);

    // Split to avoid overflowing quote * bps near U256::MAX
    let shortfall = (quote / denom) * bps + (quote % denom) * bps / denom;
    quote - shortfall
}

/// Gas limit with [`GAS_LIMIT_BUFFER_PCT`] headroom over the estimate
pub fn gas_limit_with_buffer(estimate: u64) -> u64 {
    let buffered = estimate as u128 * (100 + GAS_LIMIT_BUFFER_PCT) as u128 / 100;
    u64::try_from(buffered).unwrap_or(u64::MAX)
}

/// Confirmations for a transaction included at `included`, the inclusion block counting as one.
///
/// Returns 0 when the node's head is behind the inclusion block (reorg or lagging node).
pub fn confirmations(head: u64, included: u64) -> u64 {
    if head < included {
        0
    } else {
        head - included + 1
    }
}

/// How far the minted amount fell below the quote, in basis points.
///
/// 0 when the pool minted at least the quoted amount.
pub fn realized_slippage_bps(quote: U256, minted: U256) -> u64 {
    if quote.is_zero() || minted >= quote {
        return 0;
    }
    let diff = quote - minted;
    let bps = diff * U256::from(BPS_DENOM) / quote;
    bps.saturating_to()
}
