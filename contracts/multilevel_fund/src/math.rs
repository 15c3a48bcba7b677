//! Scale-tagged fixed-point arithmetic.
//!
//! ```text
//!   Base      18 decimals   1 token = 10^18
//!   Quote      6 decimals   1 token = 10^6
//!   UnitPrice 18 decimals   quote tokens per base token, scaled by 10^18
//!
//!   quote -> base:  base  = quote * 10^12 * 10^18 / price
//!   base  -> quote: quote = price * base / 10^18 / 10^12
//! ```
//!
//! Products are taken at 256-bit width so large deposits never overflow an
//! intermediate; only a result that does not fit in `u128` is rejected.

use crate::constants::{BASE_SCALE, PERCENT_DENOMINATOR, QUOTE_TO_BASE};
use crate::errors::{Error, Result};
use crate::Balance;

/// Amount of base asset, 18-decimal scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Base(pub Balance);

/// Amount of quote asset, 6-decimal scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quote(pub Balance);

/// Quote-per-base exchange rate, 18-decimal fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPrice(Balance);

impl UnitPrice {
    pub fn new(raw: Balance) -> Result<Self> {
        if raw == 0 {
            return Err(Error::InvalidPrice);
        }
        Ok(Self(raw))
    }

    pub fn raw(&self) -> Balance {
        self.0
    }
}

/// Base amount bought by `amount` of quote at `price`.
///
/// The quote amount is first lifted to the 18-decimal scale, then divided by
/// the 18-decimal price with the numerator carried at `BASE_SCALE` precision.
pub fn quote_to_base(amount: Quote, price: UnitPrice) -> Result<Base> {
    let normalized = amount.0.checked_mul(QUOTE_TO_BASE).ok_or(Error::Overflow)?;
    mul_div(normalized, BASE_SCALE, price.0)
        .map(Base)
        .ok_or(Error::Overflow)
}

/// Quote notional of `amount` of base at `price`, truncated once at the
/// 6-decimal scale.
pub fn base_to_quote(amount: Base, price: UnitPrice) -> Result<Quote> {
    // price(1e18) * base(1e18) / 1e18 yields an 18-decimal quote; / 1e12 takes it to 6
    let denominator = BASE_SCALE.checked_mul(QUOTE_TO_BASE).ok_or(Error::Overflow)?;
    mul_div(price.0, amount.0, denominator)
        .map(Quote)
        .ok_or(Error::Overflow)
}

/// `amount * percent / 100`, truncating.
pub fn percent_of(amount: Quote, percent: u8) -> Result<Quote> {
    amount
        .0
        .checked_mul(percent as Balance)
        .map(|v| Quote(v / PERCENT_DENOMINATOR))
        .ok_or(Error::Overflow)
}

/// Split a deposit into `(insurance, payout)`.
///
/// The payout share is the remainder, so the two shares always add back up to
/// `amount` and truncation lands on the payout side.
pub fn split_deposit(amount: Quote, insurance_percent: u8) -> Result<(Quote, Quote)> {
    let insurance = percent_of(amount, insurance_percent)?;
    let payout = amount.0.checked_sub(insurance.0).ok_or(Error::Overflow)?;
    Ok((insurance, Quote(payout)))
}

/// `a * b / denominator` with a 256-bit intermediate product.
///
/// Returns `None` for a zero denominator or a quotient wider than 128 bits.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denominator);
    }

    let (hi, lo) = widening_mul(a, b);
    if hi >= denominator {
        return None;
    }

    // Restoring long division of (hi, lo) by denominator; remainder < denominator throughout
    let mut remainder = hi;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= denominator {
            remainder = remainder.wrapping_sub(denominator);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// Full 128x128 -> 256 bit product as `(high, low)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;

    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (ll & MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}
