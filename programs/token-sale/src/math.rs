//! Checked fixed-point helpers.
//!
//! Token amounts with 18 decimals multiplied by 18-decimal prices overflow `u128`
//! long before the quotient does, so `mul_div_floor` splits the dividend when the
//! direct product does not fit.

use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, USD_DECIMALS};
use crate::errors::SaleError;

pub fn pow10(exp: u32) -> Result<u128> {
    10u128.checked_pow(exp).ok_or(error!(SaleError::MathOverflow))
}

/// `floor(a * b / c)` without requiring `a * b` to fit in a `u128`.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Result<u128> {
    require!(c > 0, SaleError::MathOverflow);

    if let Some(product) = a.checked_mul(b) {
        return Ok(product / c);
    }

    // a * b / c = (a / c) * b + (a % c) * b / c, exact under floor division.
    split_mul_div(a, b, c)
        .or_else(|| split_mul_div(b, a, c))
        .ok_or(error!(SaleError::MathOverflow))
}

fn split_mul_div(a: u128, b: u128, c: u128) -> Option<u128> {
    let whole = (a / c).checked_mul(b)?;
    let part = (a % c).checked_mul(b)? / c;
    whole.checked_add(part)
}

/// Re-expresses `amount` from `from` decimals to `to` decimals, truncating.
pub fn rescale(amount: u128, from: u32, to: u32) -> Result<u128> {
    if from == to {
        Ok(amount)
    } else if from < to {
        amount
            .checked_mul(pow10(to - from)?)
            .ok_or(error!(SaleError::MathOverflow))
    } else {
        Ok(amount / pow10(from - to)?)
    }
}

/// Converts a quote with `decimals` fractional digits into 18-decimal USD.
pub fn to_usd_fixed(price: u128, decimals: u32) -> Result<u128> {
    rescale(price, decimals, USD_DECIMALS)
}

pub fn bps_of(amount: u128, bps: u16) -> Result<u128> {
    mul_div_floor(amount, bps as u128, BPS_DENOMINATOR)
}

pub fn to_token_amount(amount: u128) -> Result<u64> {
    u64::try_from(amount).map_err(|_| error!(SaleError::MathOverflow))
}
