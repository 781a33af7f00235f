use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::types::{Balance, PoolError, Result};

/// Trading fees are expressed in thousandths of the input amount.
pub const FEE_DENOMINATOR: u64 = 1000;

/// Floor of `a * b / denominator`, computed in 128 bits.
pub fn mul_div(a: Balance, b: Balance, denominator: Balance) -> Result<Balance> {
    if denominator == 0 {
        return Err(PoolError::ZeroLiquidity);
    }
    let quotient = (a as u128 * b as u128) / denominator as u128;
    Balance::try_from(quotient).map_err(|_| PoolError::ArithmeticOverflow("mul_div"))
}

pub fn constant_product(reserve_a: Balance, reserve_b: Balance) -> u128 {
    reserve_a as u128 * reserve_b as u128
}

/// Input amount left to price the trade after the fee is taken
pub fn apply_fee(amount_in: Balance, fee_per_mille: u64) -> Result<Balance> {
    let kept = FEE_DENOMINATOR
        .checked_sub(fee_per_mille)
        .ok_or(PoolError::ArithmeticOverflow("apply_fee"))?;
    mul_div(amount_in, kept, FEE_DENOMINATOR)
}

/// Calculate constant product AMM output amount.
///
/// The new output reserve is `k / (reserve_in + amount_in_after_fee)`, floored.
/// A trade that would empty the output reserve is trimmed by one unit so both
/// sides of the pool stay strictly positive.
pub fn calculate_amm_output(
    amount_in: Balance,
    reserve_in: Balance,
    reserve_out: Balance,
    invariant_k: u128,
    fee_per_mille: u64,
) -> Result<Balance> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(PoolError::ZeroLiquidity);
    }

    let effective_in = apply_fee(amount_in, fee_per_mille)?;
    let new_reserve_in = reserve_in as u128 + effective_in as u128;
    let new_reserve_out = Balance::try_from(invariant_k / new_reserve_in)
        .map_err(|_| PoolError::ArithmeticOverflow("swap output"))?;

    let output = reserve_out
        .checked_sub(new_reserve_out)
        .ok_or(PoolError::ArithmeticOverflow("swap output"))?;

    if output == reserve_out {
        return Ok(output - 1);
    }
    Ok(output)
}

/// Calculate the input needed to receive exactly `amount_out`.
///
/// Inverse of [`calculate_amm_output`]; the fee gross-up rounds up.
pub fn calculate_amm_input(
    amount_out: Balance,
    reserve_in: Balance,
    reserve_out: Balance,
    invariant_k: u128,
    fee_per_mille: u64,
) -> Result<Balance> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(PoolError::ZeroLiquidity);
    }
    if amount_out >= reserve_out {
        return Err(PoolError::InsufficientPoolBalance {
            requested: amount_out,
            reserve: reserve_out,
        });
    }

    let new_reserve_out = (reserve_out - amount_out) as u128;
    let new_reserve_in = invariant_k / new_reserve_out;
    let net_input = new_reserve_in
        .checked_sub(reserve_in as u128)
        .ok_or(PoolError::ArithmeticOverflow("swap input"))?;

    let kept = FEE_DENOMINATOR
        .checked_sub(fee_per_mille)
        .filter(|kept| *kept > 0)
        .ok_or(PoolError::ArithmeticOverflow("swap input"))? as u128;
    let gross_input = (net_input * FEE_DENOMINATOR as u128).div_ceil(kept);

    Balance::try_from(gross_input).map_err(|_| PoolError::ArithmeticOverflow("swap input"))
}

/// Units of output per unit of input at the current reserves
pub fn calculate_spot_price(reserve_in: Balance, reserve_out: Balance) -> Decimal {
    if reserve_in == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(reserve_out) / Decimal::from(reserve_in)
}

/// Calculate price impact for a trade, as a percentage of the spot price
pub fn calculate_price_impact(
    amount_in: Balance,
    amount_out: Balance,
    reserve_in: Balance,
    reserve_out: Balance,
) -> Decimal {
    let spot = calculate_spot_price(reserve_in, reserve_out);
    if spot.is_zero() || amount_in == 0 {
        return Decimal::ZERO;
    }
    let execution = Decimal::from(amount_out) / Decimal::from(amount_in);
    ((spot - execution) / spot) * Decimal::ONE_HUNDRED
}

/// Apply slippage tolerance to get minimum output
pub fn apply_slippage_tolerance(expected_output: Balance, slippage_tolerance_percent: Decimal) -> Balance {
    let tolerance = slippage_tolerance_percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let kept = (Decimal::ONE_HUNDRED - tolerance) / Decimal::ONE_HUNDRED;
    (Decimal::from(expected_output) * kept)
        .floor()
        .to_u64()
        .unwrap_or(0)
}
