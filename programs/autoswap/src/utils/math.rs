//! Pricing engine: stateless constant-product math.
//!
//! All quote intermediates run in 256-bit arithmetic so that
//! `amount * (10000 - fee) * reserve` can never overflow, and results are
//! narrowed back to u64 with an explicit error. `quote_out` floors in favor
//! of the pool; `quote_in` is the algebraic inverse rounded up one unit so
//! that `quote_out(quote_in(x)) >= x` holds for every input.

use anchor_lang::prelude::*;
use ethnum::U256;

use crate::constants::{BPS_DENOMINATOR, MAX_FEE_BPS, MIN_FEE_BPS, PRICE_SCALE};
use crate::error::ErrorCode;
use crate::utils::math_safe::SafeMath;

/// Newton iterations are bounded; convergence for a 128-bit radicand takes
/// far fewer steps than this.
const MAX_ISQRT_ITERATIONS: u32 = 256;

fn narrow_u256(value: U256) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(ErrorCode::NumericNarrowing.into());
    }
    Ok(value.as_u64())
}

fn check_fee(fee_bps: u16) -> Result<()> {
    require!(
        (MIN_FEE_BPS..=MAX_FEE_BPS).contains(&fee_bps),
        ErrorCode::InvalidFeeBps
    );
    Ok(())
}

/// Output amount for a fee-paying constant-product swap, floored in favor
/// of the pool:
/// `floor(amount_in * (10000 - fee) * reserve_out / (reserve_in * 10000 + amount_in * (10000 - fee)))`
pub fn quote_out(amount_in: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    require!(amount_in > 0, ErrorCode::ZeroAmount);
    require!(
        reserve_in > 0 && reserve_out > 0,
        ErrorCode::InsufficientLiquidity
    );
    check_fee(fee_bps)?;

    let amount_in_after_fee =
        U256::from(amount_in) * U256::from(BPS_DENOMINATOR - u64::from(fee_bps));
    let numerator = amount_in_after_fee * U256::from(reserve_out);
    let denominator = U256::from(reserve_in) * U256::from(BPS_DENOMINATOR) + amount_in_after_fee;
    narrow_u256(numerator / denominator)
}

/// Input amount required to receive `amount_out`, rounded up one unit.
pub fn quote_in(amount_out: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    require!(amount_out > 0, ErrorCode::ZeroAmount);
    require!(
        reserve_in > 0 && reserve_out > 0,
        ErrorCode::InsufficientLiquidity
    );
    require!(amount_out < reserve_out, ErrorCode::InsufficientLiquidity);
    check_fee(fee_bps)?;

    let numerator =
        U256::from(reserve_in) * U256::from(BPS_DENOMINATOR) * U256::from(amount_out);
    let denominator = U256::from(reserve_out - amount_out)
        * U256::from(BPS_DENOMINATOR - u64::from(fee_bps));
    if denominator == U256::ZERO {
        return Err(ErrorCode::DivisionByZero.into());
    }
    narrow_u256(numerator / denominator + U256::ONE)
}

/// Integer square root of `x * y` via bounded Newton iteration, computed in
/// 128-bit width so the product of two u64 deposits cannot overflow. Used
/// only for first-deposit LP minting.
pub fn isqrt(x: u64, y: u64) -> Result<u64> {
    let radicand = u128::from(x) * u128::from(y);
    if radicand == 0 {
        return Ok(0);
    }
    // The seed below equals the radicand for 2 and 3, which would stop the
    // iteration before it starts; their floor root is 1.
    if radicand < 4 {
        return Ok(1);
    }

    let mut result = radicand;
    let mut guess = radicand / 2 + 1;
    let mut iterations = 0u32;
    while guess < result {
        result = guess;
        guess = (radicand / guess + guess) / 2;
        iterations += 1;
        if iterations >= MAX_ISQRT_ITERATIONS {
            return Err(ErrorCode::MathOverflow.into());
        }
    }
    crate::utils::math_safe::to_u64(result)
}

/// Spot price of the input token denominated in the output token,
/// scaled by [`PRICE_SCALE`].
pub fn spot_price(reserve_in: u64, reserve_out: u64) -> Result<u128> {
    require!(reserve_in > 0, ErrorCode::DivisionByZero);
    u128::from(reserve_out)
        .safe_mul(PRICE_SCALE)?
        .safe_div(u128::from(reserve_in))
}

/// Effective price of a fill, scaled by [`PRICE_SCALE`].
pub fn fill_price(amount_in: u64, amount_out: u64) -> Result<u128> {
    require!(amount_in > 0, ErrorCode::DivisionByZero);
    u128::from(amount_out)
        .safe_mul(PRICE_SCALE)?
        .safe_div(u128::from(amount_in))
}

/// `price * (10000 + offset_bps) / 10000`
pub fn price_above(price: u128, offset_bps: u16) -> Result<u128> {
    price
        .safe_mul(u128::from(BPS_DENOMINATOR) + u128::from(offset_bps))?
        .safe_div(u128::from(BPS_DENOMINATOR))
}

/// `price * (10000 - offset_bps) / 10000`
pub fn price_below(price: u128, offset_bps: u16) -> Result<u128> {
    require!(
        u64::from(offset_bps) < BPS_DENOMINATOR,
        ErrorCode::InvalidGridOffset
    );
    price
        .safe_mul(u128::from(BPS_DENOMINATOR) - u128::from(offset_bps))?
        .safe_div(u128::from(BPS_DENOMINATOR))
}

/// Absolute deviation of `current` from `reference` in basis points.
pub fn deviation_bps(current: u128, reference: u128) -> Result<u64> {
    require!(reference > 0, ErrorCode::DivisionByZero);
    let diff = if current >= reference {
        current - reference
    } else {
        reference - current
    };
    let bps = diff
        .safe_mul(u128::from(BPS_DENOMINATOR))?
        .safe_div(reference)?;
    crate::utils::math_safe::to_u64(bps)
}

/// How far `fill` trades below `spot`, in basis points. A fill at or above
/// spot has zero slippage.
pub fn slippage_bps(spot: u128, fill: u128) -> Result<u64> {
    require!(spot > 0, ErrorCode::DivisionByZero);
    if fill >= spot {
        return Ok(0);
    }
    let bps = (spot - fill)
        .safe_mul(u128::from(BPS_DENOMINATOR))?
        .safe_div(spot)?;
    crate::utils::math_safe::to_u64(bps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn quote_out_reference_scenarios() {
        // reserves (1000, 1000), 0.3% fee:
        // floor(100*9970*1000 / (1000*10000 + 100*9970)) = 90
        assert_eq!(quote_out(100, 1000, 1000, 30).unwrap(), 90);
        // swapping a full pool-size amount:
        // floor(1000*9970*1000 / (1000*10000 + 1000*9970)) = 499
        assert_eq!(quote_out(1000, 1000, 1000, 30).unwrap(), 499);
    }

    #[test]
    fn quote_out_rejects_empty_reserves() {
        assert!(quote_out(100, 0, 1000, 30).is_err());
        assert!(quote_out(100, 1000, 0, 30).is_err());
    }

    #[test]
    fn quote_in_rejects_draining_the_pool() {
        assert!(quote_in(1000, 1000, 1000, 30).is_err());
    }

    #[test]
    fn isqrt_exact_squares() {
        assert_eq!(isqrt(0, 100).unwrap(), 0);
        assert_eq!(isqrt(4, 9).unwrap(), 6);
        assert_eq!(isqrt(1_000_000, 1_000_000).unwrap(), 1_000_000);
        // floor behavior, including the tiny radicands the seed cannot reach
        assert_eq!(isqrt(1, 1).unwrap(), 1);
        assert_eq!(isqrt(2, 1).unwrap(), 1);
        assert_eq!(isqrt(3, 1).unwrap(), 1);
        assert_eq!(isqrt(2, 4).unwrap(), 2);
        assert_eq!(isqrt(u64::MAX, u64::MAX).unwrap(), u64::MAX);
    }

    #[test]
    fn spot_price_scale() {
        // 2000 out per 1000 in => 2.0 at 1e9 scale
        assert_eq!(spot_price(1000, 2000).unwrap(), 2 * PRICE_SCALE);
    }

    #[test]
    fn price_offsets() {
        let p = PRICE_SCALE;
        assert_eq!(price_above(p, 500).unwrap(), p * 10_500 / 10_000);
        assert_eq!(price_below(p, 500).unwrap(), p * 9_500 / 10_000);
        assert!(price_below(p, 10_000).is_err());
    }

    #[test]
    fn deviation_and_slippage() {
        assert_eq!(deviation_bps(1_100, 1_000).unwrap(), 1_000);
        assert_eq!(deviation_bps(900, 1_000).unwrap(), 1_000);
        assert_eq!(slippage_bps(1_000, 950).unwrap(), 500);
        assert_eq!(slippage_bps(1_000, 1_200).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn quote_round_trip_covers_requested_output(
            reserve_in in 1_000u64..1_000_000_000_000,
            reserve_out in 1_000u64..1_000_000_000_000,
            amount_out in 1u64..500,
            fee_bps in 1u16..=9_900,
        ) {
            prop_assume!(amount_out < reserve_out / 2);
            let needed = quote_in(amount_out, reserve_in, reserve_out, fee_bps).unwrap();
            let produced = quote_out(needed, reserve_in, reserve_out, fee_bps).unwrap();
            prop_assert!(produced >= amount_out);
        }

        #[test]
        fn product_never_decreases_across_a_swap(
            reserve_in in 1_000u64..1_000_000_000,
            reserve_out in 1_000u64..1_000_000_000,
            amount_in in 1u64..1_000_000,
            fee_bps in 1u16..=9_999,
        ) {
            let out = quote_out(amount_in, reserve_in, reserve_out, fee_bps).unwrap();
            let k_before = u128::from(reserve_in) * u128::from(reserve_out);
            let k_after =
                (u128::from(reserve_in) + u128::from(amount_in))
                    * (u128::from(reserve_out) - u128::from(out));
            prop_assert!(k_after >= k_before);
        }

        #[test]
        fn isqrt_is_floor_sqrt(x in 0u64..u64::MAX, y in 0u64..u64::MAX) {
            let root = isqrt(x, y).unwrap() as u128;
            let p = u128::from(x) * u128::from(y);
            prop_assert!(root * root <= p);
            prop_assert!((root + 1).checked_mul(root + 1).map_or(true, |next| next > p));
        }
    }
}
