//! Fill planning for limit orders.
//!
//! A fill request names an input amount (or zero for the full remaining
//! budget); the plan resolves the actual amount and the pro-rata minimum
//! output that keeps the order's overall `min_amount_out` guarantee intact
//! across partial fills.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::state::LimitOrder;
use crate::utils::SafeMath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    pub amount_in: u64,
    pub min_amount_out: u64,
}

/// Resolve a fill request against the order's remaining budget.
/// `requested == 0` means the full remaining amount; anything smaller
/// requires the order to allow partial fills.
pub fn plan_limit_fill(order: &LimitOrder, requested: u64) -> Result<FillPlan> {
    require!(order.remaining_amount > 0, ErrorCode::FillExceedsRemaining);
    let amount_in = if requested == 0 {
        order.remaining_amount
    } else {
        require!(
            requested <= order.remaining_amount,
            ErrorCode::FillExceedsRemaining
        );
        require!(
            requested == order.remaining_amount || order.partial_fill_allowed,
            ErrorCode::PartialFillNotAllowed
        );
        requested
    };
    // ceil(min_amount_out * amount_in / amount_in_total) so the sum of
    // partial minimums never undercuts the order-level minimum.
    let scaled = u128::from(order.min_amount_out)
        .safe_mul(u128::from(amount_in))?
        .safe_add(u128::from(order.amount_in) - 1)?
        .safe_div(u128::from(order.amount_in))?;
    Ok(FillPlan {
        amount_in,
        min_amount_out: crate::utils::math_safe::to_u64(scaled)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OrderStatus;

    fn order(amount_in: u64, min_amount_out: u64, partial: bool) -> LimitOrder {
        LimitOrder {
            id: 1,
            owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            token_in: Pubkey::new_unique(),
            token_out: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            amount_in,
            min_amount_out,
            limit_price: 1,
            created_time: 0,
            expiry_time: i64::MAX,
            min_execution_delay: 0,
            max_slippage_bps: 10_000,
            partial_fill_allowed: partial,
            use_twap: false,
            status: OrderStatus::Active,
            executed_amount: 0,
            remaining_amount: amount_in,
            bump: 0,
        }
    }

    #[test]
    fn zero_request_fills_the_remainder() {
        let plan = plan_limit_fill(&order(100, 90, false), 0).unwrap();
        assert_eq!(plan.amount_in, 100);
        assert_eq!(plan.min_amount_out, 90);
    }

    #[test]
    fn partial_fill_scales_the_minimum_up() {
        // 30 of 100 input units must earn ceil(90 * 30 / 100) = 27
        let plan = plan_limit_fill(&order(100, 90, true), 30).unwrap();
        assert_eq!(plan.amount_in, 30);
        assert_eq!(plan.min_amount_out, 27);

        // rounding goes up: ceil(90 * 1 / 100) = 1
        let plan = plan_limit_fill(&order(100, 90, true), 1).unwrap();
        assert_eq!(plan.min_amount_out, 1);
    }

    #[test]
    fn partial_sum_never_undercuts_the_order_minimum() {
        let o = order(100, 91, true);
        let mut total_min = 0u64;
        for chunk in [33, 33, 34] {
            total_min += plan_limit_fill(&o, chunk).unwrap().min_amount_out;
        }
        assert!(total_min >= o.min_amount_out);
    }

    #[test]
    fn partial_fill_requires_the_flag() {
        assert!(plan_limit_fill(&order(100, 90, false), 30).is_err());
        // a full-size request is not a partial fill
        assert!(plan_limit_fill(&order(100, 90, false), 100).is_ok());
    }

    #[test]
    fn overfill_rejected() {
        assert!(plan_limit_fill(&order(100, 90, true), 101).is_err());
        let mut o = order(100, 90, true);
        o.apply_fill(100).unwrap();
        assert!(plan_limit_fill(&o, 0).is_err());
    }
}
