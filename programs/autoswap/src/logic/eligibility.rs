//! Eligibility evaluator: pure predicates over an order record and the
//! current pool price / clock. No account access and no mutation; the crank
//! and the keeper path both call these, and `is_order_eligible` exposes
//! them read-only.

use anchor_lang::prelude::*;

use crate::state::{
    ExecutionMode, GridDirection, GridLevel, GridOrder, LimitOrder, OrderStatus, RecurringKind,
    RecurringOrder,
};
use crate::utils::math::{deviation_bps, price_above, price_below, slippage_bps};

/// A limit order is eligible when it is live, the MEV-protection delay has
/// elapsed and the evaluation price (TWAP or spot per the order) has crossed
/// the limit. The slippage-of-fill bound is checked separately once fill
/// amounts are known.
pub fn limit_order_eligible(order: &LimitOrder, eval_price: u128, now: i64) -> bool {
    order.status == OrderStatus::Active
        && now < order.expiry_time
        && now - order.created_time >= order.min_execution_delay
        && eval_price >= order.limit_price
}

/// Whether a fill at (`amount_in`, `amount_out`) stays within the order's
/// slippage tolerance relative to the current spot price.
pub fn fill_within_slippage(
    spot: u128,
    amount_in: u64,
    amount_out: u64,
    max_slippage_bps: u16,
) -> Result<bool> {
    let fill = crate::utils::math::fill_price(amount_in, amount_out)?;
    Ok(slippage_bps(spot, fill)? <= u64::from(max_slippage_bps))
}

/// Recurring-order eligibility for the current price and clock.
pub fn recurring_order_eligible(
    order: &RecurringOrder,
    current_price: u128,
    now: i64,
) -> Result<bool> {
    if order.status != OrderStatus::Active
        || order.execution_count >= order.max_executions
        || now >= order.expiry_at
    {
        return Ok(false);
    }
    match order.mode {
        ExecutionMode::Interval => Ok(now - order.last_executed_time >= order.execution_interval),
        ExecutionMode::Trigger => {
            let deviation = deviation_bps(current_price, order.reference_price)?;
            if deviation < u64::from(order.trigger_percentage_bps) {
                return Ok(false);
            }
            Ok(match order.kind {
                RecurringKind::BuyOnIncrease => current_price >= order.reference_price,
                RecurringKind::SellOnDecrease => current_price <= order.reference_price,
                // DCA is interval-driven; in trigger mode any large move counts.
                RecurringKind::Dca => true,
            })
        }
    }
}

/// Trigger price of one grid level: `entry * (10000 ± offset) / 10000`,
/// below entry for buy grids and above for sell grids.
pub fn grid_level_trigger_price(
    direction: GridDirection,
    entry_price: u128,
    offset_bps: u16,
) -> Result<u128> {
    match direction {
        GridDirection::BuyGrid => price_below(entry_price, offset_bps),
        GridDirection::SellGrid => price_above(entry_price, offset_bps),
    }
}

/// Whether the grid order as a whole can still execute levels.
pub fn grid_order_live(order: &GridOrder, now: i64) -> bool {
    order.status == OrderStatus::Active && now < order.expiry_at
}

/// A level is eligible when it has not fired and the current price has
/// crossed its trigger in the grid's direction.
pub fn grid_level_eligible(
    level: &GridLevel,
    direction: GridDirection,
    entry_price: u128,
    current_price: u128,
) -> Result<bool> {
    if level.executed {
        return Ok(false);
    }
    let trigger = grid_level_trigger_price(direction, entry_price, level.offset_bps)?;
    Ok(match direction {
        GridDirection::BuyGrid => current_price <= trigger,
        GridDirection::SellGrid => current_price >= trigger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_SCALE;

    fn limit_order() -> LimitOrder {
        LimitOrder {
            id: 1,
            owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            token_in: Pubkey::new_unique(),
            token_out: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            amount_in: 100,
            min_amount_out: 1,
            limit_price: 2 * PRICE_SCALE,
            created_time: 1_000,
            expiry_time: 10_000,
            min_execution_delay: 60,
            max_slippage_bps: 500,
            partial_fill_allowed: false,
            use_twap: false,
            status: OrderStatus::Active,
            executed_amount: 0,
            remaining_amount: 100,
            bump: 0,
        }
    }

    #[test]
    fn limit_order_waits_for_price_and_delay() {
        let order = limit_order();
        let below = 19 * PRICE_SCALE / 10;
        let above = 21 * PRICE_SCALE / 10;

        // price below the limit: never eligible
        assert!(!limit_order_eligible(&order, below, 2_000));
        // price crossed but the MEV delay has not elapsed
        assert!(!limit_order_eligible(&order, above, 1_030));
        // both satisfied
        assert!(limit_order_eligible(&order, above, 1_060));
        // expiry is exclusive
        assert!(!limit_order_eligible(&order, above, 10_000));
    }

    #[test]
    fn cancelled_order_is_never_eligible() {
        let mut order = limit_order();
        order.cancel().unwrap();
        assert!(!limit_order_eligible(&order, 3 * PRICE_SCALE, 5_000));
    }

    #[test]
    fn fill_slippage_bound() {
        let spot = 2 * PRICE_SCALE;
        // fill at exactly spot: 100 in, 200 out
        assert!(fill_within_slippage(spot, 100, 200, 0).unwrap());
        // 5% worse than spot: 100 in, 190 out
        assert!(fill_within_slippage(spot, 100, 190, 500).unwrap());
        assert!(!fill_within_slippage(spot, 100, 190, 499).unwrap());
    }

    fn recurring(mode: ExecutionMode, kind: RecurringKind) -> RecurringOrder {
        RecurringOrder {
            id: 1,
            owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            token_in: Pubkey::new_unique(),
            token_out: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            kind,
            mode,
            amount_per_execution: 10,
            min_amount_out: 1,
            execution_interval: 3_600,
            trigger_percentage_bps: 500,
            max_executions: 3,
            execution_count: 0,
            entry_price: PRICE_SCALE,
            reference_price: PRICE_SCALE,
            last_executed_time: 0,
            created_time: 0,
            expiry_at: 100_000,
            status: OrderStatus::Active,
            bump: 0,
        }
    }

    #[test]
    fn interval_order_respects_the_clock() {
        let order = recurring(ExecutionMode::Interval, RecurringKind::Dca);
        assert!(!recurring_order_eligible(&order, PRICE_SCALE, 3_599).unwrap());
        assert!(recurring_order_eligible(&order, PRICE_SCALE, 3_600).unwrap());
        // expired
        assert!(!recurring_order_eligible(&order, PRICE_SCALE, 100_000).unwrap());
    }

    #[test]
    fn exhausted_order_is_ineligible() {
        let mut order = recurring(ExecutionMode::Interval, RecurringKind::Dca);
        order.execution_count = order.max_executions;
        assert!(!recurring_order_eligible(&order, PRICE_SCALE, 50_000).unwrap());
    }

    #[test]
    fn trigger_order_requires_directional_deviation() {
        let buy = recurring(ExecutionMode::Trigger, RecurringKind::BuyOnIncrease);
        // +4.99%: below trigger
        let almost = PRICE_SCALE + PRICE_SCALE * 499 / 10_000;
        assert!(!recurring_order_eligible(&buy, almost, 100).unwrap());
        // +5%
        let crossed = PRICE_SCALE + PRICE_SCALE * 500 / 10_000;
        assert!(recurring_order_eligible(&buy, crossed, 100).unwrap());
        // -5% is the wrong direction for BuyOnIncrease
        let dropped = PRICE_SCALE - PRICE_SCALE * 500 / 10_000;
        assert!(!recurring_order_eligible(&buy, dropped, 100).unwrap());

        let sell = recurring(ExecutionMode::Trigger, RecurringKind::SellOnDecrease);
        assert!(recurring_order_eligible(&sell, dropped, 100).unwrap());
        assert!(!recurring_order_eligible(&sell, crossed, 100).unwrap());
    }

    #[test]
    fn grid_trigger_prices_bracket_the_entry() {
        let entry = PRICE_SCALE;
        assert_eq!(
            grid_level_trigger_price(GridDirection::BuyGrid, entry, 500).unwrap(),
            entry * 9_500 / 10_000
        );
        assert_eq!(
            grid_level_trigger_price(GridDirection::SellGrid, entry, 1_500).unwrap(),
            entry * 11_500 / 10_000
        );
    }

    #[test]
    fn grid_level_fires_on_directional_cross_only() {
        let level = GridLevel {
            offset_bps: 1_000,
            amount: 10,
            executed: false,
        };
        let entry = PRICE_SCALE;
        let down_11 = entry * 8_900 / 10_000;
        let down_9 = entry * 9_100 / 10_000;

        assert!(grid_level_eligible(&level, GridDirection::BuyGrid, entry, down_11).unwrap());
        assert!(!grid_level_eligible(&level, GridDirection::BuyGrid, entry, down_9).unwrap());
        assert!(!grid_level_eligible(&level, GridDirection::SellGrid, entry, down_11).unwrap());

        let fired = GridLevel {
            executed: true,
            ..level
        };
        assert!(!grid_level_eligible(&fired, GridDirection::BuyGrid, entry, down_11).unwrap());
    }
}
