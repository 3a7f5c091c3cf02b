//! Limit order record and its fill/cancel state machine.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::state::OrderStatus;
use crate::utils::SafeMath;

#[account]
#[derive(InitSpace)]
pub struct LimitOrder {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    /// Escrow token account holding the unfilled input budget.
    pub escrow: Pubkey,

    pub amount_in: u64,
    pub min_amount_out: u64,
    /// Units of token_out per unit of token_in, PRICE_SCALE fixed point.
    pub limit_price: u128,

    pub created_time: i64,
    pub expiry_time: i64,
    /// Minimum seconds between creation and first execution.
    pub min_execution_delay: i64,
    pub max_slippage_bps: u16,
    pub partial_fill_allowed: bool,
    /// Evaluate against the pool TWAP instead of spot.
    pub use_twap: bool,

    pub status: OrderStatus,
    pub executed_amount: u64,
    pub remaining_amount: u64,

    pub bump: u8,
}

impl LimitOrder {
    /// `executed + remaining == amount_in`, at every observation point.
    pub fn check_accounting(&self) -> Result<()> {
        require!(
            self.executed_amount.safe_add(self.remaining_amount)? == self.amount_in,
            ErrorCode::FillAccountingBroken
        );
        Ok(())
    }

    /// Book a fill of `amount` input units, transitioning to Filled when the
    /// budget is exhausted.
    pub fn apply_fill(&mut self, amount: u64) -> Result<()> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        require!(amount > 0, ErrorCode::ZeroAmount);
        require!(
            amount <= self.remaining_amount,
            ErrorCode::FillExceedsRemaining
        );
        self.executed_amount = self.executed_amount.safe_add(amount)?;
        self.remaining_amount = self.remaining_amount.safe_sub(amount)?;
        if self.remaining_amount == 0 {
            self.status = OrderStatus::Filled;
        }
        self.check_accounting()
    }

    pub fn cancel(&mut self) -> Result<()> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    pub fn mark_expired(&mut self) -> Result<()> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        self.status = OrderStatus::Expired;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(amount_in: u64) -> LimitOrder {
        LimitOrder {
            id: 1,
            owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            token_in: Pubkey::new_unique(),
            token_out: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            amount_in,
            min_amount_out: 1,
            limit_price: 1,
            created_time: 0,
            expiry_time: 1_000,
            min_execution_delay: 0,
            max_slippage_bps: 100,
            partial_fill_allowed: true,
            use_twap: false,
            status: OrderStatus::Active,
            executed_amount: 0,
            remaining_amount: amount_in,
            bump: 0,
        }
    }

    #[test]
    fn fills_conserve_the_budget() {
        let mut o = order(100);
        o.apply_fill(40).unwrap();
        assert_eq!(o.executed_amount, 40);
        assert_eq!(o.remaining_amount, 60);
        assert_eq!(o.status, OrderStatus::Active);

        o.apply_fill(60).unwrap();
        assert_eq!(o.status, OrderStatus::Filled);
        o.check_accounting().unwrap();
    }

    #[test]
    fn overfill_rejected() {
        let mut o = order(100);
        assert!(o.apply_fill(101).is_err());
        assert!(o.apply_fill(0).is_err());
    }

    #[test]
    fn filled_order_rejects_further_fills() {
        let mut o = order(10);
        o.apply_fill(10).unwrap();
        assert!(o.apply_fill(1).is_err());
        assert!(o.cancel().is_err());
    }

    #[test]
    fn cancel_only_from_active() {
        let mut o = order(10);
        o.cancel().unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert!(o.cancel().is_err());
        assert!(o.mark_expired().is_err());
    }
}
