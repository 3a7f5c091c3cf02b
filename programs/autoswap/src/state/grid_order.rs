//! Grid order record: a ladder of independently triggerable levels at fixed
//! basis-point offsets from the entry price.

use anchor_lang::prelude::*;

use crate::constants::MAX_GRID_LEVELS;
use crate::error::ErrorCode;
use crate::state::OrderStatus;
use crate::utils::SafeMath;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridDirection {
    /// Levels trigger as price falls below entry (buy the dips).
    BuyGrid,
    /// Levels trigger as price rises above entry (sell the rips).
    SellGrid,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLevel {
    /// Offset from entry price in basis points.
    pub offset_bps: u16,
    /// Input amount committed to this level.
    pub amount: u64,
    /// Set once on execution; a level never re-triggers.
    pub executed: bool,
}

#[account]
#[derive(InitSpace)]
pub struct GridOrder {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub escrow: Pubkey,

    pub direction: GridDirection,
    /// Spot price at creation, PRICE_SCALE fixed point.
    pub entry_price: u128,
    #[max_len(MAX_GRID_LEVELS)]
    pub levels: Vec<GridLevel>,

    pub created_time: i64,
    pub expiry_at: i64,

    pub status: OrderStatus,
    pub bump: u8,
}

impl GridOrder {
    pub fn total_committed(&self) -> Result<u64> {
        let mut total = 0u64;
        for level in &self.levels {
            total = total.safe_add(level.amount)?;
        }
        Ok(total)
    }

    /// Input amount still escrowed for unexecuted levels.
    pub fn remaining_budget(&self) -> Result<u64> {
        let mut total = 0u64;
        for level in self.levels.iter().filter(|l| !l.executed) {
            total = total.safe_add(level.amount)?;
        }
        Ok(total)
    }

    /// Mark a level executed, transitioning to Completed when every level
    /// has fired.
    pub fn apply_level_execution(&mut self, index: usize) -> Result<u64> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        let level = self
            .levels
            .get_mut(index)
            .ok_or(ErrorCode::InvalidGridLevels)?;
        require!(!level.executed, ErrorCode::OrderNotEligible);
        level.executed = true;
        let amount = level.amount;
        if self.levels.iter().all(|l| l.executed) {
            self.status = OrderStatus::Completed;
        }
        Ok(amount)
    }

    pub fn cancel(&mut self) -> Result<()> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(levels: &[(u16, u64)]) -> GridOrder {
        GridOrder {
            id: 1,
            owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            token_in: Pubkey::new_unique(),
            token_out: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            direction: GridDirection::BuyGrid,
            entry_price: 1_000_000,
            levels: levels
                .iter()
                .map(|&(offset_bps, amount)| GridLevel {
                    offset_bps,
                    amount,
                    executed: false,
                })
                .collect(),
            created_time: 0,
            expiry_at: i64::MAX,
            status: OrderStatus::Active,
            bump: 0,
        }
    }

    #[test]
    fn levels_fire_once_and_complete_the_grid() {
        let mut g = grid(&[(500, 10), (1_000, 20), (1_500, 30)]);
        assert_eq!(g.total_committed().unwrap(), 60);

        assert_eq!(g.apply_level_execution(1).unwrap(), 20);
        assert!(g.apply_level_execution(1).is_err());
        assert_eq!(g.remaining_budget().unwrap(), 40);
        assert_eq!(g.status, OrderStatus::Active);

        g.apply_level_execution(0).unwrap();
        g.apply_level_execution(2).unwrap();
        assert_eq!(g.status, OrderStatus::Completed);
    }

    #[test]
    fn out_of_range_level_errors() {
        let mut g = grid(&[(500, 10)]);
        assert!(g.apply_level_execution(3).is_err());
    }

    #[test]
    fn cancelled_grid_rejects_execution() {
        let mut g = grid(&[(500, 10), (1_000, 20)]);
        g.apply_level_execution(0).unwrap();
        g.cancel().unwrap();
        assert_eq!(g.remaining_budget().unwrap(), 20);
        assert!(g.apply_level_execution(1).is_err());
        assert!(g.cancel().is_err());
    }
}
