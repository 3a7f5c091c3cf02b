//! Recurring order record (DCA and trigger-style strategies) and its
//! pause/complete state machine.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::state::OrderStatus;
use crate::utils::SafeMath;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecurringKind {
    /// Buy when price rises at least trigger_percentage_bps above reference.
    BuyOnIncrease,
    /// Sell when price falls at least trigger_percentage_bps below reference.
    SellOnDecrease,
    /// Time-sliced accumulation at fixed intervals.
    Dca,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Eligible once `execution_interval` elapses since the last run.
    Interval,
    /// Eligible when price deviates from the reference by the trigger bps.
    Trigger,
}

#[account]
#[derive(InitSpace)]
pub struct RecurringOrder {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub escrow: Pubkey,

    pub kind: RecurringKind,
    pub mode: ExecutionMode,

    pub amount_per_execution: u64,
    pub min_amount_out: u64,
    pub execution_interval: i64,
    pub trigger_percentage_bps: u16,
    pub max_executions: u32,
    pub execution_count: u32,

    /// Spot price when the order was created, PRICE_SCALE fixed point.
    pub entry_price: u128,
    /// Moving trigger baseline; resets to the execution price on each fill.
    pub reference_price: u128,

    pub last_executed_time: i64,
    pub created_time: i64,
    pub expiry_at: i64,

    pub status: OrderStatus,
    pub bump: u8,
}

impl RecurringOrder {
    pub fn remaining_executions(&self) -> u32 {
        self.max_executions.saturating_sub(self.execution_count)
    }

    /// Input budget still escrowed for future executions.
    pub fn remaining_budget(&self) -> Result<u64> {
        self.amount_per_execution
            .safe_mul(u64::from(self.remaining_executions()))
    }

    /// Book one execution at `execution_price`, transitioning to Completed
    /// when the execution budget is exhausted.
    pub fn apply_execution(&mut self, execution_price: u128, now: i64) -> Result<()> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        require!(
            self.execution_count < self.max_executions,
            ErrorCode::OrderNotEligible
        );
        self.execution_count = self
            .execution_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
        self.last_executed_time = now;
        self.reference_price = execution_price;
        if self.execution_count == self.max_executions {
            self.status = OrderStatus::Completed;
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        require!(self.status == OrderStatus::Active, ErrorCode::OrderNotActive);
        self.status = OrderStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        require!(self.status == OrderStatus::Paused, ErrorCode::OrderNotPaused);
        self.status = OrderStatus::Active;
        Ok(())
    }

    /// Cancelling is allowed while the order is Active or Paused.
    pub fn cancel(&mut self) -> Result<()> {
        match self.status {
            OrderStatus::Active | OrderStatus::Paused => {
                self.status = OrderStatus::Cancelled;
                Ok(())
            }
            _ => Err(ErrorCode::OrderNotActive.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(max_executions: u32) -> RecurringOrder {
        RecurringOrder {
            id: 1,
            owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            token_in: Pubkey::new_unique(),
            token_out: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            kind: RecurringKind::Dca,
            mode: ExecutionMode::Interval,
            amount_per_execution: 50,
            min_amount_out: 1,
            execution_interval: 3_600,
            trigger_percentage_bps: 0,
            max_executions,
            execution_count: 0,
            entry_price: 1_000,
            reference_price: 1_000,
            last_executed_time: 0,
            created_time: 0,
            expiry_at: i64::MAX,
            status: OrderStatus::Active,
            bump: 0,
        }
    }

    #[test]
    fn executions_complete_the_order() {
        let mut o = order(2);
        o.apply_execution(1_100, 10).unwrap();
        assert_eq!(o.execution_count, 1);
        assert_eq!(o.reference_price, 1_100);
        assert_eq!(o.last_executed_time, 10);
        assert_eq!(o.status, OrderStatus::Active);
        assert_eq!(o.remaining_budget().unwrap(), 50);

        o.apply_execution(1_200, 20).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        assert!(o.apply_execution(1_300, 30).is_err());
    }

    #[test]
    fn pause_resume_cancel() {
        let mut o = order(5);
        o.pause().unwrap();
        assert!(o.apply_execution(1_000, 5).is_err());
        assert!(o.pause().is_err());
        o.resume().unwrap();
        assert_eq!(o.status, OrderStatus::Active);

        o.pause().unwrap();
        o.cancel().unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert!(o.resume().is_err());
    }
}
