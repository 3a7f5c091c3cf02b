//! Scheduler state: one bounded, self-resuming execution loop per order
//! family.
//!
//! The state machine is Idle -> Running -> (Idle | Halted): `start` arms the
//! loop with an iteration budget, every tick advances the cycle counter, and
//! the loop disarms itself when the budget is spent. The re-invocation
//! driver is an external cranker; this account only carries the durable
//! resumption state.

use anchor_lang::prelude::*;

use crate::constants::MAX_SCHEDULER_ITERATIONS;
use crate::error::ErrorCode;
use crate::state::OrderFamily;
use crate::utils::SafeMath;

#[account]
#[derive(InitSpace)]
pub struct SchedulerState {
    pub family: OrderFamily,
    pub enabled: bool,
    /// Ticks run since the last `start`.
    pub cycle_counter: u64,
    /// Tick budget set by `start`; the loop halts itself at the boundary.
    pub max_iterations: u64,
    /// Orders executed across the lifetime of this scheduler.
    pub total_executed: u64,
    pub last_tick_time: i64,
    pub bump: u8,
}

impl SchedulerState {
    pub fn start(&mut self, max_iterations: u64) -> Result<()> {
        require!(
            max_iterations > 0 && max_iterations <= MAX_SCHEDULER_ITERATIONS,
            ErrorCode::InvalidIterationBudget
        );
        self.enabled = true;
        self.cycle_counter = 0;
        self.max_iterations = max_iterations;
        Ok(())
    }

    /// Effective at the next tick boundary; a tick in flight finishes.
    pub fn stop(&mut self) {
        self.enabled = false;
    }

    /// Account one completed tick. Disables the loop when the iteration
    /// budget is exhausted, regardless of remaining eligible orders.
    pub fn complete_tick(&mut self, executed: u64, now: i64) -> Result<()> {
        require!(self.enabled, ErrorCode::SchedulerDisabled);
        self.cycle_counter = self.cycle_counter.safe_add(1)?;
        self.total_executed = self.total_executed.safe_add(executed)?;
        self.last_tick_time = now;
        if self.cycle_counter >= self.max_iterations {
            self.enabled = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> SchedulerState {
        SchedulerState {
            family: OrderFamily::Limit,
            enabled: false,
            cycle_counter: 0,
            max_iterations: 0,
            total_executed: 0,
            last_tick_time: 0,
            bump: 0,
        }
    }

    #[test]
    fn start_resets_the_cycle_counter() {
        let mut s = scheduler();
        s.start(3).unwrap();
        s.complete_tick(1, 10).unwrap();
        assert_eq!(s.cycle_counter, 1);

        s.start(5).unwrap();
        assert_eq!(s.cycle_counter, 0);
        assert!(s.enabled);
    }

    #[test]
    fn budget_exhaustion_halts_even_with_work_left() {
        let mut s = scheduler();
        s.start(5).unwrap();
        for i in 0..5 {
            assert!(s.enabled);
            s.complete_tick(2, i).unwrap();
        }
        assert!(!s.enabled);
        assert_eq!(s.cycle_counter, 5);
        assert_eq!(s.total_executed, 10);
        assert!(s.complete_tick(0, 6).is_err());
    }

    #[test]
    fn stop_takes_effect_immediately_for_the_next_tick() {
        let mut s = scheduler();
        s.start(10).unwrap();
        s.complete_tick(0, 1).unwrap();
        s.stop();
        assert!(!s.enabled);
        assert!(s.complete_tick(0, 2).is_err());
    }

    #[test]
    fn zero_or_oversized_budget_rejected() {
        let mut s = scheduler();
        assert!(s.start(0).is_err());
        assert!(s.start(MAX_SCHEDULER_ITERATIONS + 1).is_err());
    }
}
