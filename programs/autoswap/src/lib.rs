//! Autoswap: a constant-product AMM with self-scheduling order execution.
//!
//! Pools hold canonical token pairs with reserve-backed pricing and a TWAP
//! oracle. Three order families (limit, recurring, grid) escrow their input
//! up front and are executed either through keeper entry points or through
//! bounded scheduler cranks. A global config carries the pause switch, the
//! reentrancy lock and role membership.

use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod logic;
pub mod state;
pub mod utils;

use instructions::*;
use state::{ExecutionMode, OrderStatus, RecurringKind, Role};

declare_id!("CpPmeSMECUkVWHL3nb1REYtf4rU6FdJZaT4qU6k2PRWc");

#[program]
pub mod autoswap {
    use super::*;

    // Engine setup

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    // Pool operations

    pub fn create_pool(
        ctx: Context<CreatePool>,
        amount_0: u64,
        amount_1: u64,
        fee_bps: u16,
    ) -> Result<()> {
        instructions::create_pool::handler(ctx, amount_0, amount_1, fee_bps)
    }

    pub fn add_liquidity(
        ctx: Context<ModifyLiquidity>,
        amount_0_desired: u64,
        amount_1_desired: u64,
        amount_0_min: u64,
        amount_1_min: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::liquidity::add_handler(
            ctx,
            amount_0_desired,
            amount_1_desired,
            amount_0_min,
            amount_1_min,
            deadline,
        )
    }

    pub fn remove_liquidity(
        ctx: Context<ModifyLiquidity>,
        lp_amount: u64,
        amount_0_min: u64,
        amount_1_min: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::liquidity::remove_handler(ctx, lp_amount, amount_0_min, amount_1_min, deadline)
    }

    pub fn swap(
        ctx: Context<Swap>,
        amount_in: u64,
        min_amount_out: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::swap::handler(ctx, amount_in, min_amount_out, deadline)
    }

    // Pool queries

    pub fn get_amount_out(ctx: Context<QueryPool>, token_in: Pubkey, amount_in: u64) -> Result<u64> {
        instructions::quote::get_amount_out_handler(ctx, token_in, amount_in)
    }

    pub fn get_amount_in(ctx: Context<QueryPool>, token_in: Pubkey, amount_out: u64) -> Result<u64> {
        instructions::quote::get_amount_in_handler(ctx, token_in, amount_out)
    }

    pub fn get_pool(ctx: Context<QueryPool>) -> Result<PoolInfo> {
        instructions::quote::get_pool_handler(ctx)
    }

    // Limit orders

    pub fn create_limit_order(
        ctx: Context<CreateLimitOrder>,
        params: CreateLimitOrderParams,
    ) -> Result<()> {
        instructions::limit_order::create_handler(ctx, params)
    }

    pub fn cancel_limit_order(ctx: Context<CancelLimitOrder>) -> Result<()> {
        instructions::limit_order::cancel_handler(ctx)
    }

    /// Keeper-path execution. `fill_amount == 0` fills the full remaining
    /// budget.
    pub fn execute_limit_order(ctx: Context<ExecuteLimitOrder>, fill_amount: u64) -> Result<()> {
        instructions::limit_order::execute_handler(ctx, fill_amount)
    }

    // Recurring orders

    pub fn create_dca_order(
        ctx: Context<CreateRecurringOrder>,
        amount_per_execution: u64,
        min_amount_out: u64,
        execution_interval: i64,
        max_executions: u32,
        expiry_at: i64,
    ) -> Result<()> {
        instructions::recurring_order::create_handler(
            ctx,
            CreateRecurringOrderParams {
                kind: RecurringKind::Dca,
                mode: ExecutionMode::Interval,
                amount_per_execution,
                min_amount_out,
                execution_interval,
                trigger_percentage_bps: 0,
                max_executions,
                expiry_at,
            },
        )
    }

    pub fn create_buy_on_increase_order(
        ctx: Context<CreateRecurringOrder>,
        amount_per_execution: u64,
        min_amount_out: u64,
        trigger_percentage_bps: u16,
        max_executions: u32,
        expiry_at: i64,
    ) -> Result<()> {
        instructions::recurring_order::create_handler(
            ctx,
            CreateRecurringOrderParams {
                kind: RecurringKind::BuyOnIncrease,
                mode: ExecutionMode::Trigger,
                amount_per_execution,
                min_amount_out,
                execution_interval: 0,
                trigger_percentage_bps,
                max_executions,
                expiry_at,
            },
        )
    }

    pub fn create_sell_on_decrease_order(
        ctx: Context<CreateRecurringOrder>,
        amount_per_execution: u64,
        min_amount_out: u64,
        trigger_percentage_bps: u16,
        max_executions: u32,
        expiry_at: i64,
    ) -> Result<()> {
        instructions::recurring_order::create_handler(
            ctx,
            CreateRecurringOrderParams {
                kind: RecurringKind::SellOnDecrease,
                mode: ExecutionMode::Trigger,
                amount_per_execution,
                min_amount_out,
                execution_interval: 0,
                trigger_percentage_bps,
                max_executions,
                expiry_at,
            },
        )
    }

    pub fn pause_recurring_order(ctx: Context<UpdateRecurringOrder>) -> Result<()> {
        instructions::recurring_order::pause_handler(ctx)
    }

    pub fn resume_recurring_order(ctx: Context<UpdateRecurringOrder>) -> Result<()> {
        instructions::recurring_order::resume_handler(ctx)
    }

    pub fn cancel_recurring_order(ctx: Context<CancelRecurringOrder>) -> Result<()> {
        instructions::recurring_order::cancel_handler(ctx)
    }

    pub fn execute_recurring_order(ctx: Context<ExecuteRecurringOrder>) -> Result<()> {
        instructions::recurring_order::execute_handler(ctx)
    }

    // Grid orders

    pub fn create_grid_order(
        ctx: Context<CreateGridOrder>,
        params: CreateGridOrderParams,
    ) -> Result<()> {
        instructions::grid_order::create_handler(ctx, params)
    }

    pub fn cancel_grid_order(ctx: Context<CancelGridOrder>) -> Result<()> {
        instructions::grid_order::cancel_handler(ctx)
    }

    pub fn execute_grid_level(ctx: Context<ExecuteGridLevel>, level_index: u8) -> Result<()> {
        instructions::grid_order::execute_handler(ctx, level_index)
    }

    // Scheduler

    pub fn start_bot(ctx: Context<ControlBot>, max_iterations: u64) -> Result<()> {
        instructions::crank::start_bot_handler(ctx, max_iterations)
    }

    pub fn stop_bot(ctx: Context<ControlBot>) -> Result<()> {
        instructions::crank::stop_bot_handler(ctx)
    }

    pub fn read_bot_status(ctx: Context<ReadBotStatus>) -> Result<BotStatus> {
        instructions::crank::read_bot_status_handler(ctx)
    }

    pub fn crank_limit_orders<'info>(
        ctx: Context<'_, '_, 'info, 'info, CrankOrders<'info>>,
    ) -> Result<()> {
        instructions::crank::crank_limit_handler(ctx)
    }

    pub fn crank_recurring_orders<'info>(
        ctx: Context<'_, '_, 'info, 'info, CrankOrders<'info>>,
    ) -> Result<()> {
        instructions::crank::crank_recurring_handler(ctx)
    }

    pub fn crank_grid_orders<'info>(
        ctx: Context<'_, '_, 'info, 'info, CrankOrders<'info>>,
    ) -> Result<()> {
        instructions::crank::crank_grid_handler(ctx)
    }

    // Order queries

    pub fn get_limit_order(ctx: Context<QueryLimitOrder>) -> Result<LimitOrderView> {
        instructions::views::get_limit_order_handler(ctx)
    }

    pub fn get_recurring_order(ctx: Context<QueryRecurringOrder>) -> Result<RecurringOrderView> {
        instructions::views::get_recurring_order_handler(ctx)
    }

    pub fn get_grid_order(ctx: Context<QueryGridOrder>) -> Result<GridOrderView> {
        instructions::views::get_grid_order_handler(ctx)
    }

    pub fn is_limit_order_eligible(ctx: Context<ProbeLimitOrder>) -> Result<bool> {
        instructions::views::is_limit_order_eligible_handler(ctx)
    }

    pub fn is_recurring_order_eligible(ctx: Context<ProbeRecurringOrder>) -> Result<bool> {
        instructions::views::is_recurring_order_eligible_handler(ctx)
    }

    pub fn grid_order_eligibility(ctx: Context<ProbeGridOrder>) -> Result<Vec<bool>> {
        instructions::views::grid_order_eligibility_handler(ctx)
    }

    pub fn get_user_orders(ctx: Context<QueryUserOrders>) -> Result<Vec<u64>> {
        instructions::views::get_user_orders_handler(ctx)
    }

    pub fn get_active_orders(ctx: Context<QueryRegistry>) -> Result<Vec<u64>> {
        instructions::views::get_active_orders_handler(ctx)
    }

    pub fn get_orders_by_status(ctx: Context<QueryRegistry>, status: OrderStatus) -> Result<Vec<u64>> {
        instructions::views::get_orders_by_status_handler(ctx, status)
    }

    pub fn get_orders_for_pool(ctx: Context<QueryRegistry>, pool: Pubkey) -> Result<Vec<u64>> {
        instructions::views::get_orders_for_pool_handler(ctx, pool)
    }

    // Administration

    pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
        instructions::admin::set_paused_handler(ctx, paused)
    }

    pub fn set_pool_fee(ctx: Context<SetPoolFee>, new_fee_bps: u16) -> Result<()> {
        instructions::admin::set_pool_fee_handler(ctx, new_fee_bps)
    }

    pub fn grant_role(ctx: Context<ManageRoles>, role: Role, member: Pubkey) -> Result<()> {
        instructions::admin::grant_role_handler(ctx, role, member)
    }

    pub fn revoke_role(ctx: Context<ManageRoles>, role: Role, member: Pubkey) -> Result<()> {
        instructions::admin::revoke_role_handler(ctx, role, member)
    }
}
