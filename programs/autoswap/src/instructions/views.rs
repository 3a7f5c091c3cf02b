//! Read-only order queries: single-order snapshots, eligibility probes and
//! the registry/back-index listings.

use anchor_lang::prelude::*;

use crate::constants::TWAP_WINDOW;
use crate::logic::eligibility::{
    grid_level_eligible, grid_level_trigger_price, grid_order_live, limit_order_eligible,
    recurring_order_eligible,
};
use crate::state::{
    ExecutionMode, GridDirection, GridOrder, LimitOrder, OrderRegistry, OrderStatus, Pool,
    RecurringKind, RecurringOrder, UserOrders,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct LimitOrderView {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub amount_in: u64,
    pub min_amount_out: u64,
    pub limit_price: u128,
    pub expiry_time: i64,
    pub status: OrderStatus,
    pub executed_amount: u64,
    pub remaining_amount: u64,
}

#[derive(Accounts)]
pub struct QueryLimitOrder<'info> {
    pub order: Account<'info, LimitOrder>,
}

pub fn get_limit_order_handler(ctx: Context<QueryLimitOrder>) -> Result<LimitOrderView> {
    let o = &ctx.accounts.order;
    Ok(LimitOrderView {
        id: o.id,
        owner: o.owner,
        pool: o.pool,
        token_in: o.token_in,
        token_out: o.token_out,
        amount_in: o.amount_in,
        min_amount_out: o.min_amount_out,
        limit_price: o.limit_price,
        expiry_time: o.expiry_time,
        status: o.status,
        executed_amount: o.executed_amount,
        remaining_amount: o.remaining_amount,
    })
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct RecurringOrderView {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub kind: RecurringKind,
    pub mode: ExecutionMode,
    pub amount_per_execution: u64,
    pub execution_interval: i64,
    pub trigger_percentage_bps: u16,
    pub max_executions: u32,
    pub execution_count: u32,
    pub reference_price: u128,
    pub last_executed_time: i64,
    pub expiry_at: i64,
    pub status: OrderStatus,
}

#[derive(Accounts)]
pub struct QueryRecurringOrder<'info> {
    pub order: Account<'info, RecurringOrder>,
}

pub fn get_recurring_order_handler(ctx: Context<QueryRecurringOrder>) -> Result<RecurringOrderView> {
    let o = &ctx.accounts.order;
    Ok(RecurringOrderView {
        id: o.id,
        owner: o.owner,
        pool: o.pool,
        kind: o.kind,
        mode: o.mode,
        amount_per_execution: o.amount_per_execution,
        execution_interval: o.execution_interval,
        trigger_percentage_bps: o.trigger_percentage_bps,
        max_executions: o.max_executions,
        execution_count: o.execution_count,
        reference_price: o.reference_price,
        last_executed_time: o.last_executed_time,
        expiry_at: o.expiry_at,
        status: o.status,
    })
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct GridLevelView {
    pub offset_bps: u16,
    pub amount: u64,
    pub executed: bool,
    /// Price at which this level fires, PRICE_SCALE fixed point.
    pub trigger_price: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct GridOrderView {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub direction: GridDirection,
    pub entry_price: u128,
    pub levels: Vec<GridLevelView>,
    pub expiry_at: i64,
    pub status: OrderStatus,
}

#[derive(Accounts)]
pub struct QueryGridOrder<'info> {
    pub order: Account<'info, GridOrder>,
}

pub fn get_grid_order_handler(ctx: Context<QueryGridOrder>) -> Result<GridOrderView> {
    let o = &ctx.accounts.order;
    let mut levels = Vec::with_capacity(o.levels.len());
    for level in &o.levels {
        levels.push(GridLevelView {
            offset_bps: level.offset_bps,
            amount: level.amount,
            executed: level.executed,
            trigger_price: grid_level_trigger_price(o.direction, o.entry_price, level.offset_bps)?,
        });
    }
    Ok(GridOrderView {
        id: o.id,
        owner: o.owner,
        pool: o.pool,
        direction: o.direction,
        entry_price: o.entry_price,
        levels,
        expiry_at: o.expiry_at,
        status: o.status,
    })
}

#[derive(Accounts)]
pub struct ProbeLimitOrder<'info> {
    #[account(has_one = pool)]
    pub order: Account<'info, LimitOrder>,
    pub pool: Account<'info, Pool>,
}

pub fn is_limit_order_eligible_handler(ctx: Context<ProbeLimitOrder>) -> Result<bool> {
    let order = &ctx.accounts.order;
    let pool = &ctx.accounts.pool;
    let now = Clock::get()?.unix_timestamp;
    let input_is_0 = pool.input_is_0(&order.token_in)?;
    let eval_price = if order.use_twap {
        match pool.twap_price_for(input_is_0, TWAP_WINDOW, now) {
            Ok(price) => price,
            Err(_) => return Ok(false),
        }
    } else {
        pool.spot_price_for(input_is_0)?
    };
    Ok(limit_order_eligible(order, eval_price, now))
}

#[derive(Accounts)]
pub struct ProbeRecurringOrder<'info> {
    #[account(has_one = pool)]
    pub order: Account<'info, RecurringOrder>,
    pub pool: Account<'info, Pool>,
}

pub fn is_recurring_order_eligible_handler(ctx: Context<ProbeRecurringOrder>) -> Result<bool> {
    let order = &ctx.accounts.order;
    let pool = &ctx.accounts.pool;
    let now = Clock::get()?.unix_timestamp;
    let input_is_0 = pool.input_is_0(&order.token_in)?;
    let current_price = pool.spot_price_for(input_is_0)?;
    recurring_order_eligible(order, current_price, now)
}

#[derive(Accounts)]
pub struct ProbeGridOrder<'info> {
    #[account(has_one = pool)]
    pub order: Account<'info, GridOrder>,
    pub pool: Account<'info, Pool>,
}

/// Per-level eligibility of a grid order at the current spot price. All
/// entries are false when the order itself is no longer live.
pub fn grid_order_eligibility_handler(ctx: Context<ProbeGridOrder>) -> Result<Vec<bool>> {
    let order = &ctx.accounts.order;
    let pool = &ctx.accounts.pool;
    let now = Clock::get()?.unix_timestamp;
    if !grid_order_live(order, now) {
        return Ok(vec![false; order.levels.len()]);
    }
    let input_is_0 = pool.input_is_0(&order.token_in)?;
    let current_price = pool.spot_price_for(input_is_0)?;
    let mut eligible = Vec::with_capacity(order.levels.len());
    for level in &order.levels {
        eligible.push(grid_level_eligible(
            level,
            order.direction,
            order.entry_price,
            current_price,
        )?);
    }
    Ok(eligible)
}

#[derive(Accounts)]
pub struct QueryUserOrders<'info> {
    pub user_orders: Account<'info, UserOrders>,
}

pub fn get_user_orders_handler(ctx: Context<QueryUserOrders>) -> Result<Vec<u64>> {
    Ok(ctx.accounts.user_orders.order_ids.clone())
}

#[derive(Accounts)]
pub struct QueryRegistry<'info> {
    pub registry: Account<'info, OrderRegistry>,
}

pub fn get_active_orders_handler(ctx: Context<QueryRegistry>) -> Result<Vec<u64>> {
    Ok(ctx.accounts.registry.active_ids())
}

pub fn get_orders_by_status_handler(
    ctx: Context<QueryRegistry>,
    status: OrderStatus,
) -> Result<Vec<u64>> {
    Ok(ctx.accounts.registry.ids_with_status(status))
}

pub fn get_orders_for_pool_handler(ctx: Context<QueryRegistry>, pool: Pubkey) -> Result<Vec<u64>> {
    Ok(ctx.accounts.registry.ids_for_pool(&pool))
}
