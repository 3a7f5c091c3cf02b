//! Scheduler control and crank ticks.
//!
//! `start_bot` arms a family's scheduler with an iteration budget and
//! `stop_bot` disarms it; one crank instruction per family runs a single
//! tick over the shared [`CrankOrders`] account set. Candidate orders
//! arrive as (order, escrow, recipient) triples in `remaining_accounts`;
//! ineligible or expired orders are skipped without failing the tick, and
//! every per-order precondition is checked before any token CPI so a skip
//! never leaves partial transfers behind. A CPI failure aborts the whole
//! tick and the runtime rolls the transaction back.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{
    CONFIG_SEED, ENGINE_AUTHORITY_SEED, POOL_AUTHORITY_SEED, REGISTRY_SEED, SCHEDULER_SEED,
    TWAP_WINDOW,
};
use crate::error::ErrorCode;
use crate::events::{BotStarted, BotStopped, OrderExecuted, TickCompleted};
use crate::instructions::executor::{run_order_swap, OrderSwapAccounts};
use crate::logic::eligibility::{
    fill_within_slippage, grid_level_eligible, grid_order_live, limit_order_eligible,
    recurring_order_eligible,
};
use crate::logic::fills::plan_limit_fill;
use crate::state::{
    Config, GridOrder, LimitOrder, Lock, OrderFamily, OrderRegistry, OrderStatus, Pool,
    RecurringOrder, Role, SchedulerState,
};
use crate::utils::math::{fill_price, quote_out};

#[derive(Accounts)]
pub struct ControlBot<'info> {
    pub operator: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [SCHEDULER_SEED, &[scheduler.family.seed()]],
        bump = scheduler.bump,
    )]
    pub scheduler: Account<'info, SchedulerState>,
}

pub fn start_bot_handler(ctx: Context<ControlBot>, max_iterations: u64) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.require_role(Role::Operator, &ctx.accounts.operator.key())?;
    Lock::acquire(&mut config.lock)?;
    let scheduler = &mut ctx.accounts.scheduler;
    scheduler.start(max_iterations)?;
    emit!(BotStarted {
        family: scheduler.family,
        max_iterations,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

pub fn stop_bot_handler(ctx: Context<ControlBot>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.require_role(Role::Operator, &ctx.accounts.operator.key())?;
    Lock::acquire(&mut config.lock)?;
    let scheduler = &mut ctx.accounts.scheduler;
    scheduler.stop();
    emit!(BotStopped {
        family: scheduler.family,
        cycles_run: scheduler.cycle_counter,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct BotStatus {
    pub family: OrderFamily,
    pub enabled: bool,
    pub cycle_counter: u64,
    pub max_iterations: u64,
    pub total_executed: u64,
    pub last_tick_time: i64,
}

#[derive(Accounts)]
pub struct ReadBotStatus<'info> {
    #[account(
        seeds = [SCHEDULER_SEED, &[scheduler.family.seed()]],
        bump = scheduler.bump,
    )]
    pub scheduler: Account<'info, SchedulerState>,
}

pub fn read_bot_status_handler(ctx: Context<ReadBotStatus>) -> Result<BotStatus> {
    let s = &ctx.accounts.scheduler;
    Ok(BotStatus {
        family: s.family,
        enabled: s.enabled,
        cycle_counter: s.cycle_counter,
        max_iterations: s.max_iterations,
        total_executed: s.total_executed,
        last_tick_time: s.last_tick_time,
    })
}

/// Account set shared by the three family cranks. Each handler pins the
/// scheduler and registry to its own family; the tick is scoped to one
/// pool.
#[derive(Accounts)]
pub struct CrankOrders<'info> {
    /// Keeper holding the operator role.
    pub keeper: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [SCHEDULER_SEED, &[scheduler.family.seed()]],
        bump = scheduler.bump,
    )]
    pub scheduler: Account<'info, SchedulerState>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &[registry.family.seed()]],
        bump = registry.bump,
        constraint = registry.family == scheduler.family @ ErrorCode::OrderFamilyMismatch,
    )]
    pub registry: Account<'info, OrderRegistry>,

    #[account(
        mut,
        has_one = vault_0,
        has_one = vault_1,
        constraint = pool.is_active @ ErrorCode::PoolNotActive,
    )]
    pub pool: Account<'info, Pool>,

    /// CHECK: PDA derived from the pool key; never read or written.
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump = pool.authority_bump)]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub vault_0: Account<'info, TokenAccount>,
    #[account(mut)]
    pub vault_1: Account<'info, TokenAccount>,

    /// CHECK: PDA derived from a fixed seed; never read or written.
    #[account(seeds = [ENGINE_AUTHORITY_SEED], bump = config.engine_authority_bump)]
    pub engine_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

impl<'info> CrankOrders<'info> {
    /// Assemble the shared swap account set for one candidate order. The
    /// borrow of `self` ends with the swap, freeing the registry for the
    /// post-swap bookkeeping.
    fn order_swap_accounts<'a>(
        &'a mut self,
        escrow: &AccountInfo<'info>,
        recipient: &AccountInfo<'info>,
        input_is_0: bool,
    ) -> OrderSwapAccounts<'a, 'info> {
        let (vault_in, vault_out) = if input_is_0 {
            (self.vault_0.to_account_info(), self.vault_1.to_account_info())
        } else {
            (self.vault_1.to_account_info(), self.vault_0.to_account_info())
        };
        OrderSwapAccounts {
            pool: &mut self.pool,
            escrow: escrow.clone(),
            vault_in,
            vault_out,
            recipient: recipient.clone(),
            engine_authority: self.engine_authority.to_account_info(),
            pool_authority: self.pool_authority.to_account_info(),
            token_program: &self.token_program,
        }
    }
}

#[derive(Default)]
struct TickTally {
    seen: u64,
    executed: u64,
    skipped: u64,
}

/// Guard prologue common to every crank: pause switch, operator role,
/// family pinning, scheduler arming, then the lock.
fn begin_tick<'info>(
    config: &mut Account<'info, Config>,
    scheduler: &Account<'info, SchedulerState>,
    keeper: &Pubkey,
    family: OrderFamily,
) -> Result<()> {
    require!(!config.paused, ErrorCode::EnginePaused);
    config.require_role(Role::Operator, keeper)?;
    require!(scheduler.family == family, ErrorCode::OrderFamilyMismatch);
    require!(scheduler.enabled, ErrorCode::SchedulerDisabled);
    Lock::acquire(&mut config.lock)
}

/// Close out a tick: advance the scheduler (auto-halting at its budget),
/// emit the tick event and release the lock.
fn finish_tick<'info>(
    config: &mut Account<'info, Config>,
    scheduler: &mut Account<'info, SchedulerState>,
    tally: &TickTally,
    now: i64,
) -> Result<()> {
    scheduler.complete_tick(tally.executed, now)?;
    emit!(TickCompleted {
        family: scheduler.family,
        cycle: scheduler.cycle_counter,
        orders_seen: tally.seen,
        orders_executed: tally.executed,
        orders_skipped: tally.skipped,
        halted: !scheduler.enabled,
        timestamp: now,
    });
    Lock::release(&mut config.lock)
}

/// Recipient accounts come out of `remaining_accounts` untyped; they must
/// belong to the order's owner and carry its output mint.
fn check_recipient<'info>(
    recipient_info: &'info AccountInfo<'info>,
    owner: &Pubkey,
    token_out: &Pubkey,
) -> Result<()> {
    let recipient: Account<'info, TokenAccount> = Account::try_from(recipient_info)?;
    require!(
        recipient.owner == *owner && recipient.mint == *token_out,
        ErrorCode::OrderNotInRegistry
    );
    Ok(())
}

/// One scheduler tick over limit orders. `remaining_accounts` carries
/// (order, escrow, recipient) triples for candidate orders of this pool.
pub fn crank_limit_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, CrankOrders<'info>>,
) -> Result<()> {
    begin_tick(
        &mut ctx.accounts.config,
        &ctx.accounts.scheduler,
        &ctx.accounts.keeper.key(),
        OrderFamily::Limit,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let engine_authority_bump = ctx.accounts.config.engine_authority_bump;
    let mut tally = TickTally::default();

    for triple in ctx.remaining_accounts.chunks(3) {
        let [order_info, escrow_info, recipient_info] = triple else {
            return Err(ErrorCode::OrderNotInRegistry.into());
        };
        let mut order: Account<'info, LimitOrder> = Account::try_from(order_info)?;
        require!(order.pool == pool_key, ErrorCode::TokenNotInPool);
        require!(
            order.escrow == escrow_info.key(),
            ErrorCode::OrderNotInRegistry
        );
        tally.seen += 1;

        if order.status != OrderStatus::Active {
            tally.skipped += 1;
            continue;
        }
        if now >= order.expiry_time {
            order.mark_expired()?;
            ctx.accounts
                .registry
                .set_status(order.id, OrderStatus::Expired)?;
            order.exit(&crate::ID)?;
            tally.skipped += 1;
            continue;
        }

        let input_is_0 = ctx.accounts.pool.input_is_0(&order.token_in)?;
        let spot = ctx.accounts.pool.spot_price_for(input_is_0)?;
        let eval_price = if order.use_twap {
            match ctx.accounts.pool.twap_price_for(input_is_0, TWAP_WINDOW, now) {
                Ok(price) => price,
                Err(_) => {
                    tally.skipped += 1;
                    continue;
                }
            }
        } else {
            spot
        };
        if !limit_order_eligible(&order, eval_price, now) {
            tally.skipped += 1;
            continue;
        }
        check_recipient(recipient_info, &order.owner, &order.token_out)?;

        // Everything that can reject this order is checked before the CPIs.
        let plan = plan_limit_fill(&order, 0)?;
        let (reserve_in, reserve_out) = ctx.accounts.pool.reserves_for(input_is_0);
        let Ok(quoted) = quote_out(
            plan.amount_in,
            reserve_in,
            reserve_out,
            ctx.accounts.pool.fee_bps,
        ) else {
            tally.skipped += 1;
            continue;
        };
        if quoted < plan.min_amount_out
            || !fill_within_slippage(spot, plan.amount_in, quoted, order.max_slippage_bps)?
        {
            tally.skipped += 1;
            continue;
        }

        let mut swap_accounts =
            ctx.accounts
                .order_swap_accounts(escrow_info, recipient_info, input_is_0);
        let amount_out = run_order_swap(
            &mut swap_accounts,
            engine_authority_bump,
            order.owner,
            input_is_0,
            plan.amount_in,
            plan.min_amount_out,
            now,
        )?;

        order.apply_fill(plan.amount_in)?;
        ctx.accounts.registry.set_status(order.id, order.status)?;
        tally.executed += 1;

        emit!(OrderExecuted {
            family: OrderFamily::Limit,
            order_id: order.id,
            pool: pool_key,
            amount_in: plan.amount_in,
            amount_out,
            new_status: order.status,
            timestamp: now,
        });

        order.exit(&crate::ID)?;
    }

    finish_tick(
        &mut ctx.accounts.config,
        &mut ctx.accounts.scheduler,
        &tally,
        now,
    )
}

/// One scheduler tick over recurring orders.
pub fn crank_recurring_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, CrankOrders<'info>>,
) -> Result<()> {
    begin_tick(
        &mut ctx.accounts.config,
        &ctx.accounts.scheduler,
        &ctx.accounts.keeper.key(),
        OrderFamily::Recurring,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let engine_authority_bump = ctx.accounts.config.engine_authority_bump;
    let mut tally = TickTally::default();

    for triple in ctx.remaining_accounts.chunks(3) {
        let [order_info, escrow_info, recipient_info] = triple else {
            return Err(ErrorCode::OrderNotInRegistry.into());
        };
        let mut order: Account<'info, RecurringOrder> = Account::try_from(order_info)?;
        require!(order.pool == pool_key, ErrorCode::TokenNotInPool);
        require!(
            order.escrow == escrow_info.key(),
            ErrorCode::OrderNotInRegistry
        );
        tally.seen += 1;

        let input_is_0 = ctx.accounts.pool.input_is_0(&order.token_in)?;
        let current_price = ctx.accounts.pool.spot_price_for(input_is_0)?;
        if !recurring_order_eligible(&order, current_price, now)? {
            tally.skipped += 1;
            continue;
        }
        check_recipient(recipient_info, &order.owner, &order.token_out)?;

        let amount_in = order.amount_per_execution;
        let (reserve_in, reserve_out) = ctx.accounts.pool.reserves_for(input_is_0);
        let Ok(quoted) = quote_out(amount_in, reserve_in, reserve_out, ctx.accounts.pool.fee_bps)
        else {
            tally.skipped += 1;
            continue;
        };
        if quoted < order.min_amount_out {
            tally.skipped += 1;
            continue;
        }

        let mut swap_accounts =
            ctx.accounts
                .order_swap_accounts(escrow_info, recipient_info, input_is_0);
        let amount_out = run_order_swap(
            &mut swap_accounts,
            engine_authority_bump,
            order.owner,
            input_is_0,
            amount_in,
            order.min_amount_out,
            now,
        )?;

        order.apply_execution(fill_price(amount_in, amount_out)?, now)?;
        ctx.accounts.registry.set_status(order.id, order.status)?;
        tally.executed += 1;

        emit!(OrderExecuted {
            family: OrderFamily::Recurring,
            order_id: order.id,
            pool: pool_key,
            amount_in,
            amount_out,
            new_status: order.status,
            timestamp: now,
        });

        order.exit(&crate::ID)?;
    }

    finish_tick(
        &mut ctx.accounts.config,
        &mut ctx.accounts.scheduler,
        &tally,
        now,
    )
}

/// One scheduler tick over grid orders. Every eligible level of every
/// candidate order fires, one swap per level.
pub fn crank_grid_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, CrankOrders<'info>>,
) -> Result<()> {
    begin_tick(
        &mut ctx.accounts.config,
        &ctx.accounts.scheduler,
        &ctx.accounts.keeper.key(),
        OrderFamily::Grid,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let engine_authority_bump = ctx.accounts.config.engine_authority_bump;
    let mut tally = TickTally::default();

    for triple in ctx.remaining_accounts.chunks(3) {
        let [order_info, escrow_info, recipient_info] = triple else {
            return Err(ErrorCode::OrderNotInRegistry.into());
        };
        let mut order: Account<'info, GridOrder> = Account::try_from(order_info)?;
        require!(order.pool == pool_key, ErrorCode::TokenNotInPool);
        require!(
            order.escrow == escrow_info.key(),
            ErrorCode::OrderNotInRegistry
        );
        tally.seen += 1;

        if !grid_order_live(&order, now) {
            tally.skipped += 1;
            continue;
        }
        check_recipient(recipient_info, &order.owner, &order.token_out)?;

        let input_is_0 = ctx.accounts.pool.input_is_0(&order.token_in)?;
        let mut fired_any = false;
        for index in 0..order.levels.len() {
            // Price moves as earlier levels execute; each level re-reads it.
            let current_price = ctx.accounts.pool.spot_price_for(input_is_0)?;
            let level = order.levels[index];
            if !grid_level_eligible(&level, order.direction, order.entry_price, current_price)? {
                continue;
            }
            let (reserve_in, reserve_out) = ctx.accounts.pool.reserves_for(input_is_0);
            if quote_out(level.amount, reserve_in, reserve_out, ctx.accounts.pool.fee_bps).is_err()
            {
                continue;
            }

            let mut swap_accounts =
                ctx.accounts
                    .order_swap_accounts(escrow_info, recipient_info, input_is_0);
            let amount_out = run_order_swap(
                &mut swap_accounts,
                engine_authority_bump,
                order.owner,
                input_is_0,
                level.amount,
                1,
                now,
            )?;

            order.apply_level_execution(index)?;
            fired_any = true;
            tally.executed += 1;

            emit!(OrderExecuted {
                family: OrderFamily::Grid,
                order_id: order.id,
                pool: pool_key,
                amount_in: level.amount,
                amount_out,
                new_status: order.status,
                timestamp: now,
            });
        }

        if fired_any {
            ctx.accounts.registry.set_status(order.id, order.status)?;
            order.exit(&crate::ID)?;
        } else {
            tally.skipped += 1;
        }
    }

    finish_tick(
        &mut ctx.accounts.config,
        &mut ctx.accounts.scheduler,
        &tally,
        now,
    )
}
