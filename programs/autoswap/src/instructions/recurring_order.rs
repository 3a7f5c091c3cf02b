//! Recurring order lifecycle: creation (DCA and trigger strategies),
//! pause/resume, cancellation with refund of the unspent budget, and
//! keeper-path execution.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{
    CONFIG_SEED, ENGINE_AUTHORITY_SEED, ESCROW_SEED, POOL_AUTHORITY_SEED, RECURRING_ORDER_SEED,
    REGISTRY_SEED, USER_ORDERS_SEED,
};
use crate::error::ErrorCode;
use crate::events::{OrderCancelled, OrderCreated, OrderExecuted, OrderPaused, OrderResumed};
use crate::instructions::executor::{run_order_swap, OrderSwapAccounts};
use crate::logic::eligibility::recurring_order_eligible;
use crate::state::{
    Config, ExecutionMode, Lock, OrderFamily, OrderRegistry, OrderStatus, Pool, RecurringKind,
    RecurringOrder, Role, UserOrders,
};
use crate::utils::math::fill_price;
use crate::utils::transfers::{transfer_from_user, transfer_with_authority};
use crate::utils::SafeMath;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct CreateRecurringOrderParams {
    pub kind: RecurringKind,
    pub mode: ExecutionMode,
    pub amount_per_execution: u64,
    pub min_amount_out: u64,
    /// Seconds between executions; required for interval mode.
    pub execution_interval: i64,
    /// Price deviation arming the order; required for trigger mode.
    pub trigger_percentage_bps: u16,
    pub max_executions: u32,
    pub expiry_at: i64,
}

#[derive(Accounts)]
pub struct CreateRecurringOrder<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(constraint = pool.is_active @ ErrorCode::PoolNotActive)]
    pub pool: Account<'info, Pool>,

    pub token_mint_in: Account<'info, Mint>,

    #[account(
        init,
        payer = owner,
        space = 8 + RecurringOrder::INIT_SPACE,
        seeds = [RECURRING_ORDER_SEED, &config.next_order_id.to_le_bytes()],
        bump,
    )]
    pub order: Account<'info, RecurringOrder>,

    /// Escrow funded with the full budget for all executions up front.
    #[account(
        init,
        payer = owner,
        seeds = [
            ESCROW_SEED,
            &[OrderFamily::Recurring.seed()],
            &config.next_order_id.to_le_bytes(),
        ],
        bump,
        token::mint = token_mint_in,
        token::authority = engine_authority,
    )]
    pub escrow: Account<'info, TokenAccount>,

    /// CHECK: PDA derived from a fixed seed; never read or written.
    #[account(seeds = [ENGINE_AUTHORITY_SEED], bump = config.engine_authority_bump)]
    pub engine_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = owner_token_in.owner == owner.key(),
        constraint = owner_token_in.mint == token_mint_in.key(),
    )]
    pub owner_token_in: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &[OrderFamily::Recurring.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + UserOrders::INIT_SPACE,
        seeds = [
            USER_ORDERS_SEED,
            &[OrderFamily::Recurring.seed()],
            owner.key().as_ref(),
        ],
        bump,
    )]
    pub user_orders: Account<'info, UserOrders>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn create_handler(
    ctx: Context<CreateRecurringOrder>,
    params: CreateRecurringOrderParams,
) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    require!(params.amount_per_execution > 0, ErrorCode::ZeroAmount);
    require!(params.max_executions > 0, ErrorCode::InvalidMaxExecutions);
    match params.mode {
        ExecutionMode::Interval => {
            require!(params.execution_interval > 0, ErrorCode::InvalidInterval)
        }
        ExecutionMode::Trigger => {
            require!(
                params.kind != RecurringKind::Dca,
                ErrorCode::InvalidTriggerPercentage
            );
            require!(
                params.trigger_percentage_bps > 0,
                ErrorCode::InvalidTriggerPercentage
            );
        }
    }
    let now = Clock::get()?.unix_timestamp;
    require!(params.expiry_at > now, ErrorCode::InvalidExpiry);

    let input_is_0 = ctx.accounts.pool.input_is_0(&ctx.accounts.token_mint_in.key())?;
    let token_out = if input_is_0 {
        ctx.accounts.pool.token_mint_1
    } else {
        ctx.accounts.pool.token_mint_0
    };
    let entry_price = ctx.accounts.pool.spot_price_for(input_is_0)?;
    let escrow_total = params
        .amount_per_execution
        .safe_mul(u64::from(params.max_executions))?;

    Lock::acquire(&mut config.lock)?;
    let id = ctx.accounts.config.allocate_order_id()?;

    transfer_from_user(
        &ctx.accounts.owner_token_in,
        &ctx.accounts.escrow,
        &ctx.accounts.owner,
        &ctx.accounts.token_program,
        escrow_total,
    )?;

    let order = &mut ctx.accounts.order;
    order.id = id;
    order.owner = ctx.accounts.owner.key();
    order.pool = ctx.accounts.pool.key();
    order.token_in = ctx.accounts.token_mint_in.key();
    order.token_out = token_out;
    order.escrow = ctx.accounts.escrow.key();
    order.kind = params.kind;
    order.mode = params.mode;
    order.amount_per_execution = params.amount_per_execution;
    order.min_amount_out = params.min_amount_out;
    order.execution_interval = params.execution_interval;
    order.trigger_percentage_bps = params.trigger_percentage_bps;
    order.max_executions = params.max_executions;
    order.execution_count = 0;
    order.entry_price = entry_price;
    order.reference_price = entry_price;
    // Interval eligibility counts from creation, so the first execution
    // waits one full interval.
    order.last_executed_time = now;
    order.created_time = now;
    order.expiry_at = params.expiry_at;
    order.status = OrderStatus::Active;
    order.bump = ctx.bumps.order;

    ctx.accounts
        .registry
        .insert(id, ctx.accounts.owner.key(), ctx.accounts.pool.key())?;

    let user_orders = &mut ctx.accounts.user_orders;
    if user_orders.owner == Pubkey::default() {
        user_orders.owner = ctx.accounts.owner.key();
        user_orders.family = OrderFamily::Recurring;
        user_orders.bump = ctx.bumps.user_orders;
    }
    user_orders.push(id, &ctx.accounts.registry)?;

    emit!(OrderCreated {
        family: OrderFamily::Recurring,
        order_id: id,
        owner: ctx.accounts.owner.key(),
        pool: ctx.accounts.pool.key(),
        token_in: ctx.accounts.token_mint_in.key(),
        token_out,
        escrowed_amount: escrow_total,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct UpdateRecurringOrder<'info> {
    pub owner: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        has_one = owner,
        seeds = [RECURRING_ORDER_SEED, &order.id.to_le_bytes()],
        bump = order.bump,
    )]
    pub order: Account<'info, RecurringOrder>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &[OrderFamily::Recurring.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,
}

pub fn pause_handler(ctx: Context<UpdateRecurringOrder>) -> Result<()> {
    Lock::acquire(&mut ctx.accounts.config.lock)?;
    let order = &mut ctx.accounts.order;
    order.pause()?;
    let order_id = order.id;
    ctx.accounts.registry.set_status(order_id, OrderStatus::Paused)?;
    emit!(OrderPaused {
        order_id,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

pub fn resume_handler(ctx: Context<UpdateRecurringOrder>) -> Result<()> {
    Lock::acquire(&mut ctx.accounts.config.lock)?;
    let order = &mut ctx.accounts.order;
    order.resume()?;
    let order_id = order.id;
    ctx.accounts.registry.set_status(order_id, OrderStatus::Active)?;
    emit!(OrderResumed {
        order_id,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct CancelRecurringOrder<'info> {
    pub owner: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        has_one = owner,
        has_one = escrow,
        seeds = [RECURRING_ORDER_SEED, &order.id.to_le_bytes()],
        bump = order.bump,
    )]
    pub order: Account<'info, RecurringOrder>,

    #[account(mut)]
    pub escrow: Account<'info, TokenAccount>,

    /// CHECK: PDA derived from a fixed seed; never read or written.
    #[account(seeds = [ENGINE_AUTHORITY_SEED], bump = config.engine_authority_bump)]
    pub engine_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = owner_token_in.owner == owner.key(),
        constraint = owner_token_in.mint == order.token_in,
    )]
    pub owner_token_in: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &[OrderFamily::Recurring.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,

    pub token_program: Program<'info, Token>,
}

pub fn cancel_handler(ctx: Context<CancelRecurringOrder>) -> Result<()> {
    Lock::acquire(&mut ctx.accounts.config.lock)?;

    let order = &mut ctx.accounts.order;
    order.cancel()?;
    let refund = order.remaining_budget()?;
    let order_id = order.id;

    if refund > 0 {
        let engine_seeds: &[&[&[u8]]] = &[&[
            ENGINE_AUTHORITY_SEED,
            &[ctx.accounts.config.engine_authority_bump],
        ]];
        transfer_with_authority(
            ctx.accounts.escrow.to_account_info(),
            ctx.accounts.owner_token_in.to_account_info(),
            ctx.accounts.engine_authority.to_account_info(),
            &ctx.accounts.token_program,
            engine_seeds,
            refund,
        )?;
    }

    ctx.accounts
        .registry
        .note_status(order_id, OrderStatus::Cancelled);

    emit!(OrderCancelled {
        family: OrderFamily::Recurring,
        order_id,
        refunded_amount: refund,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct ExecuteRecurringOrder<'info> {
    /// Keeper holding the operator role.
    pub keeper: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

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

    #[account(
        mut,
        has_one = pool,
        has_one = escrow,
        seeds = [RECURRING_ORDER_SEED, &order.id.to_le_bytes()],
        bump = order.bump,
    )]
    pub order: Account<'info, RecurringOrder>,

    #[account(mut)]
    pub escrow: Account<'info, TokenAccount>,

    /// CHECK: PDA derived from a fixed seed; never read or written.
    #[account(seeds = [ENGINE_AUTHORITY_SEED], bump = config.engine_authority_bump)]
    pub engine_authority: UncheckedAccount<'info>,

    /// The owner's account for the output token.
    #[account(
        mut,
        constraint = recipient.owner == order.owner,
        constraint = recipient.mint == order.token_out,
    )]
    pub recipient: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &[OrderFamily::Recurring.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,

    pub token_program: Program<'info, Token>,
}

pub fn execute_handler(ctx: Context<ExecuteRecurringOrder>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    config.require_role(Role::Operator, &ctx.accounts.keeper.key())?;

    Lock::acquire(&mut config.lock)?;

    let now = Clock::get()?.unix_timestamp;
    let order = &ctx.accounts.order;
    let input_is_0 = ctx.accounts.pool.input_is_0(&order.token_in)?;
    let current_price = ctx.accounts.pool.spot_price_for(input_is_0)?;
    require!(
        recurring_order_eligible(order, current_price, now)?,
        ErrorCode::OrderNotEligible
    );

    let amount_in = order.amount_per_execution;
    let min_amount_out = order.min_amount_out;
    let owner = order.owner;

    let (vault_in, vault_out) = if input_is_0 {
        (&ctx.accounts.vault_0, &ctx.accounts.vault_1)
    } else {
        (&ctx.accounts.vault_1, &ctx.accounts.vault_0)
    };
    let mut swap_accounts = OrderSwapAccounts {
        pool: &mut ctx.accounts.pool,
        escrow: ctx.accounts.escrow.to_account_info(),
        vault_in: vault_in.to_account_info(),
        vault_out: vault_out.to_account_info(),
        recipient: ctx.accounts.recipient.to_account_info(),
        engine_authority: ctx.accounts.engine_authority.to_account_info(),
        pool_authority: ctx.accounts.pool_authority.to_account_info(),
        token_program: &ctx.accounts.token_program,
    };
    let amount_out = run_order_swap(
        &mut swap_accounts,
        ctx.accounts.config.engine_authority_bump,
        owner,
        input_is_0,
        amount_in,
        min_amount_out,
        now,
    )?;

    let order = &mut ctx.accounts.order;
    order.apply_execution(fill_price(amount_in, amount_out)?, now)?;
    let order_id = order.id;
    let new_status = order.status;
    ctx.accounts.registry.set_status(order_id, new_status)?;

    emit!(OrderExecuted {
        family: OrderFamily::Recurring,
        order_id,
        pool: ctx.accounts.pool.key(),
        amount_in,
        amount_out,
        new_status,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}
