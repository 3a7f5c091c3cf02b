//! Limit order lifecycle: create with escrow, keeper-path execution, and
//! cancellation with refund.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{
    CONFIG_SEED, ENGINE_AUTHORITY_SEED, ESCROW_SEED, LIMIT_ORDER_SEED, POOL_AUTHORITY_SEED,
    REGISTRY_SEED, TWAP_WINDOW, USER_ORDERS_SEED,
};
use crate::error::ErrorCode;
use crate::events::{OrderCancelled, OrderCreated, OrderExecuted};
use crate::instructions::executor::{run_order_swap, OrderSwapAccounts};
use crate::logic::fills::plan_limit_fill;
use crate::state::{
    Config, LimitOrder, Lock, OrderFamily, OrderRegistry, OrderStatus, Pool, Role, UserOrders,
};
use crate::utils::transfers::{transfer_from_user, transfer_with_authority};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct CreateLimitOrderParams {
    pub amount_in: u64,
    pub min_amount_out: u64,
    /// Units of token_out per unit of token_in, PRICE_SCALE fixed point.
    pub limit_price: u128,
    pub expiry_time: i64,
    pub min_execution_delay: i64,
    pub max_slippage_bps: u16,
    pub partial_fill_allowed: bool,
    pub use_twap: bool,
}

#[derive(Accounts)]
pub struct CreateLimitOrder<'info> {
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
        space = 8 + LimitOrder::INIT_SPACE,
        seeds = [LIMIT_ORDER_SEED, &config.next_order_id.to_le_bytes()],
        bump,
    )]
    pub order: Account<'info, LimitOrder>,

    /// Escrow holding the input budget until execution or cancellation.
    #[account(
        init,
        payer = owner,
        seeds = [
            ESCROW_SEED,
            &[OrderFamily::Limit.seed()],
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
        seeds = [REGISTRY_SEED, &[OrderFamily::Limit.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + UserOrders::INIT_SPACE,
        seeds = [
            USER_ORDERS_SEED,
            &[OrderFamily::Limit.seed()],
            owner.key().as_ref(),
        ],
        bump,
    )]
    pub user_orders: Account<'info, UserOrders>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn create_handler(ctx: Context<CreateLimitOrder>, params: CreateLimitOrderParams) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    require!(params.amount_in > 0, ErrorCode::ZeroAmount);
    require!(params.limit_price > 0, ErrorCode::InvalidPrice);
    require!(
        params.max_slippage_bps <= 10_000,
        ErrorCode::InvalidSlippageBps
    );
    let now = Clock::get()?.unix_timestamp;
    require!(params.expiry_time > now, ErrorCode::InvalidExpiry);
    require!(params.min_execution_delay >= 0, ErrorCode::InvalidInterval);

    let input_is_0 = ctx.accounts.pool.input_is_0(&ctx.accounts.token_mint_in.key())?;
    let token_out = if input_is_0 {
        ctx.accounts.pool.token_mint_1
    } else {
        ctx.accounts.pool.token_mint_0
    };

    Lock::acquire(&mut config.lock)?;
    let id = ctx.accounts.config.allocate_order_id()?;

    transfer_from_user(
        &ctx.accounts.owner_token_in,
        &ctx.accounts.escrow,
        &ctx.accounts.owner,
        &ctx.accounts.token_program,
        params.amount_in,
    )?;

    let order = &mut ctx.accounts.order;
    order.id = id;
    order.owner = ctx.accounts.owner.key();
    order.pool = ctx.accounts.pool.key();
    order.token_in = ctx.accounts.token_mint_in.key();
    order.token_out = token_out;
    order.escrow = ctx.accounts.escrow.key();
    order.amount_in = params.amount_in;
    order.min_amount_out = params.min_amount_out;
    order.limit_price = params.limit_price;
    order.created_time = now;
    order.expiry_time = params.expiry_time;
    order.min_execution_delay = params.min_execution_delay;
    order.max_slippage_bps = params.max_slippage_bps;
    order.partial_fill_allowed = params.partial_fill_allowed;
    order.use_twap = params.use_twap;
    order.status = OrderStatus::Active;
    order.executed_amount = 0;
    order.remaining_amount = params.amount_in;
    order.bump = ctx.bumps.order;

    ctx.accounts
        .registry
        .insert(id, ctx.accounts.owner.key(), ctx.accounts.pool.key())?;

    let user_orders = &mut ctx.accounts.user_orders;
    if user_orders.owner == Pubkey::default() {
        user_orders.owner = ctx.accounts.owner.key();
        user_orders.family = OrderFamily::Limit;
        user_orders.bump = ctx.bumps.user_orders;
    }
    user_orders.push(id, &ctx.accounts.registry)?;

    emit!(OrderCreated {
        family: OrderFamily::Limit,
        order_id: id,
        owner: ctx.accounts.owner.key(),
        pool: ctx.accounts.pool.key(),
        token_in: ctx.accounts.token_mint_in.key(),
        token_out,
        escrowed_amount: params.amount_in,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct CancelLimitOrder<'info> {
    pub owner: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        has_one = owner,
        has_one = escrow,
        seeds = [LIMIT_ORDER_SEED, &order.id.to_le_bytes()],
        bump = order.bump,
    )]
    pub order: Account<'info, LimitOrder>,

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
        seeds = [REGISTRY_SEED, &[OrderFamily::Limit.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,

    pub token_program: Program<'info, Token>,
}

pub fn cancel_handler(ctx: Context<CancelLimitOrder>) -> Result<()> {
    Lock::acquire(&mut ctx.accounts.config.lock)?;

    let now = Clock::get()?.unix_timestamp;
    let order = &mut ctx.accounts.order;
    // Expired orders keep their status; cancellation then only reclaims
    // the escrow.
    match order.status {
        OrderStatus::Active => order.cancel()?,
        OrderStatus::Expired => {}
        _ => return Err(ErrorCode::OrderNotActive.into()),
    }
    // remaining_amount stays on the record; the terminal status marks the
    // escrow as reclaimed.
    let refund = order.remaining_amount;

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

    let order_id = ctx.accounts.order.id;
    let status = ctx.accounts.order.status;
    // The entry may already have been pruned as terminal; the refund must
    // not depend on it.
    ctx.accounts.registry.note_status(order_id, status);

    emit!(OrderCancelled {
        family: OrderFamily::Limit,
        order_id,
        refunded_amount: refund,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct ExecuteLimitOrder<'info> {
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
        seeds = [LIMIT_ORDER_SEED, &order.id.to_le_bytes()],
        bump = order.bump,
    )]
    pub order: Account<'info, LimitOrder>,

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
        seeds = [REGISTRY_SEED, &[OrderFamily::Limit.seed()]],
        bump = registry.bump,
    )]
    pub registry: Account<'info, OrderRegistry>,

    pub token_program: Program<'info, Token>,
}

/// `fill_amount == 0` requests the full remaining budget; anything smaller
/// is a partial fill and requires the order to allow them.
pub fn execute_handler(ctx: Context<ExecuteLimitOrder>, fill_amount: u64) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    config.require_role(Role::Operator, &ctx.accounts.keeper.key())?;

    Lock::acquire(&mut config.lock)?;

    let now = Clock::get()?.unix_timestamp;
    let order = &ctx.accounts.order;
    require!(order.status == OrderStatus::Active, ErrorCode::OrderNotActive);
    require!(now < order.expiry_time, ErrorCode::OrderExpired);
    require!(
        now - order.created_time >= order.min_execution_delay,
        ErrorCode::ExecutionDelayNotElapsed
    );

    let input_is_0 = ctx.accounts.pool.input_is_0(&order.token_in)?;
    let spot = ctx.accounts.pool.spot_price_for(input_is_0)?;
    let eval_price = if order.use_twap {
        ctx.accounts.pool.twap_price_for(input_is_0, TWAP_WINDOW, now)?
    } else {
        spot
    };
    require!(eval_price >= order.limit_price, ErrorCode::OrderNotEligible);

    let plan = plan_limit_fill(order, fill_amount)?;
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
        plan.amount_in,
        plan.min_amount_out,
        now,
    )?;

    require!(
        crate::logic::eligibility::fill_within_slippage(
            spot,
            plan.amount_in,
            amount_out,
            ctx.accounts.order.max_slippage_bps,
        )?,
        ErrorCode::FillSlippageExceeded
    );

    let order = &mut ctx.accounts.order;
    order.apply_fill(plan.amount_in)?;
    let order_id = order.id;
    let new_status = order.status;
    ctx.accounts.registry.set_status(order_id, new_status)?;

    emit!(OrderExecuted {
        family: OrderFamily::Limit,
        order_id,
        pool: ctx.accounts.pool.key(),
        amount_in: plan.amount_in,
        amount_out,
        new_status,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}
