//! Liquidity provision: proportional deposits for LP tokens and pro-rata
//! withdrawals against LP burns.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{CONFIG_SEED, POOL_AUTHORITY_SEED};
use crate::error::ErrorCode;
use crate::events::{LiquidityAdded, LiquidityRemoved};
use crate::state::{Config, Lock, Pool};
use crate::utils::transfers::{burn_lp, mint_lp, transfer_from_user, transfer_with_authority};
use crate::utils::SafeMath;

#[derive(Accounts)]
pub struct ModifyLiquidity<'info> {
    #[account(mut)]
    pub provider: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        has_one = vault_0,
        has_one = vault_1,
        has_one = lp_mint,
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
    #[account(mut)]
    pub lp_mint: Account<'info, Mint>,

    #[account(mut, constraint = provider_token_0.owner == provider.key())]
    pub provider_token_0: Account<'info, TokenAccount>,
    #[account(mut, constraint = provider_token_1.owner == provider.key())]
    pub provider_token_1: Account<'info, TokenAccount>,
    #[account(mut, constraint = provider_lp.owner == provider.key())]
    pub provider_lp: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Resolve a desired deposit against the pool ratio. Returns the paired
/// amounts actually taken, favoring the side that limits first.
fn pair_deposit(
    pool: &Pool,
    amount_0_desired: u64,
    amount_1_desired: u64,
    amount_0_min: u64,
    amount_1_min: u64,
) -> Result<(u64, u64)> {
    let optimal_1 = u64::try_from(
        u128::from(amount_0_desired)
            .safe_mul(u128::from(pool.reserve_1))?
            .safe_div(u128::from(pool.reserve_0))?,
    )
    .map_err(|_| error!(ErrorCode::NumericNarrowing))?;
    if optimal_1 <= amount_1_desired {
        require!(optimal_1 >= amount_1_min, ErrorCode::SlippageExceeded);
        return Ok((amount_0_desired, optimal_1));
    }
    let optimal_0 = u64::try_from(
        u128::from(amount_1_desired)
            .safe_mul(u128::from(pool.reserve_0))?
            .safe_div(u128::from(pool.reserve_1))?,
    )
    .map_err(|_| error!(ErrorCode::NumericNarrowing))?;
    require!(optimal_0 <= amount_0_desired, ErrorCode::SlippageExceeded);
    require!(optimal_0 >= amount_0_min, ErrorCode::SlippageExceeded);
    Ok((optimal_0, amount_1_desired))
}

pub fn add_handler(
    ctx: Context<ModifyLiquidity>,
    amount_0_desired: u64,
    amount_1_desired: u64,
    amount_0_min: u64,
    amount_1_min: u64,
    deadline: i64,
) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    require!(
        amount_0_desired > 0 && amount_1_desired > 0,
        ErrorCode::ZeroAmount
    );
    let now = Clock::get()?.unix_timestamp;
    require!(now <= deadline, ErrorCode::DeadlinePassed);

    Lock::acquire(&mut config.lock)?;

    let pool = &mut ctx.accounts.pool;
    let (amount_0, amount_1) = pair_deposit(
        pool,
        amount_0_desired,
        amount_1_desired,
        amount_0_min,
        amount_1_min,
    )?;

    // LP grant is the limiting side's proportional share of the supply.
    let minted_for_0 = u128::from(amount_0)
        .safe_mul(u128::from(pool.total_lp_supply))?
        .safe_div(u128::from(pool.reserve_0))?;
    let minted_for_1 = u128::from(amount_1)
        .safe_mul(u128::from(pool.total_lp_supply))?
        .safe_div(u128::from(pool.reserve_1))?;
    let lp_minted = crate::utils::math_safe::to_u64(minted_for_0.min(minted_for_1))?;
    require!(lp_minted > 0, ErrorCode::InsufficientLiquidity);

    // Weight the pre-deposit price by its lifetime before reserves move.
    pool.advance_accumulators(now)?;
    pool.reserve_0 = pool.reserve_0.safe_add(amount_0)?;
    pool.reserve_1 = pool.reserve_1.safe_add(amount_1)?;
    pool.total_lp_supply = pool.total_lp_supply.safe_add(lp_minted)?;
    pool.record_observation(now);

    transfer_from_user(
        &ctx.accounts.provider_token_0,
        &ctx.accounts.vault_0,
        &ctx.accounts.provider,
        &ctx.accounts.token_program,
        amount_0,
    )?;
    transfer_from_user(
        &ctx.accounts.provider_token_1,
        &ctx.accounts.vault_1,
        &ctx.accounts.provider,
        &ctx.accounts.token_program,
        amount_1,
    )?;

    let pool_key = ctx.accounts.pool.key();
    let authority_seeds: &[&[&[u8]]] = &[&[
        POOL_AUTHORITY_SEED,
        pool_key.as_ref(),
        &[ctx.accounts.pool.authority_bump],
    ]];
    mint_lp(
        ctx.accounts.lp_mint.to_account_info(),
        ctx.accounts.provider_lp.to_account_info(),
        ctx.accounts.pool_authority.to_account_info(),
        &ctx.accounts.token_program,
        authority_seeds,
        lp_minted,
    )?;

    emit!(LiquidityAdded {
        pool: pool_key,
        provider: ctx.accounts.provider.key(),
        amount_0,
        amount_1,
        lp_minted,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}

pub fn remove_handler(
    ctx: Context<ModifyLiquidity>,
    lp_amount: u64,
    amount_0_min: u64,
    amount_1_min: u64,
    deadline: i64,
) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    require!(lp_amount > 0, ErrorCode::ZeroAmount);
    let now = Clock::get()?.unix_timestamp;
    require!(now <= deadline, ErrorCode::DeadlinePassed);

    Lock::acquire(&mut config.lock)?;

    let pool = &mut ctx.accounts.pool;
    // The locked MIN_LIQUIDITY share is unredeemable, so the supply can
    // never reach zero here.
    require!(
        lp_amount < pool.total_lp_supply,
        ErrorCode::InsufficientLiquidity
    );
    let amount_0 = crate::utils::math_safe::to_u64(
        u128::from(lp_amount)
            .safe_mul(u128::from(pool.reserve_0))?
            .safe_div(u128::from(pool.total_lp_supply))?,
    )?;
    let amount_1 = crate::utils::math_safe::to_u64(
        u128::from(lp_amount)
            .safe_mul(u128::from(pool.reserve_1))?
            .safe_div(u128::from(pool.total_lp_supply))?,
    )?;
    require!(
        amount_0 >= amount_0_min && amount_1 >= amount_1_min,
        ErrorCode::SlippageExceeded
    );
    require!(amount_0 > 0 || amount_1 > 0, ErrorCode::InsufficientLiquidity);

    pool.advance_accumulators(now)?;
    pool.reserve_0 = pool.reserve_0.safe_sub(amount_0)?;
    pool.reserve_1 = pool.reserve_1.safe_sub(amount_1)?;
    pool.total_lp_supply = pool.total_lp_supply.safe_sub(lp_amount)?;
    pool.record_observation(now);

    burn_lp(
        ctx.accounts.lp_mint.to_account_info(),
        ctx.accounts.provider_lp.to_account_info(),
        &ctx.accounts.provider,
        &ctx.accounts.token_program,
        lp_amount,
    )?;

    let pool_key = ctx.accounts.pool.key();
    let authority_seeds: &[&[&[u8]]] = &[&[
        POOL_AUTHORITY_SEED,
        pool_key.as_ref(),
        &[ctx.accounts.pool.authority_bump],
    ]];
    transfer_with_authority(
        ctx.accounts.vault_0.to_account_info(),
        ctx.accounts.provider_token_0.to_account_info(),
        ctx.accounts.pool_authority.to_account_info(),
        &ctx.accounts.token_program,
        authority_seeds,
        amount_0,
    )?;
    transfer_with_authority(
        ctx.accounts.vault_1.to_account_info(),
        ctx.accounts.provider_token_1.to_account_info(),
        ctx.accounts.pool_authority.to_account_info(),
        &ctx.accounts.token_program,
        authority_seeds,
        amount_1,
    )?;

    emit!(LiquidityRemoved {
        pool: pool_key,
        provider: ctx.accounts.provider.key(),
        amount_0,
        amount_1,
        lp_burned: lp_amount,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}
