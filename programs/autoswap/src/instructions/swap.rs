//! User-initiated exact-input swap against a pool.
//!
//! Phase ordering is fixed: validate, acquire the lock, advance the price
//! accumulators, quote, move tokens, apply the reserve deltas under the
//! constant-product re-check, record an oracle snapshot, emit, release.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, POOL_AUTHORITY_SEED};
use crate::error::ErrorCode;
use crate::events::SwapExecuted;
use crate::state::{Config, Lock, Pool};
use crate::utils::math::quote_out;
use crate::utils::transfers::{transfer_from_user, transfer_with_authority};

#[derive(Accounts)]
pub struct Swap<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

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

    #[account(mut, constraint = user_token_in.owner == user.key())]
    pub user_token_in: Account<'info, TokenAccount>,
    #[account(mut, constraint = user_token_out.owner == user.key())]
    pub user_token_out: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(
    ctx: Context<Swap>,
    amount_in: u64,
    min_amount_out: u64,
    deadline: i64,
) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    require!(amount_in > 0, ErrorCode::ZeroAmount);
    let now = Clock::get()?.unix_timestamp;
    require!(now <= deadline, ErrorCode::DeadlinePassed);

    let input_is_0 = ctx.accounts.pool.input_is_0(&ctx.accounts.user_token_in.mint)?;
    require!(
        ctx.accounts
            .pool
            .input_is_0(&ctx.accounts.user_token_out.mint)?
            != input_is_0,
        ErrorCode::TokenNotInPool
    );

    Lock::acquire(&mut config.lock)?;

    let pool = &mut ctx.accounts.pool;
    pool.advance_accumulators(now)?;

    let (reserve_in, reserve_out) = pool.reserves_for(input_is_0);
    let amount_out = quote_out(amount_in, reserve_in, reserve_out, pool.fee_bps)?;
    require!(amount_out >= min_amount_out, ErrorCode::SlippageExceeded);

    pool.apply_swap(amount_in, amount_out, input_is_0)?;
    pool.record_observation(now);
    let spot_price_after = pool.spot_price_for(input_is_0)?;
    let fee_bps = pool.fee_bps;

    let (vault_in, vault_out) = if input_is_0 {
        (&ctx.accounts.vault_0, &ctx.accounts.vault_1)
    } else {
        (&ctx.accounts.vault_1, &ctx.accounts.vault_0)
    };

    transfer_from_user(
        &ctx.accounts.user_token_in,
        vault_in,
        &ctx.accounts.user,
        &ctx.accounts.token_program,
        amount_in,
    )?;

    let pool_key = ctx.accounts.pool.key();
    let authority_seeds: &[&[&[u8]]] = &[&[
        POOL_AUTHORITY_SEED,
        pool_key.as_ref(),
        &[ctx.accounts.pool.authority_bump],
    ]];
    transfer_with_authority(
        vault_out.to_account_info(),
        ctx.accounts.user_token_out.to_account_info(),
        ctx.accounts.pool_authority.to_account_info(),
        &ctx.accounts.token_program,
        authority_seeds,
        amount_out,
    )?;

    emit!(SwapExecuted {
        pool: pool_key,
        user: ctx.accounts.user.key(),
        token_in: ctx.accounts.user_token_in.mint,
        token_out: ctx.accounts.user_token_out.mint,
        amount_in,
        amount_out,
        fee_bps,
        spot_price_after,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}
