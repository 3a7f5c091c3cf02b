//! Pool creation: one pool per canonical token pair, seeded with initial
//! liquidity from the creator.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{
    CONFIG_SEED, LP_DECIMALS, LP_MINT_SEED, MIN_LIQUIDITY, POOL_AUTHORITY_SEED, POOL_SEED,
    VAULT_SEED,
};
use crate::error::ErrorCode;
use crate::events::PoolCreated;
use crate::state::{require_canonical_pair, Config, Lock, Observation, Pool};
use crate::utils::math::isqrt;
use crate::utils::transfers::{mint_lp, transfer_from_user};
use crate::utils::SafeMath;

#[derive(Accounts)]
pub struct CreatePool<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    /// Token 0 of the pair; must order below `token_mint_1` by byte value.
    pub token_mint_0: Account<'info, Mint>,
    pub token_mint_1: Account<'info, Mint>,

    #[account(
        init,
        payer = creator,
        space = 8 + Pool::INIT_SPACE,
        seeds = [POOL_SEED, token_mint_0.key().as_ref(), token_mint_1.key().as_ref()],
        bump,
    )]
    pub pool: Account<'info, Pool>,

    /// Signs vault outflows and LP mints for this pool.
    /// CHECK: PDA derived from the pool key; never read or written.
    #[account(seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()], bump)]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = creator,
        seeds = [VAULT_SEED, pool.key().as_ref(), token_mint_0.key().as_ref()],
        bump,
        token::mint = token_mint_0,
        token::authority = pool_authority,
    )]
    pub vault_0: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = creator,
        seeds = [VAULT_SEED, pool.key().as_ref(), token_mint_1.key().as_ref()],
        bump,
        token::mint = token_mint_1,
        token::authority = pool_authority,
    )]
    pub vault_1: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = creator,
        seeds = [LP_MINT_SEED, pool.key().as_ref()],
        bump,
        mint::decimals = LP_DECIMALS,
        mint::authority = pool_authority,
    )]
    pub lp_mint: Account<'info, Mint>,

    #[account(mut, constraint = creator_token_0.owner == creator.key())]
    pub creator_token_0: Account<'info, TokenAccount>,

    #[account(mut, constraint = creator_token_1.owner == creator.key())]
    pub creator_token_1: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = creator,
        token::mint = lp_mint,
        token::authority = creator,
    )]
    pub creator_lp: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreatePool>, amount_0: u64, amount_1: u64, fee_bps: u16) -> Result<()> {
    let config = &mut ctx.accounts.config;
    require!(!config.paused, ErrorCode::EnginePaused);
    require_canonical_pair(
        &ctx.accounts.token_mint_0.key(),
        &ctx.accounts.token_mint_1.key(),
    )?;
    require!(amount_0 > 0 && amount_1 > 0, ErrorCode::ZeroAmount);
    require!(
        (crate::constants::MIN_FEE_BPS..=crate::constants::MAX_FEE_BPS).contains(&fee_bps),
        ErrorCode::InvalidFeeBps
    );

    // The geometric mean makes the initial LP grant independent of how the
    // creator denominates the two deposits.
    let lp_total = isqrt(amount_0, amount_1)?;
    require!(
        lp_total > MIN_LIQUIDITY,
        ErrorCode::InsufficientInitialLiquidity
    );
    let lp_to_creator = lp_total.safe_sub(MIN_LIQUIDITY)?;

    Lock::acquire(&mut config.lock)?;

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let pool = &mut ctx.accounts.pool;
    pool.token_mint_0 = ctx.accounts.token_mint_0.key();
    pool.token_mint_1 = ctx.accounts.token_mint_1.key();
    pool.vault_0 = ctx.accounts.vault_0.key();
    pool.vault_1 = ctx.accounts.vault_1.key();
    pool.lp_mint = ctx.accounts.lp_mint.key();
    pool.reserve_0 = amount_0;
    pool.reserve_1 = amount_1;
    // MIN_LIQUIDITY stays in the supply forever without a holder.
    pool.total_lp_supply = lp_total;
    pool.fee_bps = fee_bps;
    pool.is_active = true;
    pool.last_update_time = now;
    pool.cumulative_price_0 = 0;
    pool.cumulative_price_1 = 0;
    pool.observations = [Observation::default(); crate::constants::OBSERVATION_COUNT];
    pool.observation_index = 0;
    pool.observation_count = 0;
    pool.bump = ctx.bumps.pool;
    pool.authority_bump = ctx.bumps.pool_authority;
    pool.record_observation(now);

    transfer_from_user(
        &ctx.accounts.creator_token_0,
        &ctx.accounts.vault_0,
        &ctx.accounts.creator,
        &ctx.accounts.token_program,
        amount_0,
    )?;
    transfer_from_user(
        &ctx.accounts.creator_token_1,
        &ctx.accounts.vault_1,
        &ctx.accounts.creator,
        &ctx.accounts.token_program,
        amount_1,
    )?;

    let authority_seeds: &[&[&[u8]]] = &[&[
        POOL_AUTHORITY_SEED,
        pool_key.as_ref(),
        &[ctx.accounts.pool.authority_bump],
    ]];
    mint_lp(
        ctx.accounts.lp_mint.to_account_info(),
        ctx.accounts.creator_lp.to_account_info(),
        ctx.accounts.pool_authority.to_account_info(),
        &ctx.accounts.token_program,
        authority_seeds,
        lp_to_creator,
    )?;

    emit!(PoolCreated {
        pool: pool_key,
        token_mint_0: ctx.accounts.token_mint_0.key(),
        token_mint_1: ctx.accounts.token_mint_1.key(),
        amount_0,
        amount_1,
        lp_minted: lp_to_creator,
        fee_bps,
        timestamp: now,
    });

    Lock::release(&mut ctx.accounts.config.lock)
}
