//! Order-driven swap execution shared by the keeper entry points and the
//! scheduler cranks.
//!
//! The input side comes from the order's escrow (signed by the engine
//! authority PDA) and the output goes straight to the owner's recipient
//! account (signed by the pool authority PDA). The accounts arrive as raw
//! `AccountInfo`s because crank ticks pull them out of
//! `remaining_accounts`.

use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::{ENGINE_AUTHORITY_SEED, POOL_AUTHORITY_SEED};
use crate::error::ErrorCode;
use crate::events::SwapExecuted;
use crate::state::Pool;
use crate::utils::math::quote_out;
use crate::utils::transfers::transfer_with_authority;

pub struct OrderSwapAccounts<'a, 'info> {
    pub pool: &'a mut Account<'info, Pool>,
    pub escrow: AccountInfo<'info>,
    pub vault_in: AccountInfo<'info>,
    pub vault_out: AccountInfo<'info>,
    pub recipient: AccountInfo<'info>,
    pub engine_authority: AccountInfo<'info>,
    pub pool_authority: AccountInfo<'info>,
    pub token_program: &'a Program<'info, Token>,
}

/// Swap `amount_in` escrowed units through the pool on behalf of an order
/// owner. Returns the output amount delivered to the recipient.
pub fn run_order_swap(
    accounts: &mut OrderSwapAccounts<'_, '_>,
    engine_authority_bump: u8,
    owner: Pubkey,
    input_is_0: bool,
    amount_in: u64,
    min_amount_out: u64,
    now: i64,
) -> Result<u64> {
    let pool = &mut *accounts.pool;
    pool.advance_accumulators(now)?;

    let (reserve_in, reserve_out) = pool.reserves_for(input_is_0);
    let amount_out = quote_out(amount_in, reserve_in, reserve_out, pool.fee_bps)?;
    require!(amount_out >= min_amount_out, ErrorCode::SlippageExceeded);

    pool.apply_swap(amount_in, amount_out, input_is_0)?;
    pool.record_observation(now);
    let spot_price_after = pool.spot_price_for(input_is_0)?;
    let fee_bps = pool.fee_bps;
    let (token_in, token_out) = if input_is_0 {
        (pool.token_mint_0, pool.token_mint_1)
    } else {
        (pool.token_mint_1, pool.token_mint_0)
    };
    let pool_key = accounts.pool.key();

    let engine_seeds: &[&[&[u8]]] = &[&[ENGINE_AUTHORITY_SEED, &[engine_authority_bump]]];
    transfer_with_authority(
        accounts.escrow.clone(),
        accounts.vault_in.clone(),
        accounts.engine_authority.clone(),
        accounts.token_program,
        engine_seeds,
        amount_in,
    )?;

    let authority_bump = accounts.pool.authority_bump;
    let pool_seeds: &[&[&[u8]]] =
        &[&[POOL_AUTHORITY_SEED, pool_key.as_ref(), &[authority_bump]]];
    transfer_with_authority(
        accounts.vault_out.clone(),
        accounts.recipient.clone(),
        accounts.pool_authority.clone(),
        accounts.token_program,
        pool_seeds,
        amount_out,
    )?;

    emit!(SwapExecuted {
        pool: pool_key,
        user: owner,
        token_in,
        token_out,
        amount_in,
        amount_out,
        fee_bps,
        spot_price_after,
        timestamp: now,
    });

    Ok(amount_out)
}
