//! Read-only pool queries, returned as typed instruction data.

use anchor_lang::prelude::*;

use crate::state::Pool;
use crate::utils::math::{quote_in, quote_out};

#[derive(Accounts)]
pub struct QueryPool<'info> {
    pub pool: Account<'info, Pool>,
}

/// Output amount a swap of `amount_in` units of `token_in` would produce
/// right now.
pub fn get_amount_out_handler(
    ctx: Context<QueryPool>,
    token_in: Pubkey,
    amount_in: u64,
) -> Result<u64> {
    let pool = &ctx.accounts.pool;
    let input_is_0 = pool.input_is_0(&token_in)?;
    let (reserve_in, reserve_out) = pool.reserves_for(input_is_0);
    quote_out(amount_in, reserve_in, reserve_out, pool.fee_bps)
}

/// Input amount of `token_in` required to receive `amount_out` units of the
/// other token.
pub fn get_amount_in_handler(
    ctx: Context<QueryPool>,
    token_in: Pubkey,
    amount_out: u64,
) -> Result<u64> {
    let pool = &ctx.accounts.pool;
    let input_is_0 = pool.input_is_0(&token_in)?;
    let (reserve_in, reserve_out) = pool.reserves_for(input_is_0);
    quote_in(amount_out, reserve_in, reserve_out, pool.fee_bps)
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct PoolInfo {
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub reserve_0: u64,
    pub reserve_1: u64,
    pub total_lp_supply: u64,
    pub fee_bps: u16,
    pub is_active: bool,
    /// Price of token 0 in token 1, PRICE_SCALE fixed point.
    pub spot_price_0: u128,
    /// Price of token 1 in token 0, PRICE_SCALE fixed point.
    pub spot_price_1: u128,
    pub last_update_time: i64,
}

pub fn get_pool_handler(ctx: Context<QueryPool>) -> Result<PoolInfo> {
    let pool = &ctx.accounts.pool;
    Ok(PoolInfo {
        token_mint_0: pool.token_mint_0,
        token_mint_1: pool.token_mint_1,
        reserve_0: pool.reserve_0,
        reserve_1: pool.reserve_1,
        total_lp_supply: pool.total_lp_supply,
        fee_bps: pool.fee_bps,
        is_active: pool.is_active,
        spot_price_0: pool.spot_price_0()?,
        spot_price_1: pool.spot_price_1()?,
        last_update_time: pool.last_update_time,
    })
}
