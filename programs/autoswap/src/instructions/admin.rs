//! Privileged administration: the global pause switch, pool fee updates and
//! role membership.

use anchor_lang::prelude::*;

use crate::constants::{CONFIG_SEED, MAX_FEE_BPS, MIN_FEE_BPS};
use crate::error::ErrorCode;
use crate::events::{PauseToggled, PoolFeeUpdated, RoleGranted, RoleRevoked};
use crate::state::{Config, Lock, Pool, Role};

#[derive(Accounts)]
pub struct SetPaused<'info> {
    pub pauser: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,
}

pub fn set_paused_handler(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.require_role(Role::Pauser, &ctx.accounts.pauser.key())?;
    Lock::acquire(&mut config.lock)?;
    config.paused = paused;
    emit!(PauseToggled {
        paused,
        by: ctx.accounts.pauser.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct SetPoolFee<'info> {
    pub fee_manager: Signer<'info>,

    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub pool: Account<'info, Pool>,
}

pub fn set_pool_fee_handler(ctx: Context<SetPoolFee>, new_fee_bps: u16) -> Result<()> {
    ctx.accounts
        .config
        .require_role(Role::FeeManager, &ctx.accounts.fee_manager.key())?;
    require!(
        (MIN_FEE_BPS..=MAX_FEE_BPS).contains(&new_fee_bps),
        ErrorCode::InvalidFeeBps
    );
    Lock::acquire(&mut ctx.accounts.config.lock)?;
    let pool = &mut ctx.accounts.pool;
    let old_fee_bps = pool.fee_bps;
    pool.fee_bps = new_fee_bps;
    emit!(PoolFeeUpdated {
        pool: pool.key(),
        old_fee_bps,
        new_fee_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

#[derive(Accounts)]
pub struct ManageRoles<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = admin @ ErrorCode::MissingRole,
    )]
    pub config: Account<'info, Config>,
}

pub fn grant_role_handler(ctx: Context<ManageRoles>, role: Role, member: Pubkey) -> Result<()> {
    Lock::acquire(&mut ctx.accounts.config.lock)?;
    ctx.accounts.config.grant_role(role, member)?;
    emit!(RoleGranted {
        role: role as u8,
        member,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}

pub fn revoke_role_handler(ctx: Context<ManageRoles>, role: Role, member: Pubkey) -> Result<()> {
    Lock::acquire(&mut ctx.accounts.config.lock)?;
    ctx.accounts.config.revoke_role(role, &member)?;
    emit!(RoleRevoked {
        role: role as u8,
        member,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Lock::release(&mut ctx.accounts.config.lock)
}
