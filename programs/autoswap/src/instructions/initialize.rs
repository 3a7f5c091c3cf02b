//! One-time engine initialization: the global config, the per-family order
//! registries and the per-family schedulers.

use anchor_lang::prelude::*;

use crate::constants::{CONFIG_SEED, ENGINE_AUTHORITY_SEED, REGISTRY_SEED, SCHEDULER_SEED};
use crate::state::{Config, LockState, OrderFamily, OrderRegistry, SchedulerState};

#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The deployer becomes the admin and implicitly holds every role.
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Authority PDA owning every order escrow.
    /// CHECK: PDA derived from a fixed seed; never read or written.
    #[account(seeds = [ENGINE_AUTHORITY_SEED], bump)]
    pub engine_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = admin,
        space = 8 + OrderRegistry::INIT_SPACE,
        seeds = [REGISTRY_SEED, &[OrderFamily::Limit.seed()]],
        bump,
    )]
    pub limit_registry: Account<'info, OrderRegistry>,

    #[account(
        init,
        payer = admin,
        space = 8 + OrderRegistry::INIT_SPACE,
        seeds = [REGISTRY_SEED, &[OrderFamily::Recurring.seed()]],
        bump,
    )]
    pub recurring_registry: Account<'info, OrderRegistry>,

    #[account(
        init,
        payer = admin,
        space = 8 + OrderRegistry::INIT_SPACE,
        seeds = [REGISTRY_SEED, &[OrderFamily::Grid.seed()]],
        bump,
    )]
    pub grid_registry: Account<'info, OrderRegistry>,

    #[account(
        init,
        payer = admin,
        space = 8 + SchedulerState::INIT_SPACE,
        seeds = [SCHEDULER_SEED, &[OrderFamily::Limit.seed()]],
        bump,
    )]
    pub limit_scheduler: Account<'info, SchedulerState>,

    #[account(
        init,
        payer = admin,
        space = 8 + SchedulerState::INIT_SPACE,
        seeds = [SCHEDULER_SEED, &[OrderFamily::Recurring.seed()]],
        bump,
    )]
    pub recurring_scheduler: Account<'info, SchedulerState>,

    #[account(
        init,
        payer = admin,
        space = 8 + SchedulerState::INIT_SPACE,
        seeds = [SCHEDULER_SEED, &[OrderFamily::Grid.seed()]],
        bump,
    )]
    pub grid_scheduler: Account<'info, SchedulerState>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.paused = false;
    config.lock = LockState::Unlocked;
    config.next_order_id = 0;
    config.operators = vec![];
    config.fee_managers = vec![];
    config.pausers = vec![];
    config.bump = ctx.bumps.config;
    config.engine_authority_bump = ctx.bumps.engine_authority;

    for (registry, family, bump) in [
        (
            &mut ctx.accounts.limit_registry,
            OrderFamily::Limit,
            ctx.bumps.limit_registry,
        ),
        (
            &mut ctx.accounts.recurring_registry,
            OrderFamily::Recurring,
            ctx.bumps.recurring_registry,
        ),
        (
            &mut ctx.accounts.grid_registry,
            OrderFamily::Grid,
            ctx.bumps.grid_registry,
        ),
    ] {
        registry.family = family;
        registry.entries = vec![];
        registry.bump = bump;
    }

    for (scheduler, family, bump) in [
        (
            &mut ctx.accounts.limit_scheduler,
            OrderFamily::Limit,
            ctx.bumps.limit_scheduler,
        ),
        (
            &mut ctx.accounts.recurring_scheduler,
            OrderFamily::Recurring,
            ctx.bumps.recurring_scheduler,
        ),
        (
            &mut ctx.accounts.grid_scheduler,
            OrderFamily::Grid,
            ctx.bumps.grid_scheduler,
        ),
    ] {
        scheduler.family = family;
        scheduler.enabled = false;
        scheduler.cycle_counter = 0;
        scheduler.max_iterations = 0;
        scheduler.total_executed = 0;
        scheduler.last_tick_time = 0;
        scheduler.bump = bump;
    }

    Ok(())
}
