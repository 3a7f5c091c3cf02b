//! Event definitions

use anchor_lang::prelude::*;

use crate::state::{OrderFamily, OrderStatus};

/// Emitted when a pool is created
#[event]
pub struct PoolCreated {
    pub pool: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
    pub lp_minted: u64,
    pub fee_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct LiquidityAdded {
    pub pool: Pubkey,
    pub provider: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
    pub lp_minted: u64,
    pub timestamp: i64,
}

#[event]
pub struct LiquidityRemoved {
    pub pool: Pubkey,
    pub provider: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
    pub lp_burned: u64,
    pub timestamp: i64,
}

/// Emitted when a swap is executed, whether user-initiated or order-driven
#[event]
pub struct SwapExecuted {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_bps: u16,
    pub spot_price_after: u128,
    pub timestamp: i64,
}

#[event]
pub struct OrderCreated {
    pub family: OrderFamily,
    pub order_id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub escrowed_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct OrderExecuted {
    pub family: OrderFamily,
    pub order_id: u64,
    pub pool: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
    pub new_status: OrderStatus,
    pub timestamp: i64,
}

#[event]
pub struct OrderCancelled {
    pub family: OrderFamily,
    pub order_id: u64,
    pub refunded_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct OrderPaused {
    pub order_id: u64,
    pub timestamp: i64,
}

#[event]
pub struct OrderResumed {
    pub order_id: u64,
    pub timestamp: i64,
}

#[event]
pub struct BotStarted {
    pub family: OrderFamily,
    pub max_iterations: u64,
    pub timestamp: i64,
}

#[event]
pub struct BotStopped {
    pub family: OrderFamily,
    pub cycles_run: u64,
    pub timestamp: i64,
}

/// Emitted at the end of every scheduler tick
#[event]
pub struct TickCompleted {
    pub family: OrderFamily,
    pub cycle: u64,
    pub orders_seen: u64,
    pub orders_executed: u64,
    pub orders_skipped: u64,
    pub halted: bool,
    pub timestamp: i64,
}

#[event]
pub struct PauseToggled {
    pub paused: bool,
    pub by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolFeeUpdated {
    pub pool: Pubkey,
    pub old_fee_bps: u16,
    pub new_fee_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct RoleGranted {
    pub role: u8,
    pub member: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct RoleRevoked {
    pub role: u8,
    pub member: Pubkey,
    pub timestamp: i64,
}
