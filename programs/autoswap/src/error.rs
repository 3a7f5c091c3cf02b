//! Error definitions

use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    // Validation errors (rejected before any mutation)
    #[msg("Token mints must be distinct")]
    IdenticalTokens,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Fee must be between 1 and 10000 basis points")]
    InvalidFeeBps,

    #[msg("Slippage tolerance cannot exceed 10000 basis points")]
    InvalidSlippageBps,

    #[msg("Price must be greater than zero")]
    InvalidPrice,

    #[msg("Expiry must be in the future")]
    InvalidExpiry,

    #[msg("Execution interval must be greater than zero")]
    InvalidInterval,

    #[msg("Trigger percentage must be greater than zero")]
    InvalidTriggerPercentage,

    #[msg("Max executions must be greater than zero")]
    InvalidMaxExecutions,

    #[msg("Grid order needs between 1 and 10 levels")]
    InvalidGridLevels,

    #[msg("Grid level offset must be between 1 and 9999 basis points")]
    InvalidGridOffset,

    #[msg("Token is not part of this pool")]
    TokenNotInPool,

    #[msg("Token mints must be passed in canonical order")]
    NonCanonicalPair,

    #[msg("Scheduler iteration budget is out of range")]
    InvalidIterationBudget,

    // Precondition errors (abort before mutation)
    #[msg("Engine is paused")]
    EnginePaused,

    #[msg("Pool is not active")]
    PoolNotActive,

    #[msg("Re-entrant call detected")]
    ReentrantCall,

    #[msg("Caller does not hold the required role")]
    MissingRole,

    #[msg("Role member list is full")]
    RoleListFull,

    #[msg("Member already holds this role")]
    RoleAlreadyGranted,

    #[msg("Member does not hold this role")]
    RoleNotGranted,

    #[msg("Order is not active")]
    OrderNotActive,

    #[msg("Order is not paused")]
    OrderNotPaused,

    #[msg("Order is not eligible for execution")]
    OrderNotEligible,

    #[msg("Order has expired")]
    OrderExpired,

    #[msg("Execution delay has not elapsed")]
    ExecutionDelayNotElapsed,

    #[msg("Order does not allow partial fills")]
    PartialFillNotAllowed,

    #[msg("Fill amount exceeds remaining amount")]
    FillExceedsRemaining,

    #[msg("Scheduler is not enabled")]
    SchedulerDisabled,

    #[msg("Scheduler or registry belongs to a different order family")]
    OrderFamilyMismatch,

    #[msg("Order registry is full")]
    RegistryFull,

    #[msg("Order not found in registry")]
    OrderNotInRegistry,

    #[msg("User order index is full")]
    UserOrdersFull,

    // Invariant errors (abort and roll back)
    #[msg("Output is below the minimum requested")]
    SlippageExceeded,

    #[msg("Fill price deviates too far from spot")]
    FillSlippageExceeded,

    #[msg("Deadline has passed")]
    DeadlinePassed,

    #[msg("Constant-product invariant violated")]
    InvariantViolated,

    #[msg("Initial liquidity below minimum")]
    InsufficientInitialLiquidity,

    #[msg("Insufficient liquidity for this operation")]
    InsufficientLiquidity,

    #[msg("Limit order fill bookkeeping is inconsistent")]
    FillAccountingBroken,

    // Arithmetic errors (never silently clamped or wrapped)
    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Math underflow")]
    MathUnderflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("Value does not fit in the target width")]
    NumericNarrowing,

    // Oracle errors
    #[msg("Not enough observations for the requested TWAP window")]
    InsufficientOracleData,

    #[msg("Invalid timestamp")]
    InvalidTimestamp,
}
