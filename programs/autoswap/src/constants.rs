//! Global constants: PDA seeds, fixed-point scales and engine limits.

// PDA seed constants
pub const CONFIG_SEED: &[u8] = b"config";
pub const POOL_SEED: &[u8] = b"pool";
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool_authority";
pub const VAULT_SEED: &[u8] = b"vault";
pub const LP_MINT_SEED: &[u8] = b"lp_mint";
pub const LIMIT_ORDER_SEED: &[u8] = b"limit_order";
pub const RECURRING_ORDER_SEED: &[u8] = b"recurring_order";
pub const GRID_ORDER_SEED: &[u8] = b"grid_order";
pub const ESCROW_SEED: &[u8] = b"escrow";
pub const ENGINE_AUTHORITY_SEED: &[u8] = b"engine_authority";
pub const REGISTRY_SEED: &[u8] = b"registry";
pub const USER_ORDERS_SEED: &[u8] = b"user_orders";
pub const SCHEDULER_SEED: &[u8] = b"scheduler";

// Fixed-point scales
/// Canonical decimal scale for every price field in the engine
/// (limit prices, entry/reference prices, trigger prices, spot and TWAP).
/// A price is "units of token_out per unit of token_in", scaled by 1e9.
pub const PRICE_SCALE: u128 = 1_000_000_000;

/// Basis-point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

// Fee constants
pub const MIN_FEE_BPS: u16 = 1;
pub const MAX_FEE_BPS: u16 = 10_000;

// Liquidity constants
/// Liquidity permanently retained by the pool at creation. Counted in
/// `total_lp_supply` but never minted to any holder, so the first depositor
/// can never drain the pool to zero and division by the LP supply is safe.
pub const MIN_LIQUIDITY: u64 = 1_000;

/// Decimals of the LP mint, matching the canonical 9-decimal price scale.
pub const LP_DECIMALS: u8 = 9;

// Oracle constants
/// Observations kept in the pool's ring buffer for windowed TWAP queries.
pub const OBSERVATION_COUNT: usize = 8;
/// Minimum seconds between two recorded observations.
pub const MIN_OBSERVATION_INTERVAL: i64 = 60;
/// Window used when a limit order evaluates against TWAP instead of spot.
pub const TWAP_WINDOW: i64 = 3_600;

// Order constants
/// Levels allowed in one grid order.
pub const MAX_GRID_LEVELS: usize = 10;
/// Orders tracked per family registry.
pub const MAX_TRACKED_ORDERS: usize = 64;
/// Order ids tracked per user back-index.
pub const MAX_ORDERS_PER_USER: usize = 32;
/// Members per role list in the config.
pub const MAX_ROLE_MEMBERS: usize = 8;

// Scheduler constants
/// Upper bound on a single start_bot iteration budget.
pub const MAX_SCHEDULER_ITERATIONS: u64 = 10_000;
