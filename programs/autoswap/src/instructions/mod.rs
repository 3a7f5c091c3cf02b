//! Instruction modules grouped by concern: engine setup, pool operations,
//! order families, scheduler cranks, read-only queries and administration.

pub mod admin;
pub mod crank;
pub mod create_pool;
pub mod executor;
pub mod grid_order;
pub mod initialize;
pub mod limit_order;
pub mod liquidity;
pub mod quote;
pub mod recurring_order;
pub mod swap;
pub mod views;

pub use admin::*;
pub use crank::*;
pub use create_pool::*;
pub use grid_order::*;
pub use initialize::*;
pub use limit_order::*;
pub use liquidity::*;
pub use quote::*;
pub use recurring_order::*;
pub use swap::*;
pub use views::*;
