pub mod config;
pub mod grid_order;
pub mod guard;
pub mod limit_order;
pub mod pool;
pub mod recurring_order;
pub mod registry;
pub mod scheduler;

pub use config::*;
pub use grid_order::*;
pub use guard::*;
pub use limit_order::*;
pub use pool::*;
pub use recurring_order::*;
pub use registry::*;
pub use scheduler::*;
