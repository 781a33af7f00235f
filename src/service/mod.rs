pub mod handle;
pub mod pool_service;

pub use handle::PoolHandle;
pub use pool_service::{PoolService, PoolServiceBuilder};
