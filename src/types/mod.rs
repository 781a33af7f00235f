pub mod common;
pub mod error;
pub mod pool;

pub use common::*;
pub use error::*;
pub use pool::*;
