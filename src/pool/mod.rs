pub mod amm;
pub mod ledger;
pub mod state;

pub use amm::ConstantProductPool;
pub use ledger::AccountLedger;
pub use state::PoolState;
