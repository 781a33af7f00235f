use thiserror::Error;

use crate::types::{Balance, Direction};

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Balance, available: Balance },

    #[error("Pool has no liquidity")]
    ZeroLiquidity,

    #[error("Unbalanced contribution: token A would mint {share_a} shares, token B would mint {share_b}")]
    UnbalancedContribution { share_a: Balance, share_b: Balance },

    #[error("Contribution too small to mint any shares")]
    BelowContributionThreshold,

    #[error("Share amount {requested} exceeds total shares {total}")]
    ExcessiveShareAmount { requested: Balance, total: Balance },

    #[error("Insufficient pool balance: requested {requested}, reserve holds {reserve}")]
    InsufficientPoolBalance { requested: Balance, reserve: Balance },

    #[error("Slippage exceeded on {direction} swap: expected at least {expected_min}, got {actual}")]
    SlippageExceeded {
        direction: Direction,
        expected_min: Balance,
        actual: Balance,
    },

    #[error("Faucet is disabled")]
    FaucetDisabled,

    #[error("Faucet limit exceeded: requested {requested}, max {max}")]
    FaucetLimitExceeded { requested: Balance, max: Balance },

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PoolError>;

impl PoolError {
    pub fn insufficient_balance(requested: Balance, available: Balance) -> Self {
        Self::InsufficientBalance { requested, available }
    }

    /// Errors raised by a pool precondition, as opposed to plumbing failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            PoolError::Config(_)
                | PoolError::Parse(_)
                | PoolError::Serialization(_)
                | PoolError::Io(_)
        )
    }
}

impl From<config::ConfigError> for PoolError {
    fn from(err: config::ConfigError) -> Self {
        PoolError::Config(err.to_string())
    }
}
