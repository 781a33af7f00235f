use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Balance, Direction, Timestamp, Token};

/// Read-out of the pool reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDetails {
    pub reserve_a: Balance,
    pub reserve_b: Balance,
    pub total_shares: Balance,
    pub fee_per_mille: u64,
}

impl PoolDetails {
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    pub fn constant_product(&self) -> u128 {
        self.reserve_a as u128 * self.reserve_b as u128
    }
}

/// Balances an account holds outside the pool, plus its share of it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    pub balance_a: Balance,
    pub balance_b: Balance,
    pub share_balance: Balance,
}

impl Holdings {
    pub fn balance(&self, token: Token) -> Balance {
        match token {
            Token::A => self.balance_a,
            Token::B => self.balance_b,
        }
    }

    pub fn balance_mut(&mut self, token: Token) -> &mut Balance {
        match token {
            Token::A => &mut self.balance_a,
            Token::B => &mut self.balance_b,
        }
    }
}

/// Priced swap estimate for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub direction: Direction,
    pub input_amount: Balance,
    pub output_amount: Balance,
    /// Output per unit of input before the trade
    pub spot_price: Decimal,
    /// Output per unit of input actually received
    pub execution_price: Decimal,
    pub price_impact_percent: Decimal,
    pub quoted_at: Timestamp,
}
