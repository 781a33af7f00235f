use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{PoolError, Result};

pub type Timestamp = u64;

/// Raw token or share quantity, scaled by `PRECISION_SCALE`.
pub type Balance = u64;

pub const PRECISION_DECIMALS: u32 = 6;
pub const PRECISION_SCALE: Balance = 1_000_000;

/// Shares minted by the very first deposit into an empty pool.
pub const BASELINE_SHARES: Balance = 100 * PRECISION_SCALE;

pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp_millis() as u64
}

// ============================================================================
// Accounts
// ============================================================================

/// Identity of a caller interacting with the pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl FromStr for AccountId {
    type Err = PoolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PoolError::Parse("account id cannot be empty".into()));
        }
        Ok(Self::new(trimmed))
    }
}

// ============================================================================
// Tokens & swap direction
// ============================================================================

/// One side of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    A,
    B,
}

impl Token {
    pub fn other(&self) -> Token {
        match self {
            Token::A => Token::B,
            Token::B => Token::A,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::A => write!(f, "A"),
            Token::B => write!(f, "B"),
        }
    }
}

impl FromStr for Token {
    type Err = PoolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" => Ok(Token::A),
            "b" => Ok(Token::B),
            _ => Err(PoolError::Parse(format!("Unknown token: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    AtoB,
    BtoA,
}

impl Direction {
    pub fn input(&self) -> Token {
        match self {
            Direction::AtoB => Token::A,
            Direction::BtoA => Token::B,
        }
    }

    pub fn output(&self) -> Token {
        self.input().other()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::AtoB => write!(f, "A -> B"),
            Direction::BtoA => write!(f, "B -> A"),
        }
    }
}

impl FromStr for Direction {
    type Err = PoolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a2b" | "atob" | "a->b" => Ok(Direction::AtoB),
            "b2a" | "btoa" | "b->a" => Ok(Direction::BtoA),
            _ => Err(PoolError::Parse(format!("Unknown swap direction: {}", s))),
        }
    }
}

// ============================================================================
// Token Information
// ============================================================================

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub name: Option<String>,
}

impl TokenInfo {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn scale(&self) -> Decimal {
        Decimal::from(10u64.pow(self.decimals as u32))
    }

    /// Convert raw amount to decimal
    pub fn to_decimal(&self, raw_amount: Balance) -> Decimal {
        (Decimal::from(raw_amount) / self.scale()).normalize()
    }

    /// Convert decimal to raw amount, rejecting negatives and sub-unit dust
    pub fn to_raw(&self, decimal_amount: Decimal) -> Result<Balance> {
        if decimal_amount.is_sign_negative() {
            return Err(PoolError::Parse(format!(
                "negative {} amount: {}",
                self.symbol, decimal_amount
            )));
        }
        if decimal_amount.normalize().scale() > self.decimals as u32 {
            return Err(PoolError::Parse(format!(
                "{} supports at most {} decimals: {}",
                self.symbol, self.decimals, decimal_amount
            )));
        }
        decimal_amount
            .checked_mul(self.scale())
            .and_then(|raw| raw.to_u64())
            .ok_or(PoolError::ArithmeticOverflow("token amount conversion"))
    }
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self::new("TOKEN", PRECISION_DECIMALS as u8)
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Token amount with automatic decimal handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: TokenInfo,
    pub raw_amount: Balance,
}

impl TokenAmount {
    pub fn new(token: TokenInfo, raw_amount: Balance) -> Self {
        Self { token, raw_amount }
    }

    pub fn to_decimal(&self) -> Decimal {
        self.token.to_decimal(self.raw_amount)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.token.symbol)
    }
}
