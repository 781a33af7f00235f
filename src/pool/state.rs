use serde::{Deserialize, Serialize};

use crate::{
    types::{BASELINE_SHARES, Balance, Direction, PoolDetails, PoolError, Result, Token},
    utils::math::{self, FEE_DENOMINATOR},
};

/// Reserves and share supply of a constant-product pool.
///
/// `invariant_k` is a cache of `reserve_a * reserve_b` and is re-derived from
/// the literal reserves after every mutation. All estimators are pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredPoolState")]
pub struct PoolState {
    reserve_a: Balance,
    reserve_b: Balance,
    total_shares: Balance,
    invariant_k: u128,
    fee_per_mille: u64,
    baseline_shares: Balance,
}

impl PoolState {
    pub fn new(fee_per_mille: u64, baseline_shares: Balance) -> Result<Self> {
        if fee_per_mille >= FEE_DENOMINATOR {
            return Err(PoolError::Config(format!(
                "fee_per_mille must be below {}, got {}",
                FEE_DENOMINATOR, fee_per_mille
            )));
        }
        if baseline_shares == 0 {
            return Err(PoolError::Config("baseline_shares must be positive".into()));
        }
        Ok(Self {
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            invariant_k: 0,
            fee_per_mille,
            baseline_shares,
        })
    }

    /// Restore a pool from known reserves and share supply
    pub fn from_reserves(reserve_a: Balance, reserve_b: Balance, total_shares: Balance) -> Result<Self> {
        Self::new(0, BASELINE_SHARES)?.with_reserves(reserve_a, reserve_b, total_shares)
    }

    fn with_reserves(mut self, reserve_a: Balance, reserve_b: Balance, total_shares: Balance) -> Result<Self> {
        let reserves_empty = reserve_a == 0 && reserve_b == 0;
        let reserves_full = reserve_a > 0 && reserve_b > 0;
        if !((reserves_empty && total_shares == 0) || (reserves_full && total_shares > 0)) {
            return Err(PoolError::Config(format!(
                "inconsistent pool: reserves ({}, {}) with {} shares",
                reserve_a, reserve_b, total_shares
            )));
        }

        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self.total_shares = total_shares;
        self.refresh_invariant();
        Ok(self)
    }

    pub fn reserve_a(&self) -> Balance {
        self.reserve_a
    }

    pub fn reserve_b(&self) -> Balance {
        self.reserve_b
    }

    pub fn reserve(&self, token: Token) -> Balance {
        match token {
            Token::A => self.reserve_a,
            Token::B => self.reserve_b,
        }
    }

    pub fn total_shares(&self) -> Balance {
        self.total_shares
    }

    pub fn invariant_k(&self) -> u128 {
        self.invariant_k
    }

    pub fn fee_per_mille(&self) -> u64 {
        self.fee_per_mille
    }

    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    pub fn details(&self) -> PoolDetails {
        PoolDetails {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            total_shares: self.total_shares,
            fee_per_mille: self.fee_per_mille,
        }
    }

    pub fn ensure_liquidity(&self) -> Result<()> {
        if self.is_empty() {
            return Err(PoolError::ZeroLiquidity);
        }
        Ok(())
    }

    fn refresh_invariant(&mut self) {
        self.invariant_k = math::constant_product(self.reserve_a, self.reserve_b);
    }

    // ========== ESTIMATORS ==========

    /// Shares a deposit of `(amount_a, amount_b)` would mint
    pub fn shares_for_deposit(&self, amount_a: Balance, amount_b: Balance) -> Result<Balance> {
        if self.is_empty() {
            return Ok(self.baseline_shares);
        }

        let share_a = math::mul_div(self.total_shares, amount_a, self.reserve_a)?;
        let share_b = math::mul_div(self.total_shares, amount_b, self.reserve_b)?;
        if share_a != share_b {
            return Err(PoolError::UnbalancedContribution { share_a, share_b });
        }
        if share_a == 0 {
            return Err(PoolError::BelowContributionThreshold);
        }
        Ok(share_a)
    }

    /// Amount of the other token that matches `known_amount` at the current ratio
    pub fn equivalent_amount(&self, known_amount: Balance, known: Token) -> Result<Balance> {
        self.ensure_liquidity()?;
        math::mul_div(self.reserve(known.other()), known_amount, self.reserve(known))
    }

    pub fn withdraw_estimate(&self, share_amount: Balance) -> Result<(Balance, Balance)> {
        self.ensure_liquidity()?;
        if share_amount > self.total_shares {
            return Err(PoolError::ExcessiveShareAmount {
                requested: share_amount,
                total: self.total_shares,
            });
        }
        let amount_a = math::mul_div(share_amount, self.reserve_a, self.total_shares)?;
        let amount_b = math::mul_div(share_amount, self.reserve_b, self.total_shares)?;
        Ok((amount_a, amount_b))
    }

    pub fn swap_estimate(&self, input_amount: Balance, direction: Direction) -> Result<Balance> {
        self.ensure_liquidity()?;
        math::calculate_amm_output(
            input_amount,
            self.reserve(direction.input()),
            self.reserve(direction.output()),
            self.invariant_k,
            self.fee_per_mille,
        )
    }

    pub fn required_input_for_swap(&self, output_amount: Balance, direction: Direction) -> Result<Balance> {
        self.ensure_liquidity()?;
        math::calculate_amm_input(
            output_amount,
            self.reserve(direction.input()),
            self.reserve(direction.output()),
            self.invariant_k,
            self.fee_per_mille,
        )
    }

    // ========== TRANSITIONS ==========
    //
    // Each transition returns the next state without touching `self`, so a
    // caller can finish every fallible step before committing anything.

    pub fn after_deposit(&self, amount_a: Balance, amount_b: Balance, shares: Balance) -> Result<Self> {
        let mut next = *self;
        next.reserve_a = checked_add(self.reserve_a, amount_a, "reserve_a")?;
        next.reserve_b = checked_add(self.reserve_b, amount_b, "reserve_b")?;
        next.total_shares = checked_add(self.total_shares, shares, "total_shares")?;
        next.refresh_invariant();
        Ok(next)
    }

    pub fn after_withdrawal(&self, shares: Balance, amount_a: Balance, amount_b: Balance) -> Result<Self> {
        let mut next = *self;
        next.total_shares = checked_sub(self.total_shares, shares, "total_shares")?;
        next.reserve_a = checked_sub(self.reserve_a, amount_a, "reserve_a")?;
        next.reserve_b = checked_sub(self.reserve_b, amount_b, "reserve_b")?;
        next.refresh_invariant();
        Ok(next)
    }

    pub fn after_swap(&self, direction: Direction, input_amount: Balance, output_amount: Balance) -> Result<Self> {
        let mut next = *self;
        let (reserve_in, reserve_out) = match direction {
            Direction::AtoB => (&mut next.reserve_a, &mut next.reserve_b),
            Direction::BtoA => (&mut next.reserve_b, &mut next.reserve_a),
        };
        *reserve_in = checked_add(*reserve_in, input_amount, "swap input reserve")?;
        *reserve_out = checked_sub(*reserve_out, output_amount, "swap output reserve")?;
        next.refresh_invariant();
        Ok(next)
    }
}

/// Serialized form; `invariant_k` is ignored and re-derived from the reserves.
#[derive(Deserialize)]
struct StoredPoolState {
    reserve_a: Balance,
    reserve_b: Balance,
    total_shares: Balance,
    fee_per_mille: u64,
    baseline_shares: Balance,
}

impl TryFrom<StoredPoolState> for PoolState {
    type Error = PoolError;

    fn try_from(stored: StoredPoolState) -> Result<Self> {
        PoolState::new(stored.fee_per_mille, stored.baseline_shares)?.with_reserves(
            stored.reserve_a,
            stored.reserve_b,
            stored.total_shares,
        )
    }
}

fn checked_add(value: Balance, amount: Balance, what: &'static str) -> Result<Balance> {
    value.checked_add(amount).ok_or(PoolError::ArithmeticOverflow(what))
}

fn checked_sub(value: Balance, amount: Balance, what: &'static str) -> Result<Balance> {
    value.checked_sub(amount).ok_or(PoolError::ArithmeticOverflow(what))
}
