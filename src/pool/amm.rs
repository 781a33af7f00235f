use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    pool::{ledger::AccountLedger, state::PoolState},
    types::{AccountId, Balance, Direction, Holdings, PoolDetails, PoolError, Result, SwapQuote, Token, now},
    utils::math,
};

/// Constant-product pool together with the accounts trading against it.
///
/// Every mutating operation checks all of its preconditions and computes the
/// next pool state and the caller's next holdings before writing anything, so
/// a failed call leaves both untouched.
#[derive(Debug, Clone)]
pub struct ConstantProductPool {
    state: PoolState,
    ledger: AccountLedger,
}

impl ConstantProductPool {
    pub fn new(fee_per_mille: u64, baseline_shares: Balance) -> Result<Self> {
        Ok(Self::from_state(PoolState::new(fee_per_mille, baseline_shares)?))
    }

    pub fn from_state(state: PoolState) -> Self {
        Self {
            state,
            ledger: AccountLedger::new(),
        }
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    pub fn ledger(&self) -> &AccountLedger {
        &self.ledger
    }

    // ========== READ-OUTS ==========

    pub fn pool_details(&self) -> PoolDetails {
        self.state.details()
    }

    pub fn holdings(&self, account: &AccountId) -> Holdings {
        self.ledger.holdings(account)
    }

    // ========== ESTIMATORS ==========

    pub fn equivalent_amount(&self, known_amount: Balance, known: Token) -> Result<Balance> {
        self.state.equivalent_amount(known_amount, known)
    }

    pub fn withdraw_estimate(&self, share_amount: Balance) -> Result<(Balance, Balance)> {
        self.state.withdraw_estimate(share_amount)
    }

    pub fn swap_estimate(&self, input_amount: Balance, direction: Direction) -> Result<Balance> {
        self.state.swap_estimate(input_amount, direction)
    }

    pub fn required_input_for_swap(&self, output_amount: Balance, direction: Direction) -> Result<Balance> {
        self.state.required_input_for_swap(output_amount, direction)
    }

    pub fn quote_swap(&self, input_amount: Balance, direction: Direction) -> Result<SwapQuote> {
        let output_amount = self.state.swap_estimate(input_amount, direction)?;
        let reserve_in = self.state.reserve(direction.input());
        let reserve_out = self.state.reserve(direction.output());

        let execution_price = if input_amount == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(output_amount) / Decimal::from(input_amount)
        };

        Ok(SwapQuote {
            direction,
            input_amount,
            output_amount,
            spot_price: math::calculate_spot_price(reserve_in, reserve_out),
            execution_price,
            price_impact_percent: math::calculate_price_impact(
                input_amount,
                output_amount,
                reserve_in,
                reserve_out,
            ),
            quoted_at: now(),
        })
    }

    // ========== MUTATIONS ==========

    /// Mint test tokens into an account's outside-pool balances
    pub fn faucet(&mut self, account: &AccountId, amount_a: Balance, amount_b: Balance) -> Result<Holdings> {
        if amount_a == 0 && amount_b == 0 {
            return Err(PoolError::ZeroAmount);
        }

        let mut holdings = self.ledger.holdings(account);
        holdings.balance_a = checked_credit(holdings.balance_a, amount_a, "faucet balance_a")?;
        holdings.balance_b = checked_credit(holdings.balance_b, amount_b, "faucet balance_b")?;

        if !self.ledger.contains(account) {
            debug!("Opening account {} ({} known)", account, self.ledger.len() + 1);
        }
        self.ledger.store(account, holdings);
        Ok(holdings)
    }

    /// Deposit both tokens and receive pool shares
    pub fn provide(&mut self, account: &AccountId, amount_a: Balance, amount_b: Balance) -> Result<Balance> {
        if amount_a == 0 || amount_b == 0 {
            return Err(PoolError::ZeroAmount);
        }
        self.ledger.ensure_token_balance(account, Token::A, amount_a)?;
        self.ledger.ensure_token_balance(account, Token::B, amount_b)?;

        let genesis = self.state.is_empty();
        let shares = self.state.shares_for_deposit(amount_a, amount_b)?;
        let next_state = self.state.after_deposit(amount_a, amount_b, shares)?;

        let mut holdings = self.ledger.holdings(account);
        holdings.balance_a -= amount_a;
        holdings.balance_b -= amount_b;
        let credited_shares = checked_credit(holdings.share_balance, shares, "share_balance")?;

        // Outside balances are debited before any share is credited.
        self.ledger.store(account, holdings);
        self.state = next_state;
        holdings.share_balance = credited_shares;
        self.ledger.store(account, holdings);

        if genesis {
            debug!("Genesis deposit by {} set ratio {}:{}", account, amount_a, amount_b);
        }
        Ok(shares)
    }

    /// Burn shares and receive the proportional reserves, floored
    pub fn withdraw(&mut self, account: &AccountId, share_amount: Balance) -> Result<(Balance, Balance)> {
        if share_amount == 0 {
            return Err(PoolError::ZeroAmount);
        }
        self.state.ensure_liquidity()?;
        self.ledger.ensure_share_balance(account, share_amount)?;

        let (amount_a, amount_b) = self.state.withdraw_estimate(share_amount)?;
        let next_state = self.state.after_withdrawal(share_amount, amount_a, amount_b)?;

        let mut holdings = self.ledger.holdings(account);
        holdings.share_balance -= share_amount;
        let credited_a = checked_credit(holdings.balance_a, amount_a, "balance_a")?;
        let credited_b = checked_credit(holdings.balance_b, amount_b, "balance_b")?;

        self.ledger.store(account, holdings);
        self.state = next_state;
        holdings.balance_a = credited_a;
        holdings.balance_b = credited_b;
        self.ledger.store(account, holdings);

        if self.state.is_empty() {
            debug!("Pool drained by {}; next deposit re-prices the pool", account);
        }
        Ok((amount_a, amount_b))
    }

    pub fn swap(&mut self, account: &AccountId, input_amount: Balance, direction: Direction) -> Result<Balance> {
        self.swap_with_min_output(account, input_amount, direction, 0)
    }

    /// Swap, failing if the output falls below `min_output`
    pub fn swap_with_min_output(
        &mut self,
        account: &AccountId,
        input_amount: Balance,
        direction: Direction,
        min_output: Balance,
    ) -> Result<Balance> {
        if input_amount == 0 {
            return Err(PoolError::ZeroAmount);
        }
        self.state.ensure_liquidity()?;
        self.ledger.ensure_token_balance(account, direction.input(), input_amount)?;

        let output_amount = self.state.swap_estimate(input_amount, direction)?;
        if output_amount < min_output {
            return Err(PoolError::SlippageExceeded {
                direction,
                expected_min: min_output,
                actual: output_amount,
            });
        }
        let next_state = self.state.after_swap(direction, input_amount, output_amount)?;

        let mut holdings = self.ledger.holdings(account);
        *holdings.balance_mut(direction.input()) -= input_amount;
        let credited = checked_credit(holdings.balance(direction.output()), output_amount, "swap output")?;

        self.ledger.store(account, holdings);
        self.state = next_state;
        *holdings.balance_mut(direction.output()) = credited;
        self.ledger.store(account, holdings);

        Ok(output_amount)
    }
}

fn checked_credit(balance: Balance, amount: Balance, what: &'static str) -> Result<Balance> {
    balance.checked_add(amount).ok_or(PoolError::ArithmeticOverflow(what))
}
