use std::collections::HashMap;

use crate::types::{AccountId, Balance, Holdings, PoolError, Result, Token};

/// Per-account balances held outside the pool.
///
/// Entries are created on first write and never removed.
#[derive(Debug, Clone, Default)]
pub struct AccountLedger {
    accounts: HashMap<AccountId, Holdings>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current holdings; unknown accounts read as empty without being created
    pub fn holdings(&self, account: &AccountId) -> Holdings {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.accounts.contains_key(account)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn ensure_token_balance(&self, account: &AccountId, token: Token, amount: Balance) -> Result<()> {
        let available = self.holdings(account).balance(token);
        if available < amount {
            return Err(PoolError::insufficient_balance(amount, available));
        }
        Ok(())
    }

    pub fn ensure_share_balance(&self, account: &AccountId, shares: Balance) -> Result<()> {
        let available = self.holdings(account).share_balance;
        if available < shares {
            return Err(PoolError::insufficient_balance(shares, available));
        }
        Ok(())
    }

    /// Overwrite an account's holdings, creating the entry if needed
    pub fn store(&mut self, account: &AccountId, holdings: Holdings) {
        self.accounts.insert(account.clone(), holdings);
    }

    /// Sum of every account's holdings, widened so the total cannot overflow
    pub fn totals(&self) -> (u128, u128, u128) {
        self.accounts.values().fold((0, 0, 0), |(a, b, s), h| {
            (
                a + h.balance_a as u128,
                b + h.balance_b as u128,
                s + h.share_balance as u128,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    #[test]
    fn test_unknown_account_reads_empty() {
        let ledger = AccountLedger::new();
        assert_eq!(ledger.holdings(&alice()), Holdings::default());
        assert!(!ledger.contains(&alice()));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_store_creates_entry() {
        let mut ledger = AccountLedger::new();
        let holdings = Holdings {
            balance_a: 10,
            balance_b: 20,
            share_balance: 0,
        };
        ledger.store(&alice(), holdings);
        assert_eq!(ledger.holdings(&alice()), holdings);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_balance_checks() {
        let mut ledger = AccountLedger::new();
        ledger.store(
            &alice(),
            Holdings {
                balance_a: 10,
                balance_b: 20,
                share_balance: 5,
            },
        );
        assert!(ledger.ensure_token_balance(&alice(), Token::A, 10).is_ok());
        assert!(matches!(
            ledger.ensure_token_balance(&alice(), Token::A, 11),
            Err(PoolError::InsufficientBalance { requested: 11, available: 10 })
        ));
        assert!(ledger.ensure_share_balance(&alice(), 5).is_ok());
        assert!(ledger.ensure_share_balance(&alice(), 6).is_err());
        assert!(ledger.ensure_token_balance(&AccountId::from("bob"), Token::B, 1).is_err());
    }

    #[test]
    fn test_totals() {
        let mut ledger = AccountLedger::new();
        let big = Holdings {
            balance_a: u64::MAX,
            balance_b: 1,
            share_balance: 2,
        };
        ledger.store(&alice(), big);
        ledger.store(&AccountId::from("bob"), big);
        assert_eq!(ledger.totals(), (u64::MAX as u128 * 2, 2, 4));
    }
}
