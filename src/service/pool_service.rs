use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    pool::ConstantProductPool,
    service::handle::PoolHandle,
    types::{AccountId, Balance, Direction, Holdings, PoolDetails, PoolError, Result, SwapQuote, Token},
    utils::{
        config::{Config, FaucetConfig, TradingConfig},
        math,
    },
};

/// The single shared pool instance.
///
/// Mutations take the write lock for their whole duration and estimators take
/// the read lock, so no caller ever observes a half-applied operation. Clones
/// share the same pool.
#[derive(Clone)]
pub struct PoolService {
    pool: Arc<RwLock<ConstantProductPool>>,
    faucet: FaucetConfig,
    trading: TradingConfig,
}

impl PoolService {
    pub fn new(pool: ConstantProductPool, faucet: FaucetConfig, trading: TradingConfig) -> Self {
        Self {
            pool: Arc::new(RwLock::new(pool)),
            faucet,
            trading,
        }
    }

    pub fn pool(&self) -> Arc<RwLock<ConstantProductPool>> {
        self.pool.clone()
    }

    fn check_faucet(&self, amount_a: Balance, amount_b: Balance) -> Result<()> {
        if !self.faucet.enabled {
            return Err(PoolError::FaucetDisabled);
        }
        if amount_a > self.faucet.max_amount_a {
            return Err(PoolError::FaucetLimitExceeded {
                requested: amount_a,
                max: self.faucet.max_amount_a,
            });
        }
        if amount_b > self.faucet.max_amount_b {
            return Err(PoolError::FaucetLimitExceeded {
                requested: amount_b,
                max: self.faucet.max_amount_b,
            });
        }
        Ok(())
    }
}

fn log_rejection<T>(operation: &str, account: &AccountId, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!("{} by {} rejected: {}", operation, account, e);
    }
    result
}

#[async_trait]
impl PoolHandle for PoolService {
    async fn faucet(&self, account: &AccountId, amount_a: Balance, amount_b: Balance) -> Result<Holdings> {
        let result = match self.check_faucet(amount_a, amount_b) {
            Ok(()) => self.pool.write().await.faucet(account, amount_a, amount_b),
            Err(e) => Err(e),
        };
        let holdings = log_rejection("faucet", account, result)?;
        info!("Faucet credited {} with {} A / {} B", account, amount_a, amount_b);
        Ok(holdings)
    }

    async fn provide(&self, account: &AccountId, amount_a: Balance, amount_b: Balance) -> Result<Balance> {
        let result = self.pool.write().await.provide(account, amount_a, amount_b);
        let shares = log_rejection("provide", account, result)?;
        info!("{} provided {} A / {} B for {} shares", account, amount_a, amount_b, shares);
        Ok(shares)
    }

    async fn withdraw(&self, account: &AccountId, share_amount: Balance) -> Result<(Balance, Balance)> {
        let result = self.pool.write().await.withdraw(account, share_amount);
        let (amount_a, amount_b) = log_rejection("withdraw", account, result)?;
        info!("{} burned {} shares for {} A / {} B", account, share_amount, amount_a, amount_b);
        Ok((amount_a, amount_b))
    }

    async fn swap(
        &self,
        account: &AccountId,
        input_amount: Balance,
        direction: Direction,
        min_output: Option<Balance>,
    ) -> Result<Balance> {
        let result = self.pool.write().await.swap_with_min_output(
            account,
            input_amount,
            direction,
            min_output.unwrap_or(0),
        );
        let output = log_rejection("swap", account, result)?;
        info!("{} swapped {} for {} ({})", account, input_amount, output, direction);
        Ok(output)
    }

    async fn equivalent_amount(&self, known_amount: Balance, known: Token) -> Result<Balance> {
        debug!("Equivalent amount for {} {}", known_amount, known);
        self.pool.read().await.equivalent_amount(known_amount, known)
    }

    async fn withdraw_estimate(&self, share_amount: Balance) -> Result<(Balance, Balance)> {
        debug!("Withdraw estimate for {} shares", share_amount);
        self.pool.read().await.withdraw_estimate(share_amount)
    }

    async fn swap_estimate(&self, input_amount: Balance, direction: Direction) -> Result<Balance> {
        debug!("Swap estimate for {} ({})", input_amount, direction);
        self.pool.read().await.swap_estimate(input_amount, direction)
    }

    async fn required_input_for_swap(&self, output_amount: Balance, direction: Direction) -> Result<Balance> {
        debug!("Required input for {} output ({})", output_amount, direction);
        self.pool.read().await.required_input_for_swap(output_amount, direction)
    }

    async fn quote_swap(&self, input_amount: Balance, direction: Direction) -> Result<SwapQuote> {
        self.pool.read().await.quote_swap(input_amount, direction)
    }

    fn min_output_for(&self, expected_output: Balance) -> Balance {
        math::apply_slippage_tolerance(expected_output, self.trading.slippage_tolerance_percent)
    }

    async fn pool_details(&self) -> PoolDetails {
        self.pool.read().await.pool_details()
    }

    async fn holdings(&self, account: &AccountId) -> Holdings {
        self.pool.read().await.holdings(account)
    }
}

pub struct PoolServiceBuilder {
    config: Option<Config>,
    pool: Option<ConstantProductPool>,
}

impl PoolServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            pool: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Start from an existing pool instead of an empty one
    pub fn with_pool(mut self, pool: ConstantProductPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> Result<PoolService> {
        let config = self.config
            .ok_or_else(|| PoolError::Config("Config is required".to_string()))?;
        config.validate()?;

        let pool = match self.pool {
            Some(pool) => pool,
            None => ConstantProductPool::new(
                config.pool_config().fee_per_mille,
                config.pool_config().baseline_shares,
            )?,
        };

        info!(
            "Pool service ready: {}/{} fee {}‰",
            config.pool_config().token_a,
            config.pool_config().token_b,
            pool.state().fee_per_mille()
        );
        Ok(PoolService::new(
            pool,
            config.faucet_config().clone(),
            config.trading_config().clone(),
        ))
    }
}

impl Default for PoolServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pool::PoolState, types::BASELINE_SHARES};
    use futures::future::join_all;
    use rust_decimal_macros::dec;

    fn service() -> PoolService {
        PoolServiceBuilder::new()
            .with_config(Config::default())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_builder_requires_config() {
        assert!(matches!(PoolServiceBuilder::new().build(), Err(PoolError::Config(_))));

        let mut config = Config::default();
        config.pool.fee_per_mille = 5000;
        assert!(PoolServiceBuilder::new().with_config(config).build().is_err());
    }

    #[tokio::test]
    async fn test_builder_with_existing_pool() {
        let pool = ConstantProductPool::from_state(PoolState::from_reserves(1000, 1000, BASELINE_SHARES).unwrap());
        let service = PoolServiceBuilder::new()
            .with_config(Config::default())
            .with_pool(pool)
            .build()
            .unwrap();
        assert_eq!(service.swap_estimate(100, Direction::AtoB).await.unwrap(), 91);
    }

    #[tokio::test]
    async fn test_full_flow() {
        let service = service();
        let alice = AccountId::from("alice");

        service.faucet(&alice, 10_000, 10_000).await.unwrap();
        let shares = service.provide(&alice, 1000, 1000).await.unwrap();
        assert_eq!(shares, BASELINE_SHARES);

        let output = service.swap(&alice, 100, Direction::AtoB, None).await.unwrap();
        assert_eq!(output, 91);

        let details = service.pool_details().await;
        assert_eq!((details.reserve_a, details.reserve_b), (1100, 909));

        let (a, b) = service.withdraw(&alice, shares).await.unwrap();
        assert_eq!((a, b), (1100, 909));
        assert_eq!(service.holdings(&alice).await, Holdings {
            balance_a: 10_000,
            balance_b: 10_000,
            share_balance: 0,
        });
    }

    #[tokio::test]
    async fn test_faucet_limits() {
        let mut config = Config::default();
        config.faucet.max_amount_a = 100;
        let service = PoolServiceBuilder::new().with_config(config.clone()).build().unwrap();
        let alice = AccountId::from("alice");

        assert!(matches!(
            service.faucet(&alice, 101, 0).await,
            Err(PoolError::FaucetLimitExceeded { requested: 101, max: 100 })
        ));
        assert!(service.faucet(&alice, 100, 0).await.is_ok());

        config.faucet.enabled = false;
        let disabled = PoolServiceBuilder::new().with_config(config).build().unwrap();
        assert!(matches!(disabled.faucet(&alice, 1, 1).await, Err(PoolError::FaucetDisabled)));
        assert_eq!(disabled.holdings(&alice).await, Holdings::default());
    }

    #[tokio::test]
    async fn test_min_output_for_uses_tolerance() {
        let mut config = Config::default();
        config.trading.slippage_tolerance_percent = dec!(2);
        let service = PoolServiceBuilder::new().with_config(config).build().unwrap();
        assert_eq!(service.min_output_for(1000), 980);
    }

    #[tokio::test]
    async fn test_swap_with_stale_minimum_is_rejected() {
        let service = service();
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        service.faucet(&alice, 100_000, 100_000).await.unwrap();
        service.faucet(&bob, 100_000, 100_000).await.unwrap();
        service.provide(&alice, 10_000, 10_000).await.unwrap();

        let quoted = service.swap_estimate(1000, Direction::AtoB).await.unwrap();
        // Someone else moves the price before bob's swap lands.
        service.swap(&alice, 5000, Direction::AtoB, None).await.unwrap();

        assert!(matches!(
            service.swap(&bob, 1000, Direction::AtoB, Some(quoted)).await,
            Err(PoolError::SlippageExceeded { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_are_serialized() {
        let service = service();
        let lp = AccountId::from("lp");
        service.faucet(&lp, 1_000_000_000, 1_000_000_000).await.unwrap();
        service.provide(&lp, 500_000_000, 500_000_000).await.unwrap();

        let traders: Vec<AccountId> = (0..16).map(|i| AccountId::new(format!("trader-{}", i))).collect();
        for trader in &traders {
            service.faucet(trader, 1_000_000, 1_000_000).await.unwrap();
        }

        let supply_before = {
            let pool = service.pool();
            let guard = pool.read().await;
            let (a, b, _) = guard.ledger().totals();
            (a + guard.state().reserve_a() as u128, b + guard.state().reserve_b() as u128)
        };

        let tasks = traders.iter().enumerate().map(|(i, trader)| {
            let service = service.clone();
            let trader = trader.clone();
            tokio::spawn(async move {
                let direction = if i % 2 == 0 { Direction::AtoB } else { Direction::BtoA };
                for round in 0..10u64 {
                    service.swap(&trader, 1_000 + round * 37, direction, None).await.unwrap();
                }
            })
        });
        for result in join_all(tasks).await {
            result.unwrap();
        }

        let pool = service.pool();
        let guard = pool.read().await;
        let (a, b, shares) = guard.ledger().totals();
        assert_eq!(
            (a + guard.state().reserve_a() as u128, b + guard.state().reserve_b() as u128),
            supply_before
        );
        assert_eq!(shares, guard.state().total_shares() as u128);
        assert_eq!(
            guard.state().invariant_k(),
            guard.state().reserve_a() as u128 * guard.state().reserve_b() as u128
        );
    }
}
