use async_trait::async_trait;

use crate::types::{AccountId, Balance, Direction, Holdings, PoolDetails, Result, SwapQuote, Token};

/// Caller-facing surface of a shared pool
#[async_trait]
pub trait PoolHandle: Send + Sync {
    // ========== MUTATIONS ==========
    async fn faucet(&self, account: &AccountId, amount_a: Balance, amount_b: Balance) -> Result<Holdings>;

    async fn provide(&self, account: &AccountId, amount_a: Balance, amount_b: Balance) -> Result<Balance>;

    async fn withdraw(&self, account: &AccountId, share_amount: Balance) -> Result<(Balance, Balance)>;

    /// Swap; `min_output` of `None` accepts any output
    async fn swap(
        &self,
        account: &AccountId,
        input_amount: Balance,
        direction: Direction,
        min_output: Option<Balance>,
    ) -> Result<Balance>;

    // ========== ESTIMATORS ==========
    async fn equivalent_amount(&self, known_amount: Balance, known: Token) -> Result<Balance>;

    async fn withdraw_estimate(&self, share_amount: Balance) -> Result<(Balance, Balance)>;

    async fn swap_estimate(&self, input_amount: Balance, direction: Direction) -> Result<Balance>;

    async fn required_input_for_swap(&self, output_amount: Balance, direction: Direction) -> Result<Balance>;

    async fn quote_swap(&self, input_amount: Balance, direction: Direction) -> Result<SwapQuote>;

    /// Lowest acceptable output for an expected amount under the configured tolerance
    fn min_output_for(&self, expected_output: Balance) -> Balance;

    // ========== READ-OUTS ==========
    async fn pool_details(&self) -> PoolDetails;

    async fn holdings(&self, account: &AccountId) -> Holdings;
}
