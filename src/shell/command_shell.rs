use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    service::PoolHandle,
    shell::command::{Command, USAGE},
    types::{Balance, PRECISION_DECIMALS, PoolError, Result, Token, TokenAmount, TokenInfo},
    utils::config::PoolConfig,
};

#[derive(Debug, Serialize)]
struct PoolView {
    reserve_a: Decimal,
    reserve_b: Decimal,
    total_shares: Decimal,
    fee_per_mille: u64,
}

#[derive(Debug, Serialize)]
struct HoldingsView<'a> {
    account: &'a str,
    balance_a: Decimal,
    balance_b: Decimal,
    share_balance: Decimal,
}

/// Executes text commands against a pool and renders one line of output each
pub struct CommandShell {
    handle: Arc<dyn PoolHandle>,
    token_a: TokenInfo,
    token_b: TokenInfo,
    shares: TokenInfo,
}

impl CommandShell {
    pub fn new(handle: Arc<dyn PoolHandle>, pool_config: &PoolConfig) -> Self {
        Self {
            handle,
            token_a: pool_config.token_a.clone(),
            token_b: pool_config.token_b.clone(),
            shares: TokenInfo::new("SHARES", PRECISION_DECIMALS as u8),
        }
    }

    fn token(&self, token: Token) -> &TokenInfo {
        match token {
            Token::A => &self.token_a,
            Token::B => &self.token_b,
        }
    }

    fn amount(&self, token: Token, raw: Balance) -> TokenAmount {
        TokenAmount::new(self.token(token).clone(), raw)
    }

    fn pair(&self, amount_a: Balance, amount_b: Balance) -> String {
        format!("{} / {}", self.amount(Token::A, amount_a), self.amount(Token::B, amount_b))
    }

    pub async fn execute_line(&self, line: &str) -> Result<String> {
        let command: Command = line.parse().map_err(|e: anyhow::Error| PoolError::Parse(e.to_string()))?;
        self.execute(command).await
    }

    pub async fn execute(&self, command: Command) -> Result<String> {
        match command {
            Command::Faucet { account, amount_a, amount_b } => {
                let holdings = self
                    .handle
                    .faucet(&account, self.token_a.to_raw(amount_a)?, self.token_b.to_raw(amount_b)?)
                    .await?;
                Ok(format!(
                    "{} now holds {}",
                    account,
                    self.pair(holdings.balance_a, holdings.balance_b)
                ))
            }
            Command::Provide { account, amount_a, amount_b } => {
                let shares = self
                    .handle
                    .provide(&account, self.token_a.to_raw(amount_a)?, self.token_b.to_raw(amount_b)?)
                    .await?;
                Ok(format!("{} received {}", account, TokenAmount::new(self.shares.clone(), shares)))
            }
            Command::Withdraw { account, shares } => {
                let (amount_a, amount_b) = self.handle.withdraw(&account, self.shares.to_raw(shares)?).await?;
                Ok(format!("{} received {}", account, self.pair(amount_a, amount_b)))
            }
            Command::Swap { account, direction, amount, min_output } => {
                let input = self.token(direction.input()).to_raw(amount)?;
                let min_output = match min_output {
                    Some(min) => self.token(direction.output()).to_raw(min)?,
                    None => {
                        let expected = self.handle.swap_estimate(input, direction).await?;
                        self.handle.min_output_for(expected)
                    }
                };
                let output = self.handle.swap(&account, input, direction, Some(min_output)).await?;
                Ok(format!("{} received {}", account, self.amount(direction.output(), output)))
            }
            Command::Equivalent { token, amount } => {
                let required = self.handle.equivalent_amount(self.token(token).to_raw(amount)?, token).await?;
                Ok(self.amount(token.other(), required).to_string())
            }
            Command::EstimateWithdraw { shares } => {
                let (amount_a, amount_b) = self.handle.withdraw_estimate(self.shares.to_raw(shares)?).await?;
                Ok(self.pair(amount_a, amount_b))
            }
            Command::EstimateSwap { direction, amount } => {
                let input = self.token(direction.input()).to_raw(amount)?;
                let output = self.handle.swap_estimate(input, direction).await?;
                Ok(self.amount(direction.output(), output).to_string())
            }
            Command::RequiredInput { direction, output } => {
                let output = self.token(direction.output()).to_raw(output)?;
                let input = self.handle.required_input_for_swap(output, direction).await?;
                Ok(self.amount(direction.input(), input).to_string())
            }
            Command::Quote { direction, amount } => {
                let input = self.token(direction.input()).to_raw(amount)?;
                let quote = self.handle.quote_swap(input, direction).await?;
                Ok(serde_json::to_string(&quote)?)
            }
            Command::Pool => {
                let details = self.handle.pool_details().await;
                let view = PoolView {
                    reserve_a: self.token_a.to_decimal(details.reserve_a),
                    reserve_b: self.token_b.to_decimal(details.reserve_b),
                    total_shares: self.shares.to_decimal(details.total_shares),
                    fee_per_mille: details.fee_per_mille,
                };
                Ok(serde_json::to_string(&view)?)
            }
            Command::Holdings { account } => {
                let holdings = self.handle.holdings(&account).await;
                let view = HoldingsView {
                    account: account.as_str(),
                    balance_a: self.token_a.to_decimal(holdings.balance_a),
                    balance_b: self.token_b.to_decimal(holdings.balance_b),
                    share_balance: self.shares.to_decimal(holdings.share_balance),
                };
                Ok(serde_json::to_string(&view)?)
            }
            Command::Help => Ok(USAGE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{service::PoolServiceBuilder, utils::config::Config};

    fn shell() -> CommandShell {
        let config = Config::default();
        let service = PoolServiceBuilder::new().with_config(config.clone()).build().unwrap();
        CommandShell::new(Arc::new(service), config.pool_config())
    }

    #[tokio::test]
    async fn test_session() {
        let shell = shell();

        assert_eq!(
            shell.execute_line("faucet alice 100 200").await.unwrap(),
            "alice now holds 100 TKA / 200 TKB"
        );
        assert_eq!(
            shell.execute_line("provide alice 10 20").await.unwrap(),
            "alice received 100 SHARES"
        );
        assert_eq!(shell.execute_line("equivalent a 1").await.unwrap(), "2 TKB");
        assert_eq!(
            shell.execute_line("estimate-withdraw 50").await.unwrap(),
            "5 TKA / 10 TKB"
        );

        let pool = shell.execute_line("pool").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&pool).unwrap();
        assert_eq!(parsed["fee_per_mille"], 0);
        assert_eq!(parsed["reserve_a"], "10");

        let received = shell.execute_line("swap alice a2b 1").await.unwrap();
        assert!(received.starts_with("alice received 1.8"));

        let holdings = shell.execute_line("holdings alice").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&holdings).unwrap();
        assert_eq!(parsed["account"], "alice");
        assert_eq!(parsed["share_balance"], "100");
    }

    #[tokio::test]
    async fn test_errors_surface() {
        let shell = shell();
        assert!(matches!(
            shell.execute_line("swap alice a2b 1").await,
            Err(PoolError::ZeroLiquidity)
        ));
        assert!(matches!(shell.execute_line("launch rockets").await, Err(PoolError::Parse(_))));
        assert!(matches!(
            shell.execute_line("faucet alice 0.0000001 1").await,
            Err(PoolError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_explicit_min_output() {
        let shell = shell();
        shell.execute_line("faucet alice 100 100").await.unwrap();
        shell.execute_line("provide alice 10 10").await.unwrap();
        assert!(matches!(
            shell.execute_line("swap alice a2b 1 1").await,
            Err(PoolError::SlippageExceeded { .. })
        ));
        assert!(shell.execute_line("swap alice a2b 1 0.9").await.is_ok());
    }

    #[tokio::test]
    async fn test_quote_and_required_input() {
        let shell = shell();
        shell.execute_line("faucet alice 100 100").await.unwrap();
        shell.execute_line("provide alice 10 10").await.unwrap();

        let quote = shell.execute_line("quote a2b 1").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&quote).unwrap();
        assert_eq!(parsed["output_amount"], 909_091);

        assert_eq!(shell.execute_line("required-input a2b 0.909091").await.unwrap(), "1 TKA");
        assert!(shell.execute_line("help").await.unwrap().contains("provide"));
    }
}
