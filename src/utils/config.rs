use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{BASELINE_SHARES, Balance, PRECISION_DECIMALS, PRECISION_SCALE, PoolError, Result, TokenInfo};
use crate::utils::math::FEE_DENOMINATOR;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const ENV_PREFIX: &str = "POOL";

/// Simple, focused configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pool parameters
    pub pool: PoolConfig,

    /// Test-token faucet
    pub faucet: FaucetConfig,

    /// Swap defaults
    pub trading: TradingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub token_a: TokenInfo,
    pub token_b: TokenInfo,

    /// Trading fee in thousandths of the input
    pub fee_per_mille: u64,

    /// Shares minted by the first deposit
    pub baseline_shares: Balance,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            token_a: TokenInfo::new("TKA", PRECISION_DECIMALS as u8).with_name("Token A"),
            token_b: TokenInfo::new("TKB", PRECISION_DECIMALS as u8).with_name("Token B"),
            fee_per_mille: 0,
            baseline_shares: BASELINE_SHARES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    pub enabled: bool,

    /// Per-call cap on token A, raw units
    pub max_amount_a: Balance,

    /// Per-call cap on token B, raw units
    pub max_amount_b: Balance,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_amount_a: 1_000 * PRECISION_SCALE,
            max_amount_b: 1_000 * PRECISION_SCALE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Slippage tolerance percentage applied when a swap names no minimum output
    pub slippage_tolerance_percent: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            slippage_tolerance_percent: dec!(1.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

impl Config {
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool
    }

    pub fn faucet_config(&self) -> &FaucetConfig {
        &self.faucet
    }

    pub fn trading_config(&self) -> &TradingConfig {
        &self.trading
    }

    pub fn logging_config(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Load config from `config.toml` (if present) and `POOL__*` env vars
    pub fn load() -> Result<Self> {
        Self::layered(DEFAULT_CONFIG_PATH, false)
    }

    /// Defaults, then the file at `path`, then environment overrides.
    /// The file must exist.
    pub fn load_layered(path: &str) -> Result<Self> {
        Self::layered(path, true)
    }

    fn layered(path: &str, required: bool) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PoolError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pool.fee_per_mille >= FEE_DENOMINATOR {
            return Err(PoolError::Config(format!(
                "pool.fee_per_mille must be below {}",
                FEE_DENOMINATOR
            )));
        }

        if self.pool.baseline_shares == 0 {
            return Err(PoolError::Config("pool.baseline_shares must be positive".into()));
        }

        for token in [&self.pool.token_a, &self.pool.token_b] {
            if token.decimals as u32 != PRECISION_DECIMALS {
                return Err(PoolError::Config(format!(
                    "token {} has {} decimals, pool arithmetic uses {}",
                    token.symbol, token.decimals, PRECISION_DECIMALS
                )));
            }
        }

        if self.pool.token_a.symbol == self.pool.token_b.symbol {
            return Err(PoolError::Config("pool tokens must have distinct symbols".into()));
        }

        let tolerance = self.trading.slippage_tolerance_percent;
        if tolerance.is_sign_negative() || tolerance >= Decimal::ONE_HUNDRED {
            return Err(PoolError::Config(format!(
                "trading.slippage_tolerance_percent must be in [0, 100), got {}",
                tolerance
            )));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(PoolError::Config(format!("unknown log level: {}", self.logging.level)));
        }

        Ok(())
    }
}
