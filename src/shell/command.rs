use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use rust_decimal::Decimal;

use crate::types::{AccountId, Direction, Token};

/// One line of shell input. Amounts stay decimal until the shell scales them
/// with the relevant token's precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Faucet { account: AccountId, amount_a: Decimal, amount_b: Decimal },
    Provide { account: AccountId, amount_a: Decimal, amount_b: Decimal },
    Withdraw { account: AccountId, shares: Decimal },
    Swap {
        account: AccountId,
        direction: Direction,
        amount: Decimal,
        min_output: Option<Decimal>,
    },
    Equivalent { token: Token, amount: Decimal },
    EstimateWithdraw { shares: Decimal },
    EstimateSwap { direction: Direction, amount: Decimal },
    RequiredInput { direction: Direction, output: Decimal },
    Quote { direction: Direction, amount: Decimal },
    Pool,
    Holdings { account: AccountId },
    Help,
}

pub const USAGE: &str = "\
commands:
  faucet <account> <amount_a> <amount_b>
  provide <account> <amount_a> <amount_b>
  withdraw <account> <shares>
  swap <account> <a2b|b2a> <amount> [min_output]
  equivalent <a|b> <amount>
  estimate-withdraw <shares>
  estimate-swap <a2b|b2a> <amount>
  required-input <a2b|b2a> <output>
  quote <a2b|b2a> <amount>
  pool
  holdings <account>
  help";

struct Args<'a> {
    name: &'a str,
    parts: std::slice::Iter<'a, &'a str>,
}

impl<'a> Args<'a> {
    fn next(&mut self, what: &str) -> anyhow::Result<&'a str> {
        self.parts
            .next()
            .copied()
            .ok_or_else(|| anyhow!("{}: missing <{}>", self.name, what))
    }

    fn account(&mut self) -> anyhow::Result<AccountId> {
        Ok(AccountId::from_str(self.next("account")?)?)
    }

    fn decimal(&mut self, what: &str) -> anyhow::Result<Decimal> {
        let raw = self.next(what)?;
        Decimal::from_str(raw).with_context(|| format!("{}: invalid {} '{}'", self.name, what, raw))
    }

    fn direction(&mut self) -> anyhow::Result<Direction> {
        Ok(Direction::from_str(self.next("direction")?)?)
    }

    fn finish(mut self) -> anyhow::Result<()> {
        if let Some(extra) = self.parts.next() {
            bail!("{}: unexpected argument '{}'", self.name, extra);
        }
        Ok(())
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let Some((&name, rest)) = words.split_first() else {
            bail!("empty command");
        };
        let mut args = Args {
            name,
            parts: rest.iter(),
        };

        let command = match name.to_lowercase().as_str() {
            "faucet" => Command::Faucet {
                account: args.account()?,
                amount_a: args.decimal("amount_a")?,
                amount_b: args.decimal("amount_b")?,
            },
            "provide" => Command::Provide {
                account: args.account()?,
                amount_a: args.decimal("amount_a")?,
                amount_b: args.decimal("amount_b")?,
            },
            "withdraw" => Command::Withdraw {
                account: args.account()?,
                shares: args.decimal("shares")?,
            },
            "swap" => {
                let account = args.account()?;
                let direction = args.direction()?;
                let amount = args.decimal("amount")?;
                let min_output = match args.parts.len() {
                    0 => None,
                    _ => Some(args.decimal("min_output")?),
                };
                Command::Swap { account, direction, amount, min_output }
            }
            "equivalent" => Command::Equivalent {
                token: Token::from_str(args.next("token")?)?,
                amount: args.decimal("amount")?,
            },
            "estimate-withdraw" => Command::EstimateWithdraw {
                shares: args.decimal("shares")?,
            },
            "estimate-swap" => Command::EstimateSwap {
                direction: args.direction()?,
                amount: args.decimal("amount")?,
            },
            "required-input" => Command::RequiredInput {
                direction: args.direction()?,
                output: args.decimal("output")?,
            },
            "quote" => Command::Quote {
                direction: args.direction()?,
                amount: args.decimal("amount")?,
            },
            "pool" => Command::Pool,
            "holdings" => Command::Holdings {
                account: args.account()?,
            },
            "help" | "?" => Command::Help,
            other => bail!("unknown command '{}'; try 'help'", other),
        };

        args.finish()?;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_mutations() {
        assert_eq!(
            "provide alice 1.5 3".parse::<Command>().unwrap(),
            Command::Provide {
                account: AccountId::from("alice"),
                amount_a: dec!(1.5),
                amount_b: dec!(3),
            }
        );
        assert_eq!(
            "SWAP bob b2a 10".parse::<Command>().unwrap(),
            Command::Swap {
                account: AccountId::from("bob"),
                direction: Direction::BtoA,
                amount: dec!(10),
                min_output: None,
            }
        );
        assert_eq!(
            "swap bob a2b 10 9.5".parse::<Command>().unwrap(),
            Command::Swap {
                account: AccountId::from("bob"),
                direction: Direction::AtoB,
                amount: dec!(10),
                min_output: Some(dec!(9.5)),
            }
        );
    }

    #[test]
    fn test_parse_estimators() {
        assert_eq!(
            "equivalent b 2".parse::<Command>().unwrap(),
            Command::Equivalent { token: Token::B, amount: dec!(2) }
        );
        assert_eq!(
            "required-input a2b 0.5".parse::<Command>().unwrap(),
            Command::RequiredInput { direction: Direction::AtoB, output: dec!(0.5) }
        );
        assert_eq!("pool".parse::<Command>().unwrap(), Command::Pool);
        assert_eq!("  help  ".parse::<Command>().unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_errors() {
        let err = "provide alice 1".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("missing <amount_b>"));

        let err = "pool now".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("unexpected argument"));

        assert!("swap bob sideways 1".parse::<Command>().is_err());
        assert!("withdraw bob lots".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
