//! Ratio, borrowing power and liquidation sizing.
//!
//! Values are carried at 18 decimals. Cross-currency values go through the
//! oracle; sUSD is the reference and is always priced at 1.0.

use fixed_point::{div_decimal, mul_decimal, UNIT};
use soroban_sdk::{log, symbol_short, Env, Symbol};

use crate::error::Error;
use crate::interfaces::PriceOracleClient;
use crate::storage::{read_collaborators, read_collateral_key};
use crate::types::{Loan, LoanConfig};

pub const SUSD: Symbol = symbol_short!("sUSD");

/// Fails with `InvalidRate` when the price is stale or not positive.
pub fn price(env: &Env, asset: &Symbol) -> Result<i128, Error> {
    if *asset == SUSD {
        return Ok(UNIT);
    }
    let oracle = PriceOracleClient::new(env, &read_collaborators(env)?.oracle);
    let (rate, stale) = oracle.price(asset);
    if stale || rate <= 0 {
        log!(env, "invalid rate for {}", asset.clone());
        return Err(Error::InvalidRate);
    }
    Ok(rate)
}

/// `amount` of `src` expressed in `dest`.
pub fn effective_value(
    env: &Env,
    src: &Symbol,
    amount: i128,
    dest: &Symbol,
) -> Result<i128, Error> {
    if src == dest {
        return Ok(amount);
    }
    let value = mul_decimal(env, amount, price(env, src)?)?;
    Ok(div_decimal(env, value, price(env, dest)?)?)
}

/// Collateral value over debt, both in the loan currency.
/// A loan without debt has an unbounded ratio.
pub fn collateral_ratio(env: &Env, loan: &Loan) -> Result<i128, Error> {
    if loan.amount == 0 {
        return Ok(i128::MAX);
    }
    let key = read_collateral_key(env)?;
    let value = effective_value(env, &key, loan.collateral, &loan.currency)?;
    Ok(div_decimal(env, value, loan.amount)?)
}

/// Most debt in `currency` that `collateral` can back at the minimum ratio.
pub fn max_loan(
    env: &Env,
    config: &LoanConfig,
    collateral: i128,
    currency: &Symbol,
) -> Result<i128, Error> {
    let key = read_collateral_key(env)?;
    let value = effective_value(env, &key, collateral, currency)?;
    Ok(div_decimal(env, value, config.min_cratio)?)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LiquidationSize {
    /// At or above the minimum ratio.
    Healthy,
    /// Repaying this much debt value restores the minimum ratio.
    Partial(i128),
    /// No partial repayment can restore the ratio.
    Full,
}

/// Solves `x = (D - V/c) / (1 - (1 + P)/c)` for the debt value `x` that,
/// once repaid with `x * (1 + P)` of collateral handed to the liquidator,
/// leaves the loan exactly at ratio `c`.
pub fn liquidation_size(
    env: &Env,
    debt_value: i128,
    collateral_value: i128,
    min_cratio: i128,
    penalty: i128,
) -> Result<LiquidationSize, Error> {
    let backed = div_decimal(env, collateral_value, min_cratio)?;
    if debt_value <= backed {
        return Ok(LiquidationSize::Healthy);
    }

    let divisor = UNIT - div_decimal(env, UNIT + penalty, min_cratio)?;
    if divisor <= 0 {
        return Ok(LiquidationSize::Full);
    }
    Ok(LiquidationSize::Partial(div_decimal(
        env,
        debt_value - backed,
        divisor,
    )?))
}

/// Debt, in the loan currency, a liquidator should repay. Never negative
/// and never more than the outstanding debt.
pub fn liquidation_amount(env: &Env, config: &LoanConfig, loan: &Loan) -> Result<i128, Error> {
    if loan.amount == 0 {
        return Ok(0);
    }
    let key = read_collateral_key(env)?;
    let debt_value = effective_value(env, &loan.currency, loan.amount, &SUSD)?;
    let collateral_value = effective_value(env, &key, loan.collateral, &SUSD)?;

    let size = liquidation_size(
        env,
        debt_value,
        collateral_value,
        config.min_cratio,
        config.liquidation_penalty,
    )?;
    let amount = match size {
        LiquidationSize::Healthy => 0,
        LiquidationSize::Full => loan.amount,
        LiquidationSize::Partial(value) => effective_value(env, &SUSD, value, &loan.currency)?,
    };
    Ok(amount.clamp(0, loan.amount))
}

/// Collateral owed for repaying `amount` of `currency`, penalty included.
pub fn collateral_redeemed(
    env: &Env,
    config: &LoanConfig,
    currency: &Symbol,
    amount: i128,
) -> Result<i128, Error> {
    let key = read_collateral_key(env)?;
    let value = effective_value(env, currency, amount, &key)?;
    Ok(mul_decimal(env, value, UNIT + config.liquidation_penalty)?)
}

#[cfg(test)]
mod test {
    use super::*;

    const MIN_CRATIO: i128 = 1_500_000_000_000_000_000;
    const PENALTY: i128 = 100_000_000_000_000_000;

    fn size(env: &Env, debt: i128, collateral: i128) -> LiquidationSize {
        liquidation_size(env, debt, collateral, MIN_CRATIO, PENALTY).unwrap()
    }

    #[test]
    fn test_healthy_at_min_ratio() {
        let env = Env::default();
        // 2 ETH at $75 against 100 sUSD is exactly 150%
        assert_eq!(size(&env, 100 * UNIT, 150 * UNIT), LiquidationSize::Healthy);
        assert_eq!(size(&env, 100 * UNIT, 200 * UNIT), LiquidationSize::Healthy);
    }

    #[test]
    fn test_partial_sizes() {
        let env = Env::default();
        assert_eq!(
            size(&env, 100 * UNIT, 140 * UNIT),
            LiquidationSize::Partial(24_999_999_999_999_999_970)
        );
        assert_eq!(
            size(&env, 100 * UNIT, 120 * UNIT),
            LiquidationSize::Partial(74_999_999_999_999_999_906)
        );
        // 1.5 ETH at $75 and at $90
        assert_eq!(
            size(&env, 100 * UNIT, 112_500_000_000_000_000_000),
            LiquidationSize::Partial(93_749_999_999_999_999_882)
        );
        assert_eq!(
            size(&env, 100 * UNIT, 135 * UNIT),
            LiquidationSize::Partial(37_499_999_999_999_999_953)
        );
    }

    #[test]
    fn test_size_grows_as_collateral_value_falls() {
        let env = Env::default();
        let mut last = 0;
        for price in [74, 70, 65, 60, 55, 50] {
            match size(&env, 100 * UNIT, 2 * price * UNIT) {
                LiquidationSize::Partial(x) => {
                    assert!(x > last);
                    last = x;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_positive_divisor_is_full() {
        let env = Env::default();
        // (1 + 0.1) / 1.05 > 1
        let result = liquidation_size(&env, 100 * UNIT, 140 * UNIT, 1_050_000_000_000_000_000, PENALTY);
        assert_eq!(result, Ok(LiquidationSize::Full));
        // (1 + 0.5) / 1.5 == 1
        let result = liquidation_size(&env, 100 * UNIT, 140 * UNIT, MIN_CRATIO, UNIT / 2);
        assert_eq!(result, Ok(LiquidationSize::Full));
    }

    #[test]
    fn test_zero_min_ratio_is_an_error() {
        let env = Env::default();
        assert_eq!(
            liquidation_size(&env, 100 * UNIT, 140 * UNIT, 0, PENALTY),
            Err(Error::DivisionByZero)
        );
    }
}
