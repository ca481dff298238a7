#![no_std]

use fixed_point::{div_decimal, mul_decimal};
use soroban_sdk::{
    contract, contractclient, contractimpl, log, symbol_short, Address, Env, Symbol, Vec,
};

mod error;
mod storage;

pub use error::Error;

use storage::{
    extend_instance, get_base_borrow_rate, get_collaterals, get_currencies, get_issuer,
    get_long, get_max_debt, get_oracle, get_owner, get_utilisation_multiplier, is_initialized,
    set_base_borrow_rate, set_collaterals, set_currencies, set_initialized, set_issuer,
    set_long, set_max_debt, set_oracle, set_owner, set_utilisation_multiplier,
};

pub const SECONDS_IN_A_YEAR: i128 = 31_556_926;

/// Reference currency every long is valued in. Always priced at 1.0.
pub const SUSD: Symbol = symbol_short!("sUSD");

#[contractclient(name = "ExchangeRatesClient")]
pub trait ExchangeRates {
    /// Returns `(price, is_stale)` at 18 decimals.
    fn price(env: Env, asset: Symbol) -> (i128, bool);
}

#[contractclient(name = "DebtIssuerClient")]
pub trait DebtIssuer {
    /// Total system debt denominated in `currency`.
    fn total_issued(env: Env, currency: Symbol) -> i128;
}

pub enum Role {
    Owner,
    Collateral,
}

fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), Error> {
    caller.require_auth();
    let allowed = match role {
        Role::Owner => *caller == get_owner(env)?,
        Role::Collateral => get_collaterals(env).contains(caller),
    };
    if !allowed {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

fn usd_value(env: &Env, currency: &Symbol, amount: i128) -> Result<(i128, bool), Error> {
    if *currency == SUSD {
        return Ok((amount, false));
    }
    let oracle = ExchangeRatesClient::new(env, &get_oracle(env)?);
    let (rate, stale) = oracle.price(currency);
    Ok((mul_decimal(env, amount, rate)?, stale || rate <= 0))
}

fn compute_total_long(env: &Env) -> Result<(i128, bool), Error> {
    let mut total: i128 = 0;
    let mut any_invalid = false;
    for currency in get_currencies(env).iter() {
        let long = get_long(env, &currency);
        if long == 0 {
            continue;
        }
        let (value, invalid) = usd_value(env, &currency, long)?;
        total = total.checked_add(value).ok_or(Error::ArithmeticOverflow)?;
        any_invalid = any_invalid || invalid;
    }
    Ok((total, any_invalid))
}

fn compute_total_issued(env: &Env) -> Result<i128, Error> {
    let issuer = DebtIssuerClient::new(env, &get_issuer(env)?);
    Ok(issuer.total_issued(&SUSD))
}

#[contract]
pub struct CollateralManager;

#[contractimpl]
impl CollateralManager {
    pub fn initialize(
        env: Env,
        owner: Address,
        oracle: Address,
        issuer: Address,
        max_debt: i128,
        base_borrow_rate: i128,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        owner.require_auth();

        if max_debt <= 0 || base_borrow_rate < 0 {
            return Err(Error::InvalidConfig);
        }

        set_owner(&env, &owner);
        set_oracle(&env, &oracle);
        set_issuer(&env, &issuer);
        set_max_debt(&env, max_debt);
        set_base_borrow_rate(&env, base_borrow_rate);
        set_collaterals(&env, &Vec::new(&env));
        set_currencies(&env, &Vec::new(&env));
        set_initialized(&env);
        extend_instance(&env);

        log!(&env, "CollateralManager: Initialized");
        Ok(())
    }

    pub fn bump_instance(env: Env) {
        extend_instance(&env);
    }

    // ==========================================================
    // Owner setters
    // ==========================================================

    /// Per-second floor rate at 18 decimals.
    pub fn set_base_borrow_rate(env: Env, caller: Address, rate: i128) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        if rate < 0 {
            return Err(Error::InvalidConfig);
        }
        extend_instance(&env);
        set_base_borrow_rate(&env, rate);

        env.events().publish((symbol_short!("base_rate"),), rate);
        Ok(())
    }

    pub fn set_utilisation_multiplier(
        env: Env,
        caller: Address,
        multiplier: i128,
    ) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        if multiplier <= 0 {
            return Err(Error::InvalidConfig);
        }
        extend_instance(&env);
        set_utilisation_multiplier(&env, multiplier);

        env.events().publish((symbol_short!("util_mul"),), multiplier);
        Ok(())
    }

    /// Ceiling on the aggregate of all longs, in sUSD.
    pub fn set_max_debt(env: Env, caller: Address, max_debt: i128) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        if max_debt <= 0 {
            return Err(Error::InvalidConfig);
        }
        extend_instance(&env);
        set_max_debt(&env, max_debt);

        env.events().publish((symbol_short!("max_debt"),), max_debt);
        Ok(())
    }

    pub fn add_collaterals(
        env: Env,
        caller: Address,
        collaterals: Vec<Address>,
    ) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut registered = get_collaterals(&env);
        for collateral in collaterals.iter() {
            if !registered.contains(&collateral) {
                registered.push_back(collateral.clone());
                env.events()
                    .publish((symbol_short!("coll_add"),), collateral);
            }
        }
        set_collaterals(&env, &registered);
        Ok(())
    }

    pub fn remove_collaterals(
        env: Env,
        caller: Address,
        collaterals: Vec<Address>,
    ) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut registered = get_collaterals(&env);
        for collateral in collaterals.iter() {
            let index = registered
                .first_index_of(&collateral)
                .ok_or(Error::UnknownCollateral)?;
            registered.remove(index);
            env.events()
                .publish((symbol_short!("coll_rem"),), collateral);
        }
        set_collaterals(&env, &registered);
        Ok(())
    }

    pub fn add_currencies(env: Env, caller: Address, currencies: Vec<Symbol>) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut supported = get_currencies(&env);
        for currency in currencies.iter() {
            if !supported.contains(&currency) {
                supported.push_back(currency);
            }
        }
        set_currencies(&env, &supported);
        Ok(())
    }

    pub fn remove_currencies(
        env: Env,
        caller: Address,
        currencies: Vec<Symbol>,
    ) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut supported = get_currencies(&env);
        for currency in currencies.iter() {
            let index = supported
                .first_index_of(&currency)
                .ok_or(Error::UnsupportedCurrency)?;
            supported.remove(index);
        }
        set_currencies(&env, &supported);
        Ok(())
    }

    // ==========================================================
    // Long bookkeeping (registered collateral contracts only)
    // ==========================================================

    pub fn increment_longs(
        env: Env,
        collateral: Address,
        currency: Symbol,
        amount: i128,
    ) -> Result<i128, Error> {
        require_role(&env, &collateral, Role::Collateral)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if !get_currencies(&env).contains(&currency) {
            return Err(Error::UnsupportedCurrency);
        }
        extend_instance(&env);

        let long = get_long(&env, &currency)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        set_long(&env, &currency, long);
        Ok(long)
    }

    pub fn decrement_longs(
        env: Env,
        collateral: Address,
        currency: Symbol,
        amount: i128,
    ) -> Result<i128, Error> {
        require_role(&env, &collateral, Role::Collateral)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        extend_instance(&env);

        let current = get_long(&env, &currency);
        if amount > current {
            log!(&env, "decrement {} exceeds long {}", amount, current);
            return Err(Error::InvalidAmount);
        }
        let long = current - amount;
        set_long(&env, &currency, long);
        Ok(long)
    }

    // ==========================================================
    // Aggregate views
    // ==========================================================

    pub fn long(env: Env, currency: Symbol) -> i128 {
        get_long(&env, &currency)
    }

    /// Sum of every long valued in sUSD, and whether any rate used was invalid.
    pub fn total_long(env: Env) -> Result<(i128, bool), Error> {
        compute_total_long(&env)
    }

    pub fn total_issued(env: Env) -> Result<i128, Error> {
        compute_total_issued(&env)
    }

    /// Per-second borrow rate: the base rate plus the annual utilisation
    /// (longs over system debt) spread across a year and scaled by the
    /// utilisation multiplier.
    pub fn borrow_rate(env: Env) -> Result<(i128, bool), Error> {
        let (total_long, invalid) = compute_total_long(&env)?;
        let total_issued = compute_total_issued(&env)?;

        let utilisation = if total_issued > 0 {
            div_decimal(&env, total_long, total_issued)? / SECONDS_IN_A_YEAR
        } else {
            0
        };
        let scaled = mul_decimal(&env, utilisation, get_utilisation_multiplier(&env))?;
        let rate = get_base_borrow_rate(&env)
            .checked_add(scaled)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok((rate, invalid))
    }

    /// Whether issuing `amount` more of `currency` keeps the aggregate
    /// within the debt ceiling, and whether any rate used was invalid.
    pub fn can_issue(env: Env, amount: i128, currency: Symbol) -> Result<(bool, bool), Error> {
        let (total_long, long_invalid) = compute_total_long(&env)?;
        let (value, value_invalid) = usd_value(&env, &currency, amount)?;
        let total = total_long
            .checked_add(value)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok((total <= get_max_debt(&env), long_invalid || value_invalid))
    }

    pub fn has_collateral(env: Env, collateral: Address) -> bool {
        get_collaterals(&env).contains(&collateral)
    }

    pub fn is_currency_supported(env: Env, currency: Symbol) -> bool {
        get_currencies(&env).contains(&currency)
    }

    pub fn base_borrow_rate(env: Env) -> i128 {
        get_base_borrow_rate(&env)
    }

    pub fn utilisation_multiplier(env: Env) -> i128 {
        get_utilisation_multiplier(&env)
    }

    pub fn max_debt(env: Env) -> i128 {
        get_max_debt(&env)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        get_owner(&env)
    }
}
