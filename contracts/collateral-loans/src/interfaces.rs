//! Clients for the contracts the loan engine depends on.

use soroban_sdk::{contractclient, Address, Env, Symbol};

#[contractclient(name = "PriceOracleClient")]
pub trait PriceOracle {
    /// Returns `(price, is_stale)` at 18 decimals.
    fn price(env: Env, asset: Symbol) -> (i128, bool);
}

#[contractclient(name = "CurrencyIssuerClient")]
pub trait CurrencyIssuer {
    fn mint(env: Env, to: Address, currency: Symbol, amount: i128);
    fn burn(env: Env, from: Address, currency: Symbol, amount: i128);
    fn balance(env: Env, id: Address, currency: Symbol) -> i128;
}

#[contractclient(name = "FeeSinkClient")]
pub trait FeeSink {
    fn receive_fee(env: Env, currency: Symbol, amount: i128);
}

#[contractclient(name = "SystemStatusClient")]
pub trait SystemStatus {
    fn is_suspended(env: Env, section: Symbol) -> bool;
}

#[contractclient(name = "ManagerClient")]
pub trait Manager {
    /// Per-second borrow rate and whether any rate behind it was invalid.
    fn borrow_rate(env: Env) -> (i128, bool);
    /// Whether `amount` more of `currency` fits under the debt ceiling.
    fn can_issue(env: Env, amount: i128, currency: Symbol) -> (bool, bool);
    fn increment_longs(env: Env, collateral: Address, currency: Symbol, amount: i128) -> i128;
    fn decrement_longs(env: Env, collateral: Address, currency: Symbol, amount: i128) -> i128;
}
