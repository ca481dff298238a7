use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::types::{Loan, LoanConfig};

// Event emitted when a loan is opened
pub fn loan_opened(env: &Env, loan: &Loan, fee: i128) {
    let topics = (symbol_short!("opened"), loan.account.clone(), loan.id);
    env.events().publish(
        topics,
        (loan.collateral, loan.amount, loan.currency.clone(), fee),
    );
}

pub fn collateral_deposited(env: &Env, loan: &Loan, amount: i128) {
    let topics = (symbol_short!("deposit"), loan.account.clone(), loan.id);
    env.events().publish(topics, (amount, loan.collateral));
}

pub fn collateral_withdrawn(env: &Env, loan: &Loan, amount: i128) {
    let topics = (symbol_short!("withdrawn"), loan.account.clone(), loan.id);
    env.events().publish(topics, (amount, loan.collateral));
}

pub fn loan_repaid(env: &Env, loan: &Loan, repayer: &Address, amount: i128) {
    let topics = (symbol_short!("repaid"), loan.account.clone(), loan.id);
    env.events()
        .publish(topics, (repayer.clone(), amount, loan.amount));
}

pub fn loan_drawn(env: &Env, loan: &Loan, amount: i128, fee: i128) {
    let topics = (symbol_short!("drawn"), loan.account.clone(), loan.id);
    env.events().publish(topics, (amount, fee, loan.amount));
}

// Partial liquidation leaves the loan open
pub fn loan_partially_liquidated(
    env: &Env,
    loan: &Loan,
    liquidator: &Address,
    amount: i128,
    collateral: i128,
) {
    let topics = (symbol_short!("liq_part"), loan.account.clone(), loan.id);
    env.events()
        .publish(topics, (liquidator.clone(), amount, collateral));
}

pub fn loan_liquidated(env: &Env, loan: &Loan, liquidator: &Address, collateral: i128) {
    let topics = (symbol_short!("liq_full"), loan.account.clone(), loan.id);
    env.events().publish(topics, (liquidator.clone(), collateral));
}

pub fn loan_closed(env: &Env, loan: &Loan, collateral: i128) {
    let topics = (symbol_short!("closed"), loan.account.clone(), loan.id);
    env.events().publish(topics, collateral);
}

pub fn collateral_claimed(env: &Env, account: &Address, amount: i128) {
    let topics = (symbol_short!("claimed"), account.clone());
    env.events().publish(topics, amount);
}

pub fn config_updated(env: &Env, config: &LoanConfig) {
    env.events()
        .publish((symbol_short!("cfg_upd"),), config.clone());
}

pub fn currencies_updated(env: &Env, currency: &Symbol, supported: bool) {
    let topics = (symbol_short!("currency"), currency.clone());
    env.events().publish(topics, supported);
}

pub fn manager_updated(env: &Env, manager: &Address) {
    env.events()
        .publish((symbol_short!("manager"),), manager.clone());
}
