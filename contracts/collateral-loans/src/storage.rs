use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

use crate::error::Error;
use crate::types::{Collaborators, IndexState, Loan, LoanConfig};

// ---------- TTL constants ----------
// ~5s per ledger
const INSTANCE_LIFETIME_THRESHOLD: u32 = 100_800; // ~7 days
const INSTANCE_BUMP_AMOUNT: u32 = 518_400; // ~30 days
const USER_LIFETIME_THRESHOLD: u32 = 518_400; // ~30 days
const USER_BUMP_AMOUNT: u32 = 3_110_400; // ~180 days

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Owner,
    Initialized,
    Config,
    CollateralToken,
    CollateralKey,
    Collaborators,
    Currencies,
    NextLoanId,
    InterestIndex(Symbol),
    Loan(Address, u64),
    LoanCount(Address),
    PendingWithdrawal(Address),
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn extend_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, USER_LIFETIME_THRESHOLD, USER_BUMP_AMOUNT);
}

// --- Instance ---

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
}

pub fn read_owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

pub fn write_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

pub fn read_config(env: &Env) -> Result<LoanConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn write_config(env: &Env, config: &LoanConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn read_collateral_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::CollateralToken)
        .ok_or(Error::NotInitialized)
}

pub fn write_collateral_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::CollateralToken, token);
}

/// Oracle key the collateral asset is priced under.
pub fn read_collateral_key(env: &Env) -> Result<Symbol, Error> {
    env.storage()
        .instance()
        .get(&DataKey::CollateralKey)
        .ok_or(Error::NotInitialized)
}

pub fn write_collateral_key(env: &Env, key: &Symbol) {
    env.storage().instance().set(&DataKey::CollateralKey, key);
}

pub fn read_collaborators(env: &Env) -> Result<Collaborators, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Collaborators)
        .ok_or(Error::NotInitialized)
}

pub fn write_collaborators(env: &Env, collaborators: &Collaborators) {
    env.storage()
        .instance()
        .set(&DataKey::Collaborators, collaborators);
}

pub fn read_currencies(env: &Env) -> Vec<Symbol> {
    env.storage()
        .instance()
        .get(&DataKey::Currencies)
        .unwrap_or(Vec::new(env))
}

pub fn write_currencies(env: &Env, currencies: &Vec<Symbol>) {
    env.storage().instance().set(&DataKey::Currencies, currencies);
}

/// Hands out the next loan id. Ids start at 1.
pub fn next_loan_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextLoanId)
        .unwrap_or(1);
    env.storage().instance().set(&DataKey::NextLoanId, &(id + 1));
    id
}

pub fn read_index(env: &Env, currency: &Symbol) -> Option<IndexState> {
    env.storage()
        .instance()
        .get(&DataKey::InterestIndex(currency.clone()))
}

pub fn write_index(env: &Env, currency: &Symbol, state: &IndexState) {
    env.storage()
        .instance()
        .set(&DataKey::InterestIndex(currency.clone()), state);
}

// --- Persistent, per account ---

pub fn read_loan(env: &Env, account: &Address, id: u64) -> Result<Loan, Error> {
    let key = DataKey::Loan(account.clone(), id);
    let loan: Loan = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::LoanNotFound)?;
    extend_persistent(env, &key);
    Ok(loan)
}

pub fn write_loan(env: &Env, loan: &Loan) {
    let key = DataKey::Loan(loan.account.clone(), loan.id);
    env.storage().persistent().set(&key, loan);
    extend_persistent(env, &key);
}

/// Number of open loans held by `account`.
pub fn read_loan_count(env: &Env, account: &Address) -> u32 {
    let key = DataKey::LoanCount(account.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn write_loan_count(env: &Env, account: &Address, count: u32) {
    let key = DataKey::LoanCount(account.clone());
    env.storage().persistent().set(&key, &count);
    extend_persistent(env, &key);
}

pub fn read_pending_withdrawal(env: &Env, account: &Address) -> i128 {
    let key = DataKey::PendingWithdrawal(account.clone());
    let val: i128 = env.storage().persistent().get(&key).unwrap_or(0);
    if val > 0 {
        extend_persistent(env, &key);
    }
    val
}

pub fn write_pending_withdrawal(env: &Env, account: &Address, val: i128) {
    let key = DataKey::PendingWithdrawal(account.clone());
    env.storage().persistent().set(&key, &val);
    extend_persistent(env, &key);
}
