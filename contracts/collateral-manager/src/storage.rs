use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

use crate::error::Error;

// ~5s per ledger
const INSTANCE_LIFETIME_THRESHOLD: u32 = 100_800; // ~7 days
const INSTANCE_BUMP_AMOUNT: u32 = 518_400; // ~30 days

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Owner,
    Initialized,
    Oracle,
    Issuer,
    BaseBorrowRate,
    UtilisationMultiplier,
    MaxDebt,
    Collaterals,
    Currencies,
    Long(Symbol),
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

//  INITIALIZED STATE

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
}

//  OWNER

pub fn get_owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

//  COLLABORATORS

pub fn get_oracle(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Oracle)
        .ok_or(Error::NotInitialized)
}

pub fn set_oracle(env: &Env, oracle: &Address) {
    env.storage().instance().set(&DataKey::Oracle, oracle);
}

pub fn get_issuer(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Issuer)
        .ok_or(Error::NotInitialized)
}

pub fn set_issuer(env: &Env, issuer: &Address) {
    env.storage().instance().set(&DataKey::Issuer, issuer);
}

//  RATES AND LIMITS

pub fn get_base_borrow_rate(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::BaseBorrowRate)
        .unwrap_or(0)
}

pub fn set_base_borrow_rate(env: &Env, rate: i128) {
    env.storage().instance().set(&DataKey::BaseBorrowRate, &rate);
}

pub fn get_utilisation_multiplier(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::UtilisationMultiplier)
        .unwrap_or(fixed_point::UNIT)
}

pub fn set_utilisation_multiplier(env: &Env, multiplier: i128) {
    env.storage()
        .instance()
        .set(&DataKey::UtilisationMultiplier, &multiplier);
}

pub fn get_max_debt(env: &Env) -> i128 {
    env.storage().instance().get(&DataKey::MaxDebt).unwrap_or(0)
}

pub fn set_max_debt(env: &Env, max_debt: i128) {
    env.storage().instance().set(&DataKey::MaxDebt, &max_debt);
}

//  REGISTRIES

pub fn get_collaterals(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Collaterals)
        .unwrap_or(Vec::new(env))
}

pub fn set_collaterals(env: &Env, collaterals: &Vec<Address>) {
    env.storage().instance().set(&DataKey::Collaterals, collaterals);
}

pub fn get_currencies(env: &Env) -> Vec<Symbol> {
    env.storage()
        .instance()
        .get(&DataKey::Currencies)
        .unwrap_or(Vec::new(env))
}

pub fn set_currencies(env: &Env, currencies: &Vec<Symbol>) {
    env.storage().instance().set(&DataKey::Currencies, currencies);
}

//  LONGS

pub fn get_long(env: &Env, currency: &Symbol) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::Long(currency.clone()))
        .unwrap_or(0)
}

pub fn set_long(env: &Env, currency: &Symbol, amount: i128) {
    env.storage()
        .instance()
        .set(&DataKey::Long(currency.clone()), &amount);
}
