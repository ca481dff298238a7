use fixed_point::{div_decimal, mul_decimal, UNIT};
use soroban_sdk::{log, Env, Symbol};

use crate::error::Error;
use crate::interfaces::ManagerClient;
use crate::storage::{read_collaborators, read_index, write_index};
use crate::types::{IndexState, Loan};

/// Compounds `state` forward to `now` at `rate` per second:
/// `index += index * rate * elapsed`. No-op when no time has passed.
pub fn advance_index(
    env: &Env,
    state: &mut IndexState,
    rate: i128,
    now: u64,
) -> Result<(), Error> {
    if now <= state.last_updated {
        return Ok(());
    }
    if rate < 0 {
        return Err(Error::InvalidRate);
    }
    let elapsed = (now - state.last_updated) as i128;
    let growth = rate.checked_mul(elapsed).ok_or(Error::ArithmeticOverflow)?;
    let accrued = mul_decimal(env, state.index, growth)?;
    state.index = state
        .index
        .checked_add(accrued)
        .ok_or(Error::ArithmeticOverflow)?;
    state.last_updated = now;
    Ok(())
}

/// Brings the stored index of `currency` up to the ledger time and returns it.
/// A currency seen for the first time starts at 1.0.
pub fn current_index(env: &Env, currency: &Symbol) -> Result<i128, Error> {
    let now = env.ledger().timestamp();
    let mut state = match read_index(env, currency) {
        Some(state) => state,
        None => {
            let state = IndexState {
                index: UNIT,
                last_updated: now,
            };
            write_index(env, currency, &state);
            return Ok(state.index);
        }
    };
    if now <= state.last_updated {
        return Ok(state.index);
    }

    advance_at_borrow_rate(env, currency, &mut state, now)?;
    write_index(env, currency, &state);
    Ok(state.index)
}

/// The index `current_index` would return, without storing it.
pub fn projected_index(env: &Env, currency: &Symbol) -> Result<i128, Error> {
    let mut state = match read_index(env, currency) {
        Some(state) => state,
        None => return Ok(UNIT),
    };
    advance_at_borrow_rate(env, currency, &mut state, env.ledger().timestamp())?;
    Ok(state.index)
}

fn advance_at_borrow_rate(
    env: &Env,
    currency: &Symbol,
    state: &mut IndexState,
    now: u64,
) -> Result<(), Error> {
    if now <= state.last_updated {
        return Ok(());
    }
    let manager = ManagerClient::new(env, &read_collaborators(env)?.manager);
    let (rate, invalid) = manager.borrow_rate();
    if invalid {
        log!(env, "borrow rate invalid for {}", currency.clone());
        return Err(Error::InvalidRate);
    }
    advance_index(env, state, rate, now)
}

/// Capitalizes interest earned since the loan's last snapshot and moves the
/// snapshot to `current_index`. Returns the newly accrued interest.
pub fn accrue_interest(env: &Env, loan: &mut Loan, current_index: i128) -> Result<i128, Error> {
    if loan.interest_index == 0 {
        loan.interest_index = current_index;
        return Ok(0);
    }
    if current_index < loan.interest_index {
        return Err(Error::NegativeInterest);
    }

    let growth = div_decimal(env, current_index, loan.interest_index)? - UNIT;
    let interest = mul_decimal(env, loan.amount, growth)?;

    loan.accrued_interest = loan
        .accrued_interest
        .checked_add(interest)
        .ok_or(Error::ArithmeticOverflow)?;
    loan.amount = loan
        .amount
        .checked_add(interest)
        .ok_or(Error::ArithmeticOverflow)?;
    loan.interest_index = current_index;
    Ok(interest)
}
