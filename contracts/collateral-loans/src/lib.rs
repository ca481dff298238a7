#![no_std]

use fixed_point::{mul_decimal, UNIT};
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Symbol, Vec};

mod access;
mod collateralization;
mod error;
mod events;
mod interest;
mod interfaces;
mod storage;
mod types;

pub use error::Error;
pub use types::{Collaborators, Loan, LoanConfig};

use access::{require_role, Role};
use interfaces::{CurrencyIssuerClient, FeeSinkClient, ManagerClient, SystemStatusClient};
use storage::{
    extend_instance, is_initialized, next_loan_id, read_collaborators, read_collateral_key,
    read_collateral_token, read_config, read_currencies, read_index, read_loan,
    read_loan_count, read_owner, read_pending_withdrawal, set_initialized, write_collaborators,
    write_collateral_key, write_collateral_token, write_config, write_currencies, write_loan,
    write_loan_count, write_owner, write_pending_withdrawal,
};

const SECTION_SYSTEM: Symbol = symbol_short!("System");
const SECTION_ISSUANCE: Symbol = symbol_short!("Issuance");

// --- Shared steps of the lifecycle operations ---

/// Fails when the system, or for issuing operations the issuance section,
/// is suspended.
fn require_active(env: &Env, collaborators: &Collaborators, issuance: bool) -> Result<(), Error> {
    let status = SystemStatusClient::new(env, &collaborators.system_status);
    if status.is_suspended(&SECTION_SYSTEM)
        || (issuance && status.is_suspended(&SECTION_ISSUANCE))
    {
        return Err(Error::OperationProhibited);
    }
    Ok(())
}

fn load_open_loan(env: &Env, account: &Address, id: u64) -> Result<Loan, Error> {
    let loan = read_loan(env, account, id)?;
    if !loan.is_open() {
        return Err(Error::LoanClosed);
    }
    Ok(loan)
}

fn accrue(env: &Env, loan: &mut Loan) -> Result<(), Error> {
    let index = interest::current_index(env, &loan.currency)?;
    interest::accrue_interest(env, loan, index)?;
    Ok(())
}

/// The stored loan with pending interest applied. Nothing is written back.
fn read_loan_with_interest(env: &Env, account: &Address, id: u64) -> Result<Loan, Error> {
    let mut loan = read_loan(env, account, id)?;
    if loan.is_open() {
        let index = interest::projected_index(env, &loan.currency)?;
        interest::accrue_interest(env, &mut loan, index)?;
    }
    Ok(loan)
}

fn require_balance(
    env: &Env,
    collaborators: &Collaborators,
    account: &Address,
    currency: &Symbol,
    amount: i128,
) -> Result<(), Error> {
    let issuer = CurrencyIssuerClient::new(env, &collaborators.issuer);
    if issuer.balance(account, currency) < amount {
        return Err(Error::InsufficientBalance);
    }
    Ok(())
}

fn require_debt_capacity(
    env: &Env,
    collaborators: &Collaborators,
    amount: i128,
    currency: &Symbol,
) -> Result<(), Error> {
    let manager = ManagerClient::new(env, &collaborators.manager);
    let (can_issue, invalid) = manager.can_issue(&amount, currency);
    if invalid {
        return Err(Error::InvalidRate);
    }
    if !can_issue {
        return Err(Error::ExceedsDebtCeiling);
    }
    Ok(())
}

fn pay_fee(env: &Env, collaborators: &Collaborators, currency: &Symbol, amount: i128) {
    if amount <= 0 {
        return;
    }
    CurrencyIssuerClient::new(env, &collaborators.issuer).mint(
        &collaborators.fee_sink,
        currency,
        &amount,
    );
    FeeSinkClient::new(env, &collaborators.fee_sink).receive_fee(currency, &amount);
}

/// Records `amount` of new debt with the manager and mints it to `to`,
/// less the issue fee. Returns the fee.
fn issue(
    env: &Env,
    collaborators: &Collaborators,
    config: &LoanConfig,
    to: &Address,
    currency: &Symbol,
    amount: i128,
) -> Result<i128, Error> {
    ManagerClient::new(env, &collaborators.manager).increment_longs(
        &env.current_contract_address(),
        currency,
        &amount,
    );

    let fee = mul_decimal(env, amount, config.issue_fee_rate)?;
    CurrencyIssuerClient::new(env, &collaborators.issuer).mint(to, currency, &(amount - fee));
    pay_fee(env, collaborators, currency, fee);
    Ok(fee)
}

/// Burns `payment` from `payer` and applies it to the loan, interest first.
/// The interest portion goes to the fee sink, the principal portion is
/// released from the manager's longs.
fn settle_payment(
    env: &Env,
    collaborators: &Collaborators,
    loan: &mut Loan,
    payer: &Address,
    payment: i128,
) {
    CurrencyIssuerClient::new(env, &collaborators.issuer).burn(payer, &loan.currency, &payment);

    let interest_paid = loan.process_payment(payment);
    pay_fee(env, collaborators, &loan.currency, interest_paid);

    let principal = payment - interest_paid;
    if principal > 0 {
        ManagerClient::new(env, &collaborators.manager).decrement_longs(
            &env.current_contract_address(),
            &loan.currency,
            &principal,
        );
    }
}

fn credit_pending(env: &Env, account: &Address, amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Ok(());
    }
    let pending = read_pending_withdrawal(env, account)
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    write_pending_withdrawal(env, account, pending);
    Ok(())
}

/// Zeroes a loan whose debt is gone and returns its remaining collateral.
fn retire_loan(env: &Env, loan: &mut Loan) -> i128 {
    let released = loan.record_closure();
    let count = read_loan_count(env, &loan.account);
    write_loan_count(env, &loan.account, count.saturating_sub(1));
    released
}

fn update_config(
    env: &Env,
    caller: &Address,
    apply: impl FnOnce(&mut LoanConfig) -> Result<(), Error>,
) -> Result<LoanConfig, Error> {
    require_role(env, caller, Role::Owner)?;
    extend_instance(env);

    let mut config = read_config(env)?;
    apply(&mut config)?;
    write_config(env, &config);

    events::config_updated(env, &config);
    Ok(config)
}

#[contract]
pub struct CollateralLoans;

#[contractimpl]
impl CollateralLoans {
    /// Initialize the loan engine for one collateral token.
    ///
    /// `collateral_key` is the symbol the oracle prices the collateral under.
    /// Remaining configuration starts at its defaults.
    pub fn initialize(
        env: Env,
        owner: Address,
        collateral_token: Address,
        collateral_key: Symbol,
        collaborators: Collaborators,
        min_cratio: i128,
        min_collateral: i128,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        owner.require_auth();

        if min_cratio <= UNIT || min_collateral <= 0 {
            return Err(Error::InvalidConfig);
        }

        write_owner(&env, &owner);
        write_collateral_token(&env, &collateral_token);
        write_collateral_key(&env, &collateral_key);
        write_collaborators(&env, &collaborators);
        write_config(&env, &LoanConfig::new(min_cratio, min_collateral));
        write_currencies(&env, &Vec::new(&env));
        set_initialized(&env);
        extend_instance(&env);

        log!(&env, "CollateralLoans: Initialized for {}", collateral_key);
        Ok(())
    }

    /// Bump instance TTL. Callable by anyone.
    pub fn bump_instance(env: Env) {
        extend_instance(&env);
    }

    // ==========================================================
    // Owner setters
    // ==========================================================

    pub fn set_min_cratio(env: Env, caller: Address, min_cratio: i128) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            if min_cratio <= UNIT {
                return Err(Error::InvalidConfig);
            }
            config.min_cratio = min_cratio;
            Ok(())
        })
    }

    pub fn set_min_collateral(
        env: Env,
        caller: Address,
        min_collateral: i128,
    ) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            if min_collateral <= 0 {
                return Err(Error::InvalidConfig);
            }
            config.min_collateral = min_collateral;
            Ok(())
        })
    }

    pub fn set_issue_fee_rate(env: Env, caller: Address, rate: i128) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            if !(0..=UNIT).contains(&rate) {
                return Err(Error::InvalidConfig);
            }
            config.issue_fee_rate = rate;
            Ok(())
        })
    }

    pub fn set_liquidation_penalty(
        env: Env,
        caller: Address,
        penalty: i128,
    ) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            if !(0..=UNIT).contains(&penalty) {
                return Err(Error::InvalidConfig);
            }
            config.liquidation_penalty = penalty;
            Ok(())
        })
    }

    pub fn set_interaction_delay(
        env: Env,
        caller: Address,
        delay: u64,
    ) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            config.interaction_delay = delay;
            Ok(())
        })
    }

    pub fn set_max_loans_per_account(
        env: Env,
        caller: Address,
        max_loans: u32,
    ) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            if max_loans == 0 {
                return Err(Error::InvalidConfig);
            }
            config.max_loans_per_account = max_loans;
            Ok(())
        })
    }

    pub fn set_can_open_loans(
        env: Env,
        caller: Address,
        can_open: bool,
    ) -> Result<LoanConfig, Error> {
        update_config(&env, &caller, |config| {
            config.can_open_loans = can_open;
            Ok(())
        })
    }

    pub fn set_manager(env: Env, caller: Address, manager: Address) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut collaborators = read_collaborators(&env)?;
        collaborators.manager = manager.clone();
        write_collaborators(&env, &collaborators);

        events::manager_updated(&env, &manager);
        Ok(())
    }

    pub fn add_currencies(env: Env, caller: Address, currencies: Vec<Symbol>) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut permitted = read_currencies(&env);
        for currency in currencies.iter() {
            if !permitted.contains(&currency) {
                permitted.push_back(currency.clone());
                events::currencies_updated(&env, &currency, true);
            }
        }
        write_currencies(&env, &permitted);
        Ok(())
    }

    pub fn remove_currencies(
        env: Env,
        caller: Address,
        currencies: Vec<Symbol>,
    ) -> Result<(), Error> {
        require_role(&env, &caller, Role::Owner)?;
        extend_instance(&env);

        let mut permitted = read_currencies(&env);
        for currency in currencies.iter() {
            let index = permitted
                .first_index_of(&currency)
                .ok_or(Error::UnsupportedCurrency)?;
            permitted.remove(index);
            events::currencies_updated(&env, &currency, false);
        }
        write_currencies(&env, &permitted);
        Ok(())
    }

    // ==========================================================
    // Loan lifecycle
    // ==========================================================

    /// Lock `collateral` and borrow `amount` of `currency` against it.
    pub fn open(
        env: Env,
        borrower: Address,
        collateral: i128,
        amount: i128,
        currency: Symbol,
    ) -> Result<Loan, Error> {
        borrower.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;

        let config = read_config(&env)?;
        if !config.can_open_loans {
            return Err(Error::OpeningDisabled);
        }
        collateralization::price(&env, &read_collateral_key(&env)?)?;
        if !read_currencies(&env).contains(&currency) {
            return Err(Error::UnsupportedCurrency);
        }
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }
        if collateral < config.min_collateral {
            return Err(Error::InsufficientCollateral);
        }

        let open_loans = read_loan_count(&env, &borrower);
        if open_loans >= config.max_loans_per_account {
            return Err(Error::MaxLoansExceeded);
        }

        let max_loan = collateralization::max_loan(&env, &config, collateral, &currency)?;
        if amount > max_loan {
            return Err(Error::ExceedsBorrowingPower);
        }
        require_debt_capacity(&env, &collaborators, amount, &currency)?;

        token::Client::new(&env, &read_collateral_token(&env)?).transfer(
            &borrower,
            &env.current_contract_address(),
            &collateral,
        );

        let loan = Loan {
            id: next_loan_id(&env),
            account: borrower.clone(),
            collateral,
            currency: currency.clone(),
            amount,
            accrued_interest: 0,
            interest_index: interest::current_index(&env, &currency)?,
            last_interaction: env.ledger().timestamp(),
        };
        write_loan(&env, &loan);
        write_loan_count(&env, &borrower, open_loans + 1);

        let fee = issue(&env, &collaborators, &config, &borrower, &currency, amount)?;

        events::loan_opened(&env, &loan, fee);
        log!(&env, "loan {} opened for {}", loan.id, borrower);
        Ok(loan)
    }

    /// Add collateral to an open loan. `from` supplies the collateral and
    /// need not be the borrower.
    ///
    /// Any deposit restarts the borrower's withdrawal delay, so a third
    /// party depositing at least once per `interaction_delay` keeps
    /// `withdraw` rate limited.
    pub fn deposit(
        env: Env,
        from: Address,
        borrower: Address,
        id: u64,
        amount: i128,
    ) -> Result<Loan, Error> {
        from.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let mut loan = load_open_loan(&env, &borrower, id)?;
        accrue(&env, &mut loan)?;

        token::Client::new(&env, &read_collateral_token(&env)?).transfer(
            &from,
            &env.current_contract_address(),
            &amount,
        );

        loan.collateral = loan
            .collateral
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        loan.last_interaction = env.ledger().timestamp();
        write_loan(&env, &loan);

        events::collateral_deposited(&env, &loan, amount);
        Ok(loan)
    }

    /// Release collateral into the borrower's pending withdrawals.
    pub fn withdraw(env: Env, borrower: Address, id: u64, amount: i128) -> Result<Loan, Error> {
        borrower.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let mut loan = load_open_loan(&env, &borrower, id)?;
        let config = read_config(&env)?;
        let now = env.ledger().timestamp();
        if now < loan.last_interaction.saturating_add(config.interaction_delay) {
            return Err(Error::RateLimited);
        }
        if amount >= loan.collateral {
            return Err(Error::ExceedsCollateral);
        }

        accrue(&env, &mut loan)?;
        loan.collateral -= amount;
        if collateralization::collateral_ratio(&env, &loan)? < config.min_cratio {
            return Err(Error::UndercollateralizedAfterWithdraw);
        }

        loan.last_interaction = now;
        write_loan(&env, &loan);
        credit_pending(&env, &borrower, amount)?;

        events::collateral_withdrawn(&env, &loan, amount);
        Ok(loan)
    }

    /// Pay down part of a loan from `repayer`'s balance. Paying off the
    /// whole debt goes through `close`.
    pub fn repay(
        env: Env,
        borrower: Address,
        id: u64,
        repayer: Address,
        amount: i128,
    ) -> Result<Loan, Error> {
        repayer.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let mut loan = load_open_loan(&env, &borrower, id)?;
        require_balance(&env, &collaborators, &repayer, &loan.currency, amount)?;

        accrue(&env, &mut loan)?;
        if amount >= loan.amount {
            return Err(Error::WouldCloseLoan);
        }

        settle_payment(&env, &collaborators, &mut loan, &repayer, amount);
        loan.last_interaction = env.ledger().timestamp();
        write_loan(&env, &loan);

        events::loan_repaid(&env, &loan, &repayer, amount);
        Ok(loan)
    }

    /// Borrow more against the existing collateral.
    pub fn draw(env: Env, borrower: Address, id: u64, amount: i128) -> Result<Loan, Error> {
        borrower.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let mut loan = load_open_loan(&env, &borrower, id)?;
        let config = read_config(&env)?;

        accrue(&env, &mut loan)?;
        loan.amount = loan
            .amount
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        if collateralization::collateral_ratio(&env, &loan)? < config.min_cratio {
            return Err(Error::UndercollateralizedAfterDraw);
        }
        require_debt_capacity(&env, &collaborators, amount, &loan.currency)?;

        loan.last_interaction = env.ledger().timestamp();
        write_loan(&env, &loan);

        let fee = issue(&env, &collaborators, &config, &borrower, &loan.currency, amount)?;

        events::loan_drawn(&env, &loan, amount, fee);
        Ok(loan)
    }

    /// Repay up to `amount` of an under-collateralized loan's debt in
    /// exchange for collateral plus the liquidation penalty. Repaying the
    /// whole debt closes the loan and returns any collateral left over to
    /// the borrower's pending withdrawals.
    pub fn liquidate(
        env: Env,
        borrower: Address,
        id: u64,
        liquidator: Address,
        amount: i128,
    ) -> Result<Loan, Error> {
        liquidator.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let mut loan = load_open_loan(&env, &borrower, id)?;
        let config = read_config(&env)?;
        require_balance(&env, &collaborators, &liquidator, &loan.currency, amount)?;

        accrue(&env, &mut loan)?;
        if collateralization::collateral_ratio(&env, &loan)? >= config.min_cratio {
            return Err(Error::AboveLiquidationRatio);
        }

        let payment = amount.min(loan.amount);
        let redeemed = collateralization::collateral_redeemed(&env, &config, &loan.currency, payment)?
            .min(loan.collateral);

        settle_payment(&env, &collaborators, &mut loan, &liquidator, payment);
        loan.collateral -= redeemed;
        credit_pending(&env, &liquidator, redeemed)?;

        if loan.is_open() {
            loan.last_interaction = env.ledger().timestamp();
            write_loan(&env, &loan);
            events::loan_partially_liquidated(&env, &loan, &liquidator, payment, redeemed);
        } else {
            let remainder = retire_loan(&env, &mut loan);
            credit_pending(&env, &borrower, remainder)?;
            write_loan(&env, &loan);
            events::loan_liquidated(&env, &loan, &liquidator, redeemed);
            log!(&env, "loan {} liquidated by {}", loan.id, liquidator);
        }
        Ok(loan)
    }

    /// Pay off the whole debt from the borrower's balance and release all
    /// collateral into the borrower's pending withdrawals.
    pub fn close(env: Env, borrower: Address, id: u64) -> Result<Loan, Error> {
        borrower.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, true)?;

        let mut loan = load_open_loan(&env, &borrower, id)?;
        accrue(&env, &mut loan)?;
        require_balance(&env, &collaborators, &borrower, &loan.currency, loan.amount)?;

        let debt = loan.amount;
        settle_payment(&env, &collaborators, &mut loan, &borrower, debt);
        let released = retire_loan(&env, &mut loan);
        credit_pending(&env, &borrower, released)?;
        write_loan(&env, &loan);

        events::loan_closed(&env, &loan, released);
        Ok(loan)
    }

    /// Transfer out collateral credited to `account`. Returns what is left
    /// pending afterwards.
    pub fn claim(env: Env, account: Address, amount: i128) -> Result<i128, Error> {
        account.require_auth();
        extend_instance(&env);

        let collaborators = read_collaborators(&env)?;
        require_active(&env, &collaborators, false)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let pending = read_pending_withdrawal(&env, &account);
        if pending < amount {
            return Err(Error::InsufficientPendingBalance);
        }
        let remaining = pending - amount;
        write_pending_withdrawal(&env, &account, remaining);

        token::Client::new(&env, &read_collateral_token(&env)?).transfer(
            &env.current_contract_address(),
            &account,
            &amount,
        );

        events::collateral_claimed(&env, &account, amount);
        Ok(remaining)
    }

    // ==========================================================
    // Views
    // ==========================================================

    pub fn get_loan(env: Env, account: Address, id: u64) -> Result<Loan, Error> {
        read_loan(&env, &account, id)
    }

    /// Ratio of the loan with interest accrued up to now.
    pub fn collateral_ratio(env: Env, account: Address, id: u64) -> Result<i128, Error> {
        let loan = read_loan_with_interest(&env, &account, id)?;
        collateralization::collateral_ratio(&env, &loan)
    }

    pub fn max_loan(env: Env, collateral: i128, currency: Symbol) -> Result<i128, Error> {
        let config = read_config(&env)?;
        collateralization::max_loan(&env, &config, collateral, &currency)
    }

    /// Debt a liquidator should repay now, counting interest not yet
    /// capitalized on the stored loan.
    pub fn liquidation_amount(env: Env, account: Address, id: u64) -> Result<i128, Error> {
        let loan = read_loan_with_interest(&env, &account, id)?;
        let config = read_config(&env)?;
        collateralization::liquidation_amount(&env, &config, &loan)
    }

    pub fn collateral_redeemed(env: Env, currency: Symbol, amount: i128) -> Result<i128, Error> {
        let config = read_config(&env)?;
        collateralization::collateral_redeemed(&env, &config, &currency, amount)
    }

    pub fn pending_withdrawals(env: Env, account: Address) -> i128 {
        read_pending_withdrawal(&env, &account)
    }

    pub fn open_loans(env: Env, account: Address) -> u32 {
        read_loan_count(&env, &account)
    }

    pub fn config(env: Env) -> Result<LoanConfig, Error> {
        read_config(&env)
    }

    /// Last stored index of `currency`; 1.0 before its first loan.
    pub fn interest_index(env: Env, currency: Symbol) -> i128 {
        read_index(&env, &currency).map_or(UNIT, |state| state.index)
    }

    pub fn currencies(env: Env) -> Vec<Symbol> {
        read_currencies(&env)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        read_owner(&env)
    }

    pub fn manager(env: Env) -> Result<Address, Error> {
        Ok(read_collaborators(&env)?.manager)
    }
}
