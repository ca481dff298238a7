use fixed_point::UNIT;
use soroban_sdk::{contracttype, Address, Symbol};

pub const DEFAULT_LIQUIDATION_PENALTY: i128 = UNIT / 10; // 10%
pub const DEFAULT_INTERACTION_DELAY: u64 = 300; // seconds
pub const DEFAULT_MAX_LOANS_PER_ACCOUNT: u32 = 50;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Loan {
    pub id: u64,
    pub account: Address,
    /// Collateral held against the loan, in collateral units.
    pub collateral: i128,
    pub currency: Symbol,
    /// Outstanding debt including capitalized interest.
    pub amount: i128,
    /// Portion of `amount` that is interest not yet paid.
    pub accrued_interest: i128,
    /// Index snapshot at the last accrual. Zero until first accrual.
    pub interest_index: i128,
    pub last_interaction: u64,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.amount > 0
    }

    /// Applies `payment` against interest first, then principal.
    /// Returns the interest portion. `payment` must not exceed `amount`.
    pub fn process_payment(&mut self, payment: i128) -> i128 {
        let interest_paid = payment.min(self.accrued_interest);
        self.accrued_interest -= interest_paid;
        self.amount -= payment;
        interest_paid
    }

    /// Zeroes the loan and returns the collateral it held.
    pub fn record_closure(&mut self) -> i128 {
        let released = self.collateral;
        self.collateral = 0;
        self.amount = 0;
        self.accrued_interest = 0;
        self.interest_index = 0;
        released
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanConfig {
    /// Minimum collateralization ratio, 18 decimals (1.5 = 150%).
    pub min_cratio: i128,
    /// Minimum collateral a loan may be opened with.
    pub min_collateral: i128,
    pub issue_fee_rate: i128,
    pub liquidation_penalty: i128,
    pub interaction_delay: u64,
    pub max_loans_per_account: u32,
    pub can_open_loans: bool,
}

impl LoanConfig {
    pub fn new(min_cratio: i128, min_collateral: i128) -> Self {
        LoanConfig {
            min_cratio,
            min_collateral,
            issue_fee_rate: 0,
            liquidation_penalty: DEFAULT_LIQUIDATION_PENALTY,
            interaction_delay: DEFAULT_INTERACTION_DELAY,
            max_loans_per_account: DEFAULT_MAX_LOANS_PER_ACCOUNT,
            can_open_loans: true,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Collaborators {
    pub manager: Address,
    pub oracle: Address,
    pub issuer: Address,
    pub fee_sink: Address,
    pub system_status: Address,
}

/// Per-currency cumulative interest index.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexState {
    pub index: i128,
    pub last_updated: u64,
}
