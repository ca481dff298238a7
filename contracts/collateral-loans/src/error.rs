use fixed_point::MathError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,

    // Caller-fixable input errors
    ZeroAmount = 10,
    UnsupportedCurrency = 11,
    InsufficientCollateral = 12,
    InvalidConfig = 13,
    MaxLoansExceeded = 14,
    OpeningDisabled = 15,

    // Rejected state transitions
    ExceedsBorrowingPower = 20,
    UndercollateralizedAfterWithdraw = 21,
    UndercollateralizedAfterDraw = 22,
    ExceedsCollateral = 23,
    WouldCloseLoan = 24,
    AboveLiquidationRatio = 25,
    ExceedsDebtCeiling = 26,
    InsufficientBalance = 27,
    InsufficientPendingBalance = 28,
    RateLimited = 29,

    LoanNotFound = 30,
    LoanClosed = 31,
    NegativeInterest = 32,

    InvalidRate = 40,
    OperationProhibited = 41,

    ArithmeticOverflow = 50,
    DivisionByZero = 51,
}

impl From<MathError> for Error {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ArithmeticOverflow => Error::ArithmeticOverflow,
            MathError::DivisionByZero => Error::DivisionByZero,
        }
    }
}
