use fixed_point::MathError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,

    NotInitialized = 2,

    Unauthorized = 3,

    InvalidAmount = 4,

    InvalidConfig = 5,

    UnknownCollateral = 6,

    UnsupportedCurrency = 7,

    ArithmeticOverflow = 9,

    DivisionByZero = 10,
}

impl From<MathError> for Error {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ArithmeticOverflow => Error::ArithmeticOverflow,
            MathError::DivisionByZero => Error::DivisionByZero,
        }
    }
}
