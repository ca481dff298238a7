#![no_std]

//! Decimal arithmetic on `i128` values carrying 18 implied decimal places.
//!
//! Both primitives round toward zero. The intermediate product is formed in
//! the host's 256-bit integer so any pair of `i128` operands can be
//! multiplied before scaling back down.

use soroban_sdk::{Env, I256};

pub const UNIT: i128 = 1_000_000_000_000_000_000; // 1e18

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MathError {
    ArithmeticOverflow,
    DivisionByZero,
}

/// `a * b / UNIT`, truncating.
pub fn mul_decimal(env: &Env, a: i128, b: i128) -> Result<i128, MathError> {
    mul_div(env, a, b, UNIT)
}

/// `a * UNIT / b`, truncating.
pub fn div_decimal(env: &Env, a: i128, b: i128) -> Result<i128, MathError> {
    mul_div(env, a, UNIT, b)
}

/// `a * b / divisor` with a 256-bit intermediate.
pub fn mul_div(env: &Env, a: i128, b: i128, divisor: i128) -> Result<i128, MathError> {
    if divisor == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = I256::from_i128(env, a).mul(&I256::from_i128(env, b));
    product
        .div(&I256::from_i128(env, divisor))
        .to_i128()
        .ok_or(MathError::ArithmeticOverflow)
}
