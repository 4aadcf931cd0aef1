//! Calculator tools over exact [`Number`] operands.
//!
//! Two integers stay integers (checked, so overflow is an error rather than a
//! wrap). Any float operand promotes the operation to `f64`. Division always
//! yields a float so `7 / 2` is `3.5`, never a truncated `3`. A float result
//! that is not finite is reported instead of recorded.

use steward_core::action::{Intent, Number};
use steward_core::error::ToolError;

pub fn add(a: Number, b: Number) -> Result<Number, ToolError> {
    binary(Intent::Add, a, b, i64::checked_add, |x, y| x + y)
}

pub fn subtract(a: Number, b: Number) -> Result<Number, ToolError> {
    binary(Intent::Subtract, a, b, i64::checked_sub, |x, y| x - y)
}

pub fn multiply(a: Number, b: Number) -> Result<Number, ToolError> {
    binary(Intent::Multiply, a, b, i64::checked_mul, |x, y| x * y)
}

pub fn divide(a: Number, b: Number) -> Result<Number, ToolError> {
    if b.is_zero() {
        return Err(ToolError::DivisionByZero { dividend: a });
    }
    finite(Intent::Divide, a, b, a.as_f64() / b.as_f64())
}

fn binary(
    intent: Intent,
    a: Number,
    b: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, ToolError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => int_op(x, y)
            .map(Number::Int)
            .ok_or(ToolError::Overflow { intent, a, b }),
        _ => finite(intent, a, b, float_op(a.as_f64(), b.as_f64())),
    }
}

fn finite(intent: Intent, a: Number, b: Number, value: f64) -> Result<Number, ToolError> {
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(ToolError::NonFinite { intent, a, b })
    }
}
