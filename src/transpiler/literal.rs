//! Literal evaluation and rendering.
//!
//! The right-hand side of a comparison, and each element of a membership set,
//! is evaluated to a concrete [`Value`] before it is rendered. Evaluation is a
//! closed computation over the node's own data: constants, lists, and
//! arithmetic over them. Faults during evaluation surface as
//! [`CqlError::UnsupportedExpression`].

use crate::ast::{ArithOp, Expr, Value};
use crate::error::{CqlError, CqlResult};

/// Evaluate a literal-side node to a concrete value.
pub fn evaluate(exp: &Expr) -> CqlResult<Value> {
    match exp.simplify() {
        Expr::Constant(v) => Ok(v.clone()),
        Expr::List(items) => items
            .iter()
            .map(evaluate)
            .collect::<CqlResult<Vec<_>>>()
            .map(Value::List),
        Expr::Arithmetic { op, left, right } => {
            let l = evaluate(left)?;
            let r = evaluate(right)?;
            apply_arith(*op, l, r)
        }
        Expr::Negate(inner) => match evaluate(inner)? {
            Value::Null => Ok(Value::Null),
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| CqlError::unsupported(format!("Negating {} overflows.", n))),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(CqlError::unsupported(format!(
                "Negate is not supported on {}.",
                other.kind()
            ))),
        },
        Expr::Field(name) => Err(CqlError::unsupported(format!(
            "Field '{}' cannot be evaluated to a constant.",
            name
        ))),
        other => Err(CqlError::unsupported(format!(
            "{} is not supported.",
            other.kind()
        ))),
    }
}

/// Evaluate a literal-side node and render it as a CQL literal.
pub fn format_literal(exp: &Expr) -> CqlResult<String> {
    evaluate(exp).map(|v| v.to_string())
}

fn apply_arith(op: ArithOp, l: Value, r: Value) -> CqlResult<Value> {
    match (l, r) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Div | ArithOp::Rem if b == 0 => {
                    return Err(CqlError::unsupported("Attempted to divide by zero."));
                }
                ArithOp::Div => a.checked_div(b),
                ArithOp::Rem => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or_else(|| {
                CqlError::unsupported(format!(
                    "Arithmetic overflow evaluating {} {} {}.",
                    a,
                    op.symbol(),
                    b
                ))
            })
        }
        (Value::Int(a), Value::Float(b)) => float_arith(op, a as f64, b),
        (Value::Float(a), Value::Int(b)) => float_arith(op, a, b as f64),
        (Value::Float(a), Value::Float(b)) => float_arith(op, a, b),
        (Value::Text(a), Value::Text(b)) if op == ArithOp::Add => Ok(Value::Text(a + &b)),
        (l, r) => Err(CqlError::unsupported(format!(
            "Operator '{}' is not supported between {} and {}.",
            op.symbol(),
            l.kind(),
            r.kind()
        ))),
    }
}

/// Float arithmetic; a non-finite result is a fault.
fn float_arith(op: ArithOp, a: f64, b: f64) -> CqlResult<Value> {
    if matches!(op, ArithOp::Div | ArithOp::Rem) && b == 0.0 {
        return Err(CqlError::unsupported("Attempted to divide by zero."));
    }
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Rem => a % b,
    };
    if !result.is_finite() {
        return Err(CqlError::unsupported(format!(
            "Arithmetic evaluating {} {} {} is not finite.",
            a,
            op.symbol(),
            b
        )));
    }
    Ok(Value::Float(result))
}
