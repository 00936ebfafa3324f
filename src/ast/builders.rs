//! Ergonomic builder functions for expression trees.
//!
//! Values are lifted into [`Expr::Constant`] nodes at build time, so every
//! leaf reaching the compilers is already concrete.
//!
//! # Example
//! ```
//! use fluent_cql::ast::builders::*;
//!
//! let pred = (col("Id").equals(1234) | col("Age").equals(10)) & col("Name").equals("Adama");
//! assert_eq!(
//!     fluent_cql::compile_predicate(&pred).unwrap(),
//!     "((Id = 1234 OR Age = 10) AND Name = 'Adama')"
//! );
//! ```

use std::ops;

use crate::ast::{ArithOp, Binding, CompareOp, Expr, LogicalOp, Value};

/// Field access: `f["name"]`.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Field(name.into())
}

/// Literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

/// Ordered collection of literals.
pub fn list<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Expr {
    Expr::List(values.into_iter().map(lit).collect())
}

/// Query source (column family name).
pub fn source(name: impl Into<String>) -> Expr {
    Expr::Source(name.into())
}

/// The whole record, as in `select f`.
pub fn row() -> Expr {
    Expr::Row
}

/// Object-construction projection over the given fields, in order.
pub fn fields<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Expr {
    Expr::Projection(names.into_iter().map(|n| Binding::new(col(n))).collect())
}

fn field_compare(column: &str, op: CompareOp, value: Value) -> Expr {
    Expr::Compare {
        op,
        left: Box::new(col(column)),
        right: Box::new(Expr::Constant(value)),
    }
}

/// `column = value`
pub fn eq(column: &str, value: impl Into<Value>) -> Expr {
    field_compare(column, CompareOp::Eq, value.into())
}

/// `column != value`
pub fn ne(column: &str, value: impl Into<Value>) -> Expr {
    field_compare(column, CompareOp::Ne, value.into())
}

/// `column > value`
pub fn gt(column: &str, value: impl Into<Value>) -> Expr {
    field_compare(column, CompareOp::Gt, value.into())
}

/// `column >= value`
pub fn ge(column: &str, value: impl Into<Value>) -> Expr {
    field_compare(column, CompareOp::Ge, value.into())
}

/// `column < value`
pub fn lt(column: &str, value: impl Into<Value>) -> Expr {
    field_compare(column, CompareOp::Lt, value.into())
}

/// `column <= value`
pub fn le(column: &str, value: impl Into<Value>) -> Expr {
    field_compare(column, CompareOp::Le, value.into())
}

/// `column IN (values)`
pub fn is_in<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Expr {
    Expr::Membership {
        field: Box::new(col(column)),
        values: Box::new(list(values)),
    }
}

/// Fluent comparison methods on any node.
///
/// Named `equals`/`not_equals` so they don't shadow `PartialEq`.
pub trait ExprExt: Sized {
    fn compare(self, op: CompareOp, right: impl Into<Expr>) -> Expr;

    fn equals(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Eq, right)
    }

    fn not_equals(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Ne, right)
    }

    fn gt(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gt, right)
    }

    fn ge(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Ge, right)
    }

    fn lt(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lt, right)
    }

    fn le(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Le, right)
    }

    /// `self IN values`, where `values` evaluates to a list.
    fn is_in(self, values: impl Into<Expr>) -> Expr;

    /// Wrap in a type coercion node.
    fn convert(self) -> Expr;

    /// Wrap in a lambda body node.
    fn lambda(self) -> Expr;

    /// Wrap in a quote node.
    fn quote(self) -> Expr;
}

impl ExprExt for Expr {
    fn compare(self, op: CompareOp, right: impl Into<Expr>) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(right.into()),
        }
    }

    fn is_in(self, values: impl Into<Expr>) -> Expr {
        Expr::Membership {
            field: Box::new(self),
            values: Box::new(values.into()),
        }
    }

    fn convert(self) -> Expr {
        Expr::Convert(Box::new(self))
    }

    fn lambda(self) -> Expr {
        Expr::Lambda(Box::new(self))
    }

    fn quote(self) -> Expr {
        Expr::Quote(Box::new(self))
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Constant(v)
    }
}

macro_rules! literal_into_expr {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Constant(v.into())
                }
            }
        )*
    };
}

literal_into_expr!(bool, i32, i64, f64, &str, String);

fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    Expr::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn arithmetic(op: ArithOp, left: Expr, right: Expr) -> Expr {
    Expr::Arithmetic {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// `a & b` builds `(a AND b)`.
impl ops::BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        logical(LogicalOp::And, self, rhs)
    }
}

/// `a | b` builds `(a OR b)`.
impl ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        logical(LogicalOp::Or, self, rhs)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Negate(Box::new(self))
    }
}

macro_rules! arith_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                arithmetic($op, self, rhs)
            }
        }
    };
}

arith_op!(Add, add, ArithOp::Add);
arith_op!(Sub, sub, ArithOp::Sub);
arith_op!(Mul, mul, ArithOp::Mul);
arith_op!(Div, div, ArithOp::Div);
arith_op!(Rem, rem, ArithOp::Rem);
