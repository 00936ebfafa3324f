//! Expression trees consumed by the compilers.

pub mod builders;
pub mod expr;
pub mod operators;
pub mod values;

pub use self::expr::{Binding, Expr};
pub use self::operators::{ArithOp, CompareOp, LogicalOp, Method};
pub use self::values::Value;
