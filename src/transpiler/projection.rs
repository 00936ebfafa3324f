//! SELECT list compiler.

use super::resolve_field;
use crate::ast::Expr;
use crate::error::{CqlError, CqlResult};

/// Extract the ordered field names selected by a projection node.
///
/// An empty result means "all fields".
pub fn compile_projection(exp: &Expr) -> CqlResult<Vec<String>> {
    match exp.simplify() {
        Expr::Row => Ok(Vec::new()),
        Expr::Field(name) => Ok(vec![name.clone()]),
        Expr::Projection(bindings) => bindings
            .iter()
            .map(|b| resolve_field(&b.expr).map(str::to_string))
            .collect(),
        other => Err(CqlError::unsupported(format!(
            "{} is not supported as a projection.",
            other.kind()
        ))),
    }
}
