//! CQL transpiler for expression trees.
//!
//! Two targets share the same node model:
//! - [`select`] assembles a textual `SELECT` from a source/filter/projection chain,
//! - [`index`] decomposes a conjunction into ordered secondary-index clauses.

pub mod index;
pub mod literal;
pub mod predicate;
pub mod projection;
pub mod select;

pub use index::{IndexClause, IndexClauseSet, IndexOperator, compile_index};
pub use literal::{evaluate, format_literal};
pub use predicate::compile_predicate;
pub use projection::compile_projection;
pub use select::{CompiledQuery, compile_query};

use crate::ast::Expr;
use crate::error::{CqlError, CqlResult};

/// Trait for converting nodes to CQL text.
pub trait ToCql {
    /// Compile this node to a CQL string.
    fn to_cql(&self) -> CqlResult<String>;
}

impl ToCql for Expr {
    fn to_cql(&self) -> CqlResult<String> {
        compile_query(self).map(|q| q.to_string())
    }
}

/// Resolve a node that must name a field.
pub(crate) fn resolve_field(exp: &Expr) -> CqlResult<&str> {
    match exp.simplify() {
        Expr::Field(name) => Ok(name),
        other => Err(CqlError::unsupported(format!(
            "{} is not supported where a field is expected.",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    #[test]
    fn test_resolve_field_through_wrappers() {
        assert_eq!(resolve_field(&col("Age").convert().quote()).unwrap(), "Age");
    }

    #[test]
    fn test_resolve_field_rejects_constants() {
        let err = resolve_field(&lit(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported expression: Constant is not supported where a field is expected."
        );
    }
}
