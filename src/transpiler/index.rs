//! Secondary-index clause compiler.
//!
//! Decomposes a pure conjunction of comparisons into the ordered
//! `(field, operator, value)` list a range scan consumes. Values stay typed;
//! nothing is rendered as text.

use serde::{Deserialize, Serialize};

use super::literal::evaluate;
use super::resolve_field;
use crate::ast::{CompareOp, Expr, LogicalOp, Value};
use crate::error::{CqlError, CqlResult};

/// Operators a secondary-index scan understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexOperator {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl TryFrom<CompareOp> for IndexOperator {
    type Error = CqlError;

    fn try_from(op: CompareOp) -> Result<Self, Self::Error> {
        match op {
            CompareOp::Eq => Ok(IndexOperator::Eq),
            CompareOp::Gt => Ok(IndexOperator::Gt),
            CompareOp::Ge => Ok(IndexOperator::Ge),
            CompareOp::Lt => Ok(IndexOperator::Lt),
            CompareOp::Le => Ok(IndexOperator::Le),
            CompareOp::Ne => Err(CqlError::unsupported(
                "NE is not a supported index operator.",
            )),
        }
    }
}

impl std::fmt::Display for IndexOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexOperator::Eq => "EQ",
            IndexOperator::Gt => "GT",
            IndexOperator::Ge => "GTE",
            IndexOperator::Lt => "LT",
            IndexOperator::Le => "LTE",
        };
        write!(f, "{}", name)
    }
}

/// One `(field, operator, value)` index expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexClause {
    pub field: String,
    pub operator: IndexOperator,
    pub value: Value,
}

impl std::fmt::Display for IndexClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// A compiled index lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexClauseSet {
    /// Row key the scan starts from
    pub start_key: Value,
    /// Maximum number of rows returned
    pub limit: u32,
    /// Conjunctive clauses in source order
    pub clauses: Vec<IndexClause>,
}

/// Compile a conjunctive predicate into an index clause set.
pub fn compile_index(
    start_key: impl Into<Value>,
    limit: u32,
    predicate: &Expr,
) -> CqlResult<IndexClauseSet> {
    let mut clauses = Vec::new();
    collect_clauses(predicate, &mut clauses)?;

    tracing::debug!(clauses = clauses.len(), limit, "compiled index clause");
    Ok(IndexClauseSet {
        start_key: start_key.into(),
        limit,
        clauses,
    })
}

fn collect_clauses(exp: &Expr, clauses: &mut Vec<IndexClause>) -> CqlResult<()> {
    match exp.simplify() {
        Expr::Logical {
            op: LogicalOp::And,
            left,
            right,
        } => {
            collect_clauses(left, clauses)?;
            collect_clauses(right, clauses)
        }
        Expr::Compare { op, left, right } => {
            let operator = IndexOperator::try_from(*op)?;
            let field = resolve_field(left)?.to_string();
            let value = evaluate(right)?;
            if value.is_null() {
                return Err(CqlError::unsupported(format!(
                    "Null is not a valid index value for '{}'.",
                    field
                )));
            }
            clauses.push(IndexClause {
                field,
                operator,
                value,
            });
            Ok(())
        }
        Expr::Logical {
            op: LogicalOp::Or, ..
        } => Err(CqlError::unsupported(
            "OR is not supported in an index clause.",
        )),
        other => Err(CqlError::unsupported(format!(
            "{} is not supported in an index clause.",
            other.kind()
        ))),
    }
}
