//! Query assembler.
//!
//! A query arrives as a method chain built bottom-up: the [`Expr::Source`]
//! sits deepest and every `Filter`/`Project` step wraps the query built so
//! far. The assembler resolves the source first, then applies each step in
//! construction order.

use serde::{Deserialize, Serialize};

use super::predicate::{compile_predicate, conjoin};
use super::projection::compile_projection;
use crate::ast::{Expr, Method};
use crate::error::{CqlError, CqlResult};

/// A compiled `SELECT` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// Column family the query reads from
    pub source: String,
    /// Selected fields in encounter order; empty selects all
    pub fields: Vec<String>,
    /// Compiled WHERE clause
    pub predicate: Option<String>,
}

impl CompiledQuery {
    /// The SELECT list: `*` or comma-joined field names.
    pub fn fields_clause(&self) -> String {
        if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        }
    }

    /// The query text without line breaks.
    pub fn to_single_line(&self) -> String {
        self.to_string().replace('\n', "")
    }
}

impl std::fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SELECT {} \nFROM {}", self.fields_clause(), self.source)?;
        if let Some(clause) = &self.predicate {
            write!(f, " \nWHERE {}", clause)?;
        }
        Ok(())
    }
}

/// Compile a source/filter/projection chain into a query.
pub fn compile_query(exp: &Expr) -> CqlResult<CompiledQuery> {
    let mut assembler = QueryAssembler::default();
    assembler.evaluate(exp)?;
    assembler.finish()
}

/// Per-call accumulating state. Never shared between compilations.
#[derive(Debug, Default)]
struct QueryAssembler {
    source: Option<String>,
    fields: Vec<String>,
    criteria: Option<String>,
}

impl QueryAssembler {
    fn evaluate(&mut self, exp: &Expr) -> CqlResult<()> {
        match exp.simplify() {
            Expr::Source(name) => {
                self.source = Some(name.clone());
                Ok(())
            }
            Expr::Call {
                method,
                target,
                argument,
            } => {
                self.evaluate(target)?;
                match method {
                    Method::Filter => self.add_criteria(argument),
                    Method::Project => self.add_fields(argument),
                }
            }
            other => Err(CqlError::unsupported(format!(
                "{} is not supported as a query.",
                other.kind()
            ))),
        }
    }

    fn add_criteria(&mut self, exp: &Expr) -> CqlResult<()> {
        let criteria = compile_predicate(exp)?;
        tracing::trace!(criteria = %criteria, "filter fragment");
        self.criteria = Some(conjoin(self.criteria.take(), criteria));
        Ok(())
    }

    fn add_fields(&mut self, exp: &Expr) -> CqlResult<()> {
        let fields = compile_projection(exp)?;
        tracing::trace!(?fields, "projection fragment");
        self.fields.extend(fields);
        Ok(())
    }

    fn finish(self) -> CqlResult<CompiledQuery> {
        let source = self
            .source
            .ok_or_else(|| CqlError::unsupported("Query has no source."))?;
        let query = CompiledQuery {
            source,
            fields: self.fields,
            predicate: self.criteria,
        };
        tracing::debug!(source = %query.source, "compiled query");
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use pretty_assertions::assert_eq;

    fn call(method: Method, target: Expr, argument: Expr) -> Expr {
        Expr::Call {
            method,
            target: Box::new(target),
            argument: Box::new(argument),
        }
    }

    #[test]
    fn test_source_only() {
        let q = compile_query(&source("Users")).unwrap();
        assert_eq!(q.to_string(), "SELECT * \nFROM Users");
        assert_eq!(q.to_single_line(), "SELECT * FROM Users");
    }

    #[test]
    fn test_where_and_select() {
        let chain = call(
            Method::Project,
            call(Method::Filter, source("Users"), eq("Id", 1234).lambda()),
            fields(["a", "b"]).lambda().quote(),
        );
        let q = compile_query(&chain).unwrap();
        assert_eq!(q.fields, vec!["a", "b"]);
        assert_eq!(q.to_string(), "SELECT a, b \nFROM Users \nWHERE Id = 1234");
    }

    #[test]
    fn test_filters_fold_left_first() {
        let chain = call(
            Method::Filter,
            call(
                Method::Filter,
                call(Method::Filter, source("Users"), eq("a", 1)),
                eq("b", 2),
            ),
            eq("c", 3),
        );
        let q = compile_query(&chain).unwrap();
        assert_eq!(
            q.predicate.as_deref(),
            Some("((a = 1 AND b = 2) AND c = 3)")
        );
    }

    #[test]
    fn test_identity_select() {
        let chain = call(Method::Project, source("Users"), row());
        assert_eq!(compile_query(&chain).unwrap().to_string(), "SELECT * \nFROM Users");
    }

    #[test]
    fn test_missing_source() {
        let err = compile_query(&eq("a", 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported expression: Compare is not supported as a query."
        );
    }

    #[test]
    fn test_failure_is_all_or_nothing() {
        let chain = call(
            Method::Filter,
            call(Method::Filter, source("Users"), eq("a", 1)),
            eq("b", 1) | (lit(1) * lit(2)),
        );
        assert!(compile_query(&chain).unwrap_err().is_unsupported());
    }
}
