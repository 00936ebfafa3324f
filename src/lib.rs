//! # fluent-cql
//!
//! Compiles strongly-typed predicate/projection trees into CQL.
//!
//! Two targets share one node model:
//! - a textual `SELECT ... FROM ... WHERE ...` query,
//! - an ordered list of `(field, operator, value)` clauses for secondary-index
//!   range scans.
//!
//! ## Quick Example
//!
//! ```
//! use fluent_cql::prelude::*;
//!
//! let query = Query::source("Users")
//!     .filter((col("Id").equals(1234) | col("Age").equals(10)) & col("Name").equals("Adama"))
//!     .select(fields(["Name", "Age"]));
//!
//! assert_eq!(
//!     query.to_cql().unwrap(),
//!     "SELECT Name, Age \nFROM Users \nWHERE ((Id = 1234 OR Age = 10) AND Name = 'Adama')"
//! );
//!
//! let lookup = IndexQuery::new("start", 20, eq("f1", "x") & gt("f2", 3.5)).compile().unwrap();
//! assert_eq!(lookup.clauses[1].operator, IndexOperator::Gt);
//! ```
//!
//! ## Grammar
//!
//! | Node         | Compiles to                     |
//! |--------------|---------------------------------|
//! | `Compare`    | `f = v`, `f IS NULL`, ...       |
//! | `Logical`    | `(l AND r)`, `(l OR r)`         |
//! | `Not`        | `NOT (p)`                       |
//! | `Membership` | `f IN (v1,v2,...)`              |
//! | `Projection` | `a, b` or `*`                   |

pub mod ast;
pub mod config;
pub mod error;
pub mod parser;
pub mod query;
pub mod record;
pub mod transpiler;

pub use transpiler::{compile_index, compile_predicate, compile_projection, compile_query};

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::error::*;
    pub use crate::parser::{parse_predicate, parse_projection};
    pub use crate::query::{IndexQuery, Query};
    pub use crate::record::{ColumnFamilyRecord, MutationEvent, MutationKind, Record};
    pub use crate::transpiler::{
        CompiledQuery, IndexClause, IndexClauseSet, IndexOperator, ToCql,
    };
}

/// Parse predicate text into an expression tree.
///
/// # Example
///
/// ```
/// use fluent_cql::parse;
///
/// let pred = parse("Id = 1234 && Age > 10").unwrap();
/// assert_eq!(
///     fluent_cql::compile_predicate(&pred).unwrap(),
///     "(Id = 1234 AND Age > 10)"
/// );
/// ```
pub fn parse(input: &str) -> Result<ast::Expr, error::CqlError> {
    parser::parse_predicate(input)
}
