//! Fluent query builders.
//!
//! [`Query`] records a method chain the way a LINQ-style provider would: the
//! source node sits deepest, and each `filter`/`select` call wraps the chain
//! built so far in an [`Expr::Call`]. Compilation happens on demand.

use crate::ast::{Expr, Method, Value};
use crate::error::CqlResult;
use crate::transpiler::{
    CompiledQuery, IndexClauseSet, ToCql, compile_index, compile_query,
};

/// A query over one column family.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    chain: Expr,
}

impl Query {
    /// Start a query reading from `source`.
    ///
    /// # Example
    ///
    /// ```
    /// use fluent_cql::prelude::*;
    ///
    /// let cql = Query::source("Users")
    ///     .filter(eq("Id", 1234))
    ///     .select(col("Age"))
    ///     .to_cql()
    ///     .unwrap();
    /// assert_eq!(cql, "SELECT Age \nFROM Users \nWHERE Id = 1234");
    /// ```
    pub fn source(name: impl Into<String>) -> Self {
        Self {
            chain: Expr::Source(name.into()),
        }
    }

    /// Add a WHERE fragment. Repeated calls are AND-ed, earlier fragments first.
    pub fn filter(self, predicate: Expr) -> Self {
        self.call(Method::Filter, predicate)
    }

    /// Add a SELECT fragment. Repeated calls append fields.
    pub fn select(self, projection: Expr) -> Self {
        self.call(Method::Project, projection)
    }

    fn call(self, method: Method, argument: Expr) -> Self {
        Self {
            chain: Expr::Call {
                method,
                target: Box::new(self.chain),
                argument: Box::new(Expr::Lambda(Box::new(argument))),
            },
        }
    }

    /// The expression tree built so far.
    pub fn expr(&self) -> &Expr {
        &self.chain
    }

    pub fn into_expr(self) -> Expr {
        self.chain
    }

    /// Compile to a structured query.
    pub fn compile(&self) -> CqlResult<CompiledQuery> {
        compile_query(&self.chain)
    }
}

impl ToCql for Query {
    fn to_cql(&self) -> CqlResult<String> {
        self.chain.to_cql()
    }
}

impl From<&str> for Query {
    fn from(source: &str) -> Self {
        Query::source(source)
    }
}

impl From<String> for Query {
    fn from(source: String) -> Self {
        Query::source(source)
    }
}

/// A secondary-index lookup: start key, row limit and a conjunctive predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    start_key: Value,
    limit: u32,
    predicate: Expr,
}

impl IndexQuery {
    pub fn new(start_key: impl Into<Value>, limit: u32, predicate: Expr) -> Self {
        Self {
            start_key: start_key.into(),
            limit,
            predicate,
        }
    }

    /// AND another predicate onto the lookup.
    pub fn and(self, predicate: Expr) -> Self {
        Self {
            predicate: self.predicate & predicate,
            ..self
        }
    }

    pub fn start_key(&self) -> &Value {
        &self.start_key
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn compile(&self) -> CqlResult<IndexClauseSet> {
        compile_index(self.start_key.clone(), self.limit, &self.predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::transpiler::IndexOperator;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chain_is_built_bottom_up() {
        let q = Query::source("Users").filter(eq("a", 1));
        match q.expr() {
            Expr::Call {
                method: Method::Filter,
                target,
                ..
            } => assert_eq!(**target, Expr::Source("Users".to_string())),
            other => panic!("expected filter call, got {:?}", other),
        }
    }

    #[test]
    fn test_select_all() {
        let q = Query::from("Users").select(row());
        assert_eq!(q.to_cql().unwrap(), "SELECT * \nFROM Users");
    }

    #[test]
    fn test_repeated_filters_and_selects() {
        let q = Query::source("Users")
            .filter(eq("Id", 1234))
            .select(col("Age"))
            .filter(eq("Age", 10))
            .select(fields(["Name"]));
        let compiled = q.compile().unwrap();
        assert_eq!(compiled.fields, vec!["Age", "Name"]);
        assert_eq!(
            compiled.to_single_line(),
            "SELECT Age, Name FROM Users WHERE (Id = 1234 AND Age = 10)"
        );
    }

    #[test]
    fn test_index_query() {
        let set = IndexQuery::new("test", 20, eq("a", "x"))
            .and(gt("b", 3.14))
            .compile()
            .unwrap();
        assert_eq!(set.clauses.len(), 2);
        assert_eq!(set.clauses[1].operator, IndexOperator::Gt);
        assert_eq!(set.clauses[1].value, Value::Float(3.14));
    }
}
