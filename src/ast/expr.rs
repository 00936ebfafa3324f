use serde::{Deserialize, Serialize};

use super::operators::{ArithOp, CompareOp, LogicalOp, Method};
use super::values::Value;

/// A node of a predicate/projection tree.
///
/// Trees are built by the caller (see [`crate::ast::builders`] and
/// [`crate::parser`]) and consumed read-only by the compilers. Every leaf is
/// already a concrete value, or a closed computation over concrete values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Constant(Value),
    /// Field access on the record (`f["Age"]`)
    Field(String),
    /// The record itself (identity projection)
    Row,
    /// Binary comparison
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Boolean combinator
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Boolean negation
    Not(Box<Expr>),
    /// `field IN values`; `values` must evaluate to a list
    Membership { field: Box<Expr>, values: Box<Expr> },
    /// Ordered collection of values
    List(Vec<Expr>),
    /// Arithmetic over literals
    Arithmetic {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Numeric negation
    Negate(Box<Expr>),
    /// Query source (column family)
    Source(String),
    /// Object-construction style projection
    Projection(Vec<Binding>),
    /// Method-chain step; `target` is the query built so far
    Call {
        method: Method,
        target: Box<Expr>,
        argument: Box<Expr>,
    },
    /// Type coercion wrapper
    Convert(Box<Expr>),
    /// Quoted sub-tree wrapper
    Quote(Box<Expr>),
    /// Lambda body wrapper
    Lambda(Box<Expr>),
}

/// One member of a [`Expr::Projection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Member name in the constructed object, if any
    pub alias: Option<String>,
    pub expr: Expr,
}

impl Binding {
    pub fn new(expr: Expr) -> Self {
        Self { alias: None, expr }
    }

    pub fn named(alias: impl Into<String>, expr: Expr) -> Self {
        Self {
            alias: Some(alias.into()),
            expr,
        }
    }
}

impl Expr {
    /// Node kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "Constant",
            Expr::Field(_) => "Field",
            Expr::Row => "Row",
            Expr::Compare { .. } => "Compare",
            Expr::Logical { .. } => "Logical",
            Expr::Not(_) => "Not",
            Expr::Membership { .. } => "Membership",
            Expr::List(_) => "List",
            Expr::Arithmetic { .. } => "Arithmetic",
            Expr::Negate(_) => "Negate",
            Expr::Source(_) => "Source",
            Expr::Projection(_) => "Projection",
            Expr::Call { .. } => "Call",
            Expr::Convert(_) => "Convert",
            Expr::Quote(_) => "Quote",
            Expr::Lambda(_) => "Lambda",
        }
    }

    /// Strip coercion, quoting and lambda wrappers until a canonical node remains.
    pub fn simplify(&self) -> &Expr {
        let mut exp = self;
        while let Expr::Convert(inner) | Expr::Quote(inner) | Expr::Lambda(inner) = exp {
            exp = inner.as_ref();
        }
        exp
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Constant(v) => write!(f, "{}", v),
            Expr::Field(name) => write!(f, "{}", name),
            Expr::Row => write!(f, "row"),
            Expr::Compare { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Logical { op, left, right } => {
                write!(f, "({} {} {})", left, op.keyword(), right)
            }
            Expr::Not(inner) => write!(f, "NOT {}", inner),
            Expr::Membership { field, values } => write!(f, "{} IN {}", field, values),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Expr::Arithmetic { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Negate(inner) => write!(f, "-{}", inner),
            Expr::Source(name) => write!(f, "{}", name),
            Expr::Projection(bindings) => {
                write!(f, "{{ ")?;
                for (i, b) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &b.alias {
                        Some(alias) => write!(f, "{} = {}", alias, b.expr)?,
                        None => write!(f, "{}", b.expr)?,
                    }
                }
                write!(f, " }}")
            }
            Expr::Call {
                method,
                target,
                argument,
            } => write!(f, "{}.{}({})", target, method, argument),
            Expr::Convert(inner) | Expr::Quote(inner) | Expr::Lambda(inner) => {
                write!(f, "{}", inner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_strips_nested_wrappers() {
        let field = Expr::Field("Age".to_string());
        let wrapped = Expr::Lambda(Box::new(Expr::Quote(Box::new(Expr::Convert(Box::new(
            field.clone(),
        ))))));
        assert_eq!(wrapped.simplify(), &field);
    }

    #[test]
    fn test_simplify_is_identity_on_canonical_nodes() {
        let node = Expr::Not(Box::new(Expr::Convert(Box::new(Expr::Row))));
        // Only the outermost wrappers are removed.
        assert_eq!(node.simplify(), &node);
    }

    #[test]
    fn test_display() {
        let node = Expr::Logical {
            op: LogicalOp::And,
            left: Box::new(Expr::Compare {
                op: CompareOp::Eq,
                left: Box::new(Expr::Field("Id".to_string())),
                right: Box::new(Expr::Constant(Value::Int(1234))),
            }),
            right: Box::new(Expr::Not(Box::new(Expr::Compare {
                op: CompareOp::Gt,
                left: Box::new(Expr::Field("Age".to_string())),
                right: Box::new(Expr::Constant(Value::Int(10))),
            }))),
        };
        assert_eq!(node.to_string(), "((Id = 1234) AND NOT (Age > 10))");
    }
}
