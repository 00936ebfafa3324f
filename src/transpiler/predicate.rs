//! WHERE clause compiler.

use super::literal::evaluate;
use super::resolve_field;
use crate::ast::{CompareOp, Expr, Value};
use crate::error::{CqlError, CqlResult};

/// Compile a predicate node into a CQL clause.
pub fn compile_predicate(exp: &Expr) -> CqlResult<String> {
    match exp.simplify() {
        Expr::Compare { op, left, right } => compile_comparison(*op, left, right),
        Expr::Logical { op, left, right } => Ok(format!(
            "({} {} {})",
            compile_predicate(left)?,
            op.keyword(),
            compile_predicate(right)?
        )),
        Expr::Not(operand) => Ok(format!("NOT ({})", compile_predicate(operand)?)),
        Expr::Membership { field, values } => compile_membership(field, values),
        other => Err(CqlError::unsupported(format!(
            "{} is not supported.",
            other.kind()
        ))),
    }
}

/// Fold a new fragment into an existing clause, left fragment first.
pub fn conjoin(existing: Option<String>, new: String) -> String {
    match existing {
        Some(existing) if !existing.is_empty() => format!("({} AND {})", existing, new),
        _ => new,
    }
}

fn compile_comparison(op: CompareOp, left: &Expr, right: &Expr) -> CqlResult<String> {
    let field = resolve_field(left)?;
    let value = evaluate(right)?;

    let criteria = match (op, &value) {
        (CompareOp::Eq, Value::Null) => format!("{} IS NULL", field),
        (CompareOp::Ne, Value::Null) => format!("{} IS NOT NULL", field),
        _ => format!("{} {} {}", field, op.symbol(), value),
    };
    Ok(criteria)
}

fn compile_membership(field: &Expr, values: &Expr) -> CqlResult<String> {
    let field = resolve_field(field)?;

    // The whole set is evaluated before any element is rendered.
    let items = match evaluate(values)? {
        Value::List(items) => items,
        other => {
            return Err(CqlError::unsupported(format!(
                "Membership requires a list of values, found {}.",
                other.kind()
            )));
        }
    };

    let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    Ok(format!("{} IN ({})", field, rendered.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    #[test]
    fn test_every_operator() {
        let cases = [
            (eq("f", 5), "f = 5"),
            (ne("f", 5), "f != 5"),
            (gt("f", 5), "f > 5"),
            (ge("f", 5), "f >= 5"),
            (lt("f", 5), "f < 5"),
            (le("f", 5), "f <= 5"),
        ];
        for (pred, expected) in cases {
            assert_eq!(compile_predicate(&pred).unwrap(), expected);
        }
    }

    #[test]
    fn test_null_comparisons() {
        assert_eq!(compile_predicate(&eq("f", Value::Null)).unwrap(), "f IS NULL");
        assert_eq!(
            compile_predicate(&ne("f", Value::Null)).unwrap(),
            "f IS NOT NULL"
        );
        assert_eq!(compile_predicate(&gt("f", Value::Null)).unwrap(), "f > NULL");
    }

    #[test]
    fn test_text_is_quoted() {
        assert_eq!(
            compile_predicate(&eq("Name", "Adama")).unwrap(),
            "Name = 'Adama'"
        );
    }

    #[test]
    fn test_logical_nesting() {
        let pred = (eq("Id", 1234) | eq("Age", 10)) & eq("Name", "Adama");
        assert_eq!(
            compile_predicate(&pred).unwrap(),
            "((Id = 1234 OR Age = 10) AND Name = 'Adama')"
        );
    }

    #[test]
    fn test_not() {
        let pred = !(eq("Id", 1) & gt("Age", 2));
        assert_eq!(compile_predicate(&pred).unwrap(), "NOT ((Id = 1 AND Age > 2))");
    }

    #[test]
    fn test_membership() {
        assert_eq!(
            compile_predicate(&is_in("f", [1, 2, 3])).unwrap(),
            "f IN (1,2,3)"
        );
        assert_eq!(
            compile_predicate(&is_in("f", ["a", "b"])).unwrap(),
            "f IN ('a','b')"
        );
        assert_eq!(
            compile_predicate(&is_in("f", Vec::<i64>::new())).unwrap(),
            "f IN ()"
        );
    }

    #[test]
    fn test_membership_evaluates_elements() {
        let pred = col("f").is_in(Expr::List(vec![lit(1) + lit(1), -lit(4)]));
        assert_eq!(compile_predicate(&pred).unwrap(), "f IN (2,-4)");
    }

    #[test]
    fn test_membership_requires_list() {
        let err = compile_predicate(&col("f").is_in(lit(3))).unwrap_err();
        assert!(err.to_string().contains("found Int"));
    }

    #[test]
    fn test_right_side_is_evaluated() {
        let pred = col("Id").equals(lit(1000) + lit(234));
        assert_eq!(compile_predicate(&pred).unwrap(), "Id = 1234");
    }

    #[test]
    fn test_left_side_must_be_field() {
        let pred = lit(1).equals(col("Id"));
        assert!(compile_predicate(&pred).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_unsupported_kind_at_depth() {
        let pred = eq("a", 1) & (eq("b", 2) | (lit(1) + lit(2)));
        let err = compile_predicate(&pred).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported expression: Arithmetic is not supported."
        );
    }

    #[test]
    fn test_wrappers_are_transparent() {
        let pred = eq("Id", 1).lambda().quote();
        assert_eq!(compile_predicate(&pred).unwrap(), "Id = 1");
    }

    #[test]
    fn test_conjoin() {
        assert_eq!(conjoin(None, "a = 1".to_string()), "a = 1");
        assert_eq!(
            conjoin(Some("a = 1".to_string()), "b = 2".to_string()),
            "(a = 1 AND b = 2)"
        );
    }
}
