//! Predicate text parser using nom.
//!
//! Lifts predicate text into the same expression tree the builders produce.
//!
//! # Syntax Overview
//!
//! ```text
//! (Id = 1234 || Age >= 10 + 2) && Name = 'Adama' && !(Tag IN ('a','b'))
//! ─┬   ─┬    ─┬        ─┬─┬─
//!  │    │     │         │ └── right-hand sides may be closed arithmetic
//!  │    │     │         └──── comparison: == = != <> >= <= > <
//!  │    │     └────────────── logical: && || ! (or AND OR NOT)
//!  │    └──────────────────── literal: integers, floats, 'text', null, true, false
//!  └───────────────────────── field: identifier or "quoted-identifier"
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, not, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

use crate::ast::{ArithOp, Binding, CompareOp, Expr, LogicalOp, Value};
use crate::error::{CqlError, CqlResult};

const RESERVED: &[&str] = &["and", "or", "not", "in", "null", "true", "false"];

/// Maximum nesting of groups and prefix operators.
pub const MAX_DEPTH: usize = 64;

/// Parse a complete predicate string.
pub fn parse_predicate(input: &str) -> CqlResult<Expr> {
    let input = input.trim();
    finish(input, parse_or(input, 0))
}

/// Parse a projection list: `*` for all fields, or comma-separated field names.
pub fn parse_projection(input: &str) -> CqlResult<Expr> {
    let input = input.trim();
    if input == "*" {
        return Ok(Expr::Row);
    }
    let result = map(separated_list1(char(','), ws(parse_field)), |names| {
        Expr::Projection(
            names
                .into_iter()
                .map(|n| Binding::new(Expr::Field(n)))
                .collect(),
        )
    })(input);
    finish(input, result)
}

fn finish<O>(input: &str, result: IResult<&str, O>) -> CqlResult<O> {
    match result {
        Ok(("", out)) => Ok(out),
        Ok((remaining, _)) => Err(CqlError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(CqlError::parse(
            input.len() - e.input.len(),
            format!("Nesting exceeds {} levels", MAX_DEPTH),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(CqlError::parse(
            input.len() - e.input.len(),
            format!("Unexpected input near '{}' ({:?})", preview(e.input), e.code),
        )),
        Err(nom::Err::Incomplete(_)) => {
            Err(CqlError::parse(input.len(), "Unexpected end of input"))
        }
    }
}

fn preview(s: &str) -> &str {
    match s.char_indices().nth(16) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Surround a parser with optional whitespace.
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive keyword not followed by an identifier character.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), not(satisfy(is_ident_char)))
}

/// Fail hard once nesting passes [`MAX_DEPTH`] so alternatives are not retried.
fn check_depth(input: &str, depth: usize) -> IResult<&str, ()> {
    if depth > MAX_DEPTH {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }
    Ok((input, ()))
}

fn parse_or(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_and(input, depth)?;
    let (input, rest) = many0(preceded(
        ws(alt((tag("||"), keyword("or")))),
        |i| parse_and(i, depth),
    ))(input)?;
    Ok((input, fold_logical(LogicalOp::Or, first, rest)))
}

fn parse_and(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_unary(input, depth)?;
    let (input, rest) = many0(preceded(
        ws(alt((tag("&&"), keyword("and")))),
        |i| parse_unary(i, depth),
    ))(input)?;
    Ok((input, fold_logical(LogicalOp::And, first, rest)))
}

fn fold_logical(op: LogicalOp, first: Expr, rest: Vec<Expr>) -> Expr {
    rest.into_iter().fold(first, |left, right| Expr::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn parse_unary(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = check_depth(input, depth)?;
    let (input, _) = multispace0(input)?;
    alt((
        map(
            preceded(alt((tag("!"), keyword("not"))), |i| {
                parse_unary(i, depth + 1)
            }),
            |e| Expr::Not(Box::new(e)),
        ),
        |i| parse_membership(i, depth),
        |i| parse_comparison(i, depth),
        delimited(char('('), ws(|i| parse_or(i, depth + 1)), char(')')),
    ))(input)
}

fn parse_membership(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, field) = ws(parse_field)(input)?;
    let (input, _) = keyword("in")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, items) = delimited(
        char('('),
        separated_list0(char(','), ws(|i| parse_additive(i, depth))),
        preceded(multispace0, char(')')),
    )(input)?;
    let (input, _) = multispace0(input)?;

    Ok((
        input,
        Expr::Membership {
            field: Box::new(Expr::Field(field)),
            values: Box::new(Expr::List(items)),
        },
    ))
}

fn parse_comparison(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, left) = ws(|i| parse_additive(i, depth))(input)?;
    let (input, op) = parse_compare_op(input)?;
    let (input, right) = ws(|i| parse_additive(i, depth))(input)?;

    Ok((
        input,
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    ))
}

fn parse_compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Ne, tag("<>")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Eq, tag("=")),
        value(CompareOp::Gt, tag(">")),
        value(CompareOp::Lt, tag("<")),
    ))(input)
}

fn parse_additive(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_term(input, depth)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(ArithOp::Add, char('+')),
            value(ArithOp::Sub, char('-')),
        ))),
        |i| parse_term(i, depth),
    ))(input)?;
    Ok((input, fold_arith(first, rest)))
}

fn parse_term(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_factor(input, depth)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(ArithOp::Mul, char('*')),
            value(ArithOp::Div, char('/')),
            value(ArithOp::Rem, char('%')),
        ))),
        |i| parse_factor(i, depth),
    ))(input)?;
    Ok((input, fold_arith(first, rest)))
}

fn fold_arith(first: Expr, rest: Vec<(ArithOp, Expr)>) -> Expr {
    rest.into_iter()
        .fold(first, |left, (op, right)| Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
}

fn parse_factor(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = check_depth(input, depth)?;
    preceded(
        multispace0,
        alt((
            map(preceded(char('-'), |i| parse_factor(i, depth + 1)), |e| {
                Expr::Negate(Box::new(e))
            }),
            delimited(char('('), ws(|i| parse_additive(i, depth + 1)), char(')')),
            map(parse_literal, Expr::Constant),
            map(parse_field, Expr::Field),
        )),
    )(input)
}

fn parse_literal(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Null, keyword("null")),
        value(Value::Bool(true), keyword("true")),
        value(Value::Bool(false), keyword("false")),
        parse_number,
        map(parse_text, Value::Text),
    ))(input)
}

/// Parse an integer or decimal number.
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)?;
    let parsed = if text.contains('.') {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    };
    match parsed {
        Some(v) => Ok((rest, v)),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::Digit))),
    }
}

/// Parse a single-quoted string; `''` stands for one quote.
fn parse_text(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('\'')(input)?;
    let mut out = String::new();
    loop {
        let Some(idx) = rest.find('\'') else {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)));
        };
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 1..];
        match rest.strip_prefix('\'') {
            Some(after) => {
                out.push('\'');
                rest = after;
            }
            None => return Ok((rest, out)),
        }
    }
}

/// Parse a field name: identifier or double-quoted identifier.
fn parse_field(input: &str) -> IResult<&str, String> {
    alt((
        map(
            delimited(char('"'), take_while1(|c: char| c != '"'), char('"')),
            str::to_string,
        ),
        map(parse_identifier, str::to_string),
    ))(input)
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let (rest, ident) = recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)?;
    if RESERVED.iter().any(|kw| ident.eq_ignore_ascii_case(kw)) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)));
    }
    Ok((rest, ident))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::transpiler::compile_predicate;

    fn cql(input: &str) -> String {
        compile_predicate(&parse_predicate(input).unwrap()).unwrap()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(parse_predicate("Id = 1234").unwrap(), eq("Id", 1234));
        assert_eq!(parse_predicate("Id==1234").unwrap(), eq("Id", 1234));
    }

    #[test]
    fn test_operators() {
        assert_eq!(cql("a != 1"), "a != 1");
        assert_eq!(cql("a <> 1"), "a != 1");
        assert_eq!(cql("a >= 1.5"), "a >= 1.5");
        assert_eq!(cql("a <= 1"), "a <= 1");
        assert_eq!(cql("a > 1"), "a > 1");
        assert_eq!(cql("a < 1"), "a < 1");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            cql("Id = 1234 || Age = 10 && Name = 'Adama'"),
            "(Id = 1234 OR (Age = 10 AND Name = 'Adama'))"
        );
        assert_eq!(
            cql("(Id = 1234 || Age = 10) && Name = 'Adama'"),
            "((Id = 1234 OR Age = 10) AND Name = 'Adama')"
        );
    }

    #[test]
    fn test_left_associative_chains() {
        assert_eq!(cql("a = 1 AND b = 2 and c = 3"), "((a = 1 AND b = 2) AND c = 3)");
    }

    #[test]
    fn test_not() {
        assert_eq!(cql("!(a = 1)"), "NOT (a = 1)");
        assert_eq!(cql("NOT a = 1"), "NOT (a = 1)");
    }

    #[test]
    fn test_null_and_bool_literals() {
        assert_eq!(cql("a = null"), "a IS NULL");
        assert_eq!(cql("a != NULL"), "a IS NOT NULL");
        assert_eq!(cql("a = true"), "a = true");
    }

    #[test]
    fn test_text_with_escaped_quote() {
        assert_eq!(cql("Name = 'O''Brien'"), "Name = 'O''Brien'");
        assert_eq!(
            parse_predicate("Name = 'O''Brien'").unwrap(),
            eq("Name", "O'Brien")
        );
    }

    #[test]
    fn test_quoted_field() {
        assert_eq!(cql("\"test-column\" = 'x'"), "test-column = 'x'");
    }

    #[test]
    fn test_membership() {
        assert_eq!(cql("f IN (1, 2, 3)"), "f IN (1,2,3)");
        assert_eq!(cql("f in ()"), "f IN ()");
        assert_eq!(cql("a = 1 && f in ('x')"), "(a = 1 AND f IN ('x'))");
    }

    #[test]
    fn test_arithmetic_on_right_side() {
        assert_eq!(cql("Id = 1000 + 2 * 117"), "Id = 1234");
        assert_eq!(cql("Id = -(3 - 5)"), "Id = 2");
    }

    #[test]
    fn test_keyword_prefixed_identifier() {
        assert_eq!(cql("notes = 1 && order = 2"), "(notes = 1 AND order = 2)");
    }

    #[test]
    fn test_trailing_input() {
        let err = parse_predicate("a = 1 )").unwrap_err();
        assert!(matches!(err, CqlError::Parse { position: 6, .. }));
    }

    #[test]
    fn test_malformed() {
        assert!(parse_predicate("a = ").is_err());
        assert!(parse_predicate("= 1").is_err());
        assert!(parse_predicate("a = 'open").is_err());
    }

    #[test]
    fn test_deep_negation_is_rejected() {
        let input = format!("{}a = 1", "!".repeat(10_000));
        let err = parse_predicate(&input).unwrap_err();
        assert!(matches!(err, CqlError::Parse { .. }));
        assert!(err.to_string().contains("Nesting exceeds"));
    }

    #[test]
    fn test_deep_groups_are_rejected() {
        let input = format!("{}a = 1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(
            parse_predicate(&input),
            Err(CqlError::Parse { .. })
        ));

        let input = format!("a = {}1", "-".repeat(10_000));
        assert!(matches!(
            parse_predicate(&input),
            Err(CqlError::Parse { .. })
        ));
    }

    #[test]
    fn test_nesting_within_limit() {
        let input = format!("{}a = 1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(cql(&input), "a = 1");
        let input = format!("{}a = 1", "!".repeat(MAX_DEPTH));
        assert!(parse_predicate(&input).is_ok());
    }

    #[test]
    fn test_projection() {
        assert_eq!(parse_projection("*").unwrap(), Expr::Row);
        assert_eq!(parse_projection("a, b").unwrap(), fields(["a", "b"]));
    }
}
