use fluent_cql::prelude::*;
use fluent_cql::{compile_predicate, compile_query};
use pretty_assertions::assert_eq;

fn users() -> Query {
    ColumnFamilyRecord::new("key", "Users").query()
}

#[test]
fn test_provider() {
    let cql = users().to_cql().unwrap();
    assert_eq!(cql, "SELECT * \nFROM Users");
}

#[test]
fn test_select_identity() {
    let compiled = users().select(row()).compile().unwrap();
    assert_eq!(compiled.to_single_line(), "SELECT * FROM Users");
}

#[test]
fn test_select_one_column() {
    let projection = Expr::Projection(vec![Binding::named("Age", col("Age"))]);
    let compiled = users().select(projection).compile().unwrap();
    assert_eq!(compiled.to_single_line(), "SELECT Age FROM Users");
}

#[test]
fn test_where_one_parameter() {
    let compiled = users()
        .filter(col("Id").equals(1234))
        .select(row())
        .compile()
        .unwrap();
    assert_eq!(compiled.to_single_line(), "SELECT * FROM Users WHERE Id = 1234");
}

#[test]
fn test_where_two_and_parameter() {
    let compiled = users()
        .filter(col("Id").equals(1234) & col("Age").equals(10))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.to_single_line(),
        "SELECT * FROM Users WHERE (Id = 1234 AND Age = 10)"
    );
}

#[test]
fn test_where_two_or_parameter() {
    let compiled = users()
        .filter(col("Id").equals(1234) | col("Age").equals(10))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.to_single_line(),
        "SELECT * FROM Users WHERE (Id = 1234 OR Age = 10)"
    );
}

#[test]
fn test_where_three_complex_parameter() {
    let compiled = users()
        .filter((col("Id").equals(1234) | col("Age").equals(10)) & col("Name").equals("Adama"))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.to_single_line(),
        "SELECT * FROM Users WHERE ((Id = 1234 OR Age = 10) AND Name = 'Adama')"
    );
}

#[test]
fn test_line_breaks_are_part_of_the_query() {
    let cql = users()
        .filter(eq("Id", 1))
        .select(fields(["a", "b"]))
        .to_cql()
        .unwrap();
    assert_eq!(cql, "SELECT a, b \nFROM Users \nWHERE Id = 1");
}

#[test]
fn test_parsed_and_built_predicates_agree() {
    let parsed = parse_predicate("(Id = 1234 || Age = 10) && Name = 'Adama'").unwrap();
    let built = (eq("Id", 1234) | eq("Age", 10)) & eq("Name", "Adama");
    assert_eq!(parsed, built);
}

#[test]
fn test_chain_round_trips_through_json() {
    let query = users()
        .filter(is_in("Id", [1, 2, 3]))
        .select(fields(["Name"]));
    let json = serde_json::to_string(query.expr()).unwrap();
    let restored: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(
        compile_query(&restored).unwrap().to_single_line(),
        "SELECT Name FROM Users WHERE Id IN (1,2,3)"
    );
}

#[test]
fn test_membership_set_is_evaluated_once_before_formatting() {
    let mut ids = vec![1, 2];
    let pred = is_in("Id", ids.clone());
    ids.push(3);
    // The node captured the set at build time.
    assert_eq!(compile_predicate(&pred).unwrap(), "Id IN (1,2)");
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_unsupported_node_fails_whole_query() {
    let err = users()
        .filter(eq("Id", 1))
        .filter(col("Age") + lit(1))
        .compile()
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(
        err.to_string(),
        "Unsupported expression: Arithmetic is not supported."
    );
}

#[test]
fn test_compiled_query_is_shareable() {
    let compiled = users().filter(eq("Id", 1)).compile().unwrap();
    let handle = std::thread::spawn(move || compiled.to_string());
    assert_eq!(handle.join().unwrap(), "SELECT * \nFROM Users \nWHERE Id = 1");
}
