// tests/function_tests.rs

use jsonsift::{
    ConfigSnapshot, Evaluator, FunctionRegistry, Output, Policy, QueryError, ValueSet, evaluate,
    functions::Builtin, parse_str,
};
use serde_json::{Value, json};

fn eval(query: &str, doc: &Value) -> Result<Output, QueryError> {
    evaluate(query, doc, &ConfigSnapshot::default())
}

fn value(query: &str, doc: &Value) -> Value {
    eval(query, doc)
        .unwrap_or_else(|e| panic!("{} failed: {}", query, e))
        .into_value()
}

fn inventory() -> Value {
    json!({
        "items": [
            {"sku": "a1", "price": 10, "qty": 2, "tags": ["new", "sale"]},
            {"sku": "b2", "price": 2.5, "qty": 0, "tags": ["sale"]},
            {"sku": "c3", "price": 7, "qty": 5, "tags": []}
        ],
        "owner": {"name": "Ann", "email": "ann@example.com"}
    })
}

// ============================================================================
// Core
// ============================================================================

#[test]
fn test_length() {
    let doc = inventory();
    assert_eq!(value("$.items.length()", &doc), json!(3));
    assert_eq!(value("$.owner.length()", &doc), json!(2));
    assert_eq!(value("$.owner.name.length()", &doc), json!(3));
    assert_eq!(value("$.items.*.tags.length()", &doc), json!(3));
    assert_eq!(value("$.items[0].tags.length()", &doc), json!(2));
}

#[test]
fn test_length_of_a_number_is_a_type_mismatch() {
    let err = eval("$.items[0].price.length()", &inventory()).unwrap_err();
    assert!(matches!(err, QueryError::TypeMismatch(_)));
}

#[test]
fn test_keys_and_values() {
    let doc = inventory();
    assert_eq!(value("$.owner.keys()", &doc), json!(["name", "email"]));
    assert_eq!(
        value("$.owner.values()", &doc),
        json!(["Ann", "ann@example.com"])
    );
}

#[test]
fn test_keys_require_objects() {
    let err = eval("$.items[0].tags.keys()", &inventory()).unwrap_err();
    assert_eq!(err.code(), "E_TYPE_MISMATCH");
}

#[test]
fn test_map() {
    let doc = inventory();
    assert_eq!(value("$.items.map(.sku)", &doc), json!(["a1", "b2", "c3"]));
    assert_eq!(
        value("$.items.map(.tags)", &doc),
        json!([["new", "sale"], ["sale"], []])
    );
    assert_eq!(
        value("$.items.map(.qty > 0)", &doc),
        json!([true, false, true])
    );
}

#[test]
fn test_filter() {
    let doc = inventory();
    assert_eq!(
        value("$.items.filter(.qty > 0).map(.sku)", &doc),
        json!(["a1", "c3"])
    );
    assert_eq!(
        value(r#"$.items.filter(.price < 8 && .sku != "b2").map(.sku)"#, &doc),
        json!(["c3"])
    );
    assert_eq!(value("$.items.filter(.qty > 100)", &doc), json!([]));
}

#[test]
fn test_filter_with_current_element() {
    let doc = json!({"n": [1, 5, 3, 8]});
    assert_eq!(value("$.n.filter(@ > 2)", &doc), json!([5, 3, 8]));
}

#[test]
fn test_filter_requires_a_condition() {
    let err = eval("$.items.filter(.qty)", &inventory()).unwrap_err();
    assert!(matches!(err, QueryError::TypeMismatch(_)));
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn test_sum_is_exact() {
    let doc = json!({"a": [0.1, 0.2], "b": [1, 2, 3], "c": []});
    assert_eq!(value("$.a.sum()", &doc), json!(0.3));
    assert_eq!(value("$.b.sum()", &doc), json!(6));
    assert_eq!(value("$.c.sum()", &doc), json!(0));
}

#[test]
fn test_avg_min_max() {
    let doc = inventory();
    assert_eq!(value("$.items.map(.qty).avg()", &doc), json!(2.3333333333333335));
    assert_eq!(value("$.items.map(.price).min()", &doc), json!(2.5));
    assert_eq!(value("$.items.map(.price).max()", &doc), json!(10));
    assert_eq!(value("$.items.map(.sku).max()", &doc), json!("c3"));
    assert_eq!(value("$.items[0:0].avg()", &doc), Value::Null);
}

#[test]
fn test_sum_of_strings_is_a_type_mismatch() {
    let err = eval("$.items.map(.sku).sum()", &inventory()).unwrap_err();
    assert_eq!(err.code(), "E_TYPE_MISMATCH");
}

#[test]
fn test_min_of_mixed_types_is_a_type_mismatch() {
    let err = eval("$.x.min()", &json!({"x": [1, "a"]})).unwrap_err();
    assert_eq!(err.code(), "E_TYPE_MISMATCH");
}

// ============================================================================
// Ordering and Shape
// ============================================================================

#[test]
fn test_first_and_last() {
    let doc = inventory();
    assert_eq!(value("$.items.first().sku", &doc), json!("a1"));
    assert_eq!(value("$.items.last().sku", &doc), json!("c3"));
    assert_eq!(value("$.items[0:0].first()", &doc), json!([]));
}

#[test]
fn test_reverse_sort_unique_flatten() {
    let doc = json!({"n": [3, 1, 2, 1], "s": ["b", "a"], "nested": [[1, 2], 3, [4]]});
    assert_eq!(value("$.n.reverse()", &doc), json!([1, 2, 1, 3]));
    assert_eq!(value("$.n.sort()", &doc), json!([1, 1, 2, 3]));
    assert_eq!(value("$.s.sort()", &doc), json!(["a", "b"]));
    assert_eq!(value("$.n.unique()", &doc), json!([3, 1, 2]));
    assert_eq!(value("$.nested.flatten()", &doc), json!([1, 2, 3, 4]));
    assert_eq!(
        value("$.items.*.tags.flatten().unique()", &inventory()),
        json!(["new", "sale"])
    );
}

#[test]
fn test_sort_of_mixed_types_is_a_type_mismatch() {
    let err = eval("$.x.sort()", &json!({"x": [1, "a"]})).unwrap_err();
    assert!(matches!(err, QueryError::TypeMismatch(_)));
}

#[test]
fn test_type() {
    let doc = json!({"a": [1, "x", null, {}, [], true]});
    assert_eq!(value("$.a.type()", &doc), json!("array"));
    assert_eq!(
        value("$.a.*.type()", &doc),
        json!(["number", "string", "null", "object", "array", "boolean"])
    );
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_matches() {
    let doc = inventory();
    assert_eq!(
        value(r#"$.owner.email.matches("@example\\.com$")"#, &doc),
        json!(true)
    );
    assert_eq!(
        value(r#"$.items.map(.sku).matches("^[ab]")"#, &doc),
        json!([true, true, false])
    );
    assert_eq!(
        eval(r#"$.owner.name.matches("^A") == true"#, &doc).unwrap(),
        Output::Bool(true)
    );
}

#[test]
fn test_matches_invalid_pattern() {
    let err = eval(r#"$.owner.name.matches("(")"#, &inventory()).unwrap_err();
    assert_eq!(err.code(), "E_TYPE_MISMATCH");
}

#[test]
fn test_contains() {
    let doc = inventory();
    assert_eq!(value(r#"$.items[0].tags.contains("sale")"#, &doc), json!(true));
    assert_eq!(value(r#"$.items[2].tags.contains("sale")"#, &doc), json!(false));
    assert_eq!(value(r#"$.owner.email.contains("@")"#, &doc), json!(true));
    assert_eq!(
        value(r#"$.items.filter(.tags.contains("new") == true).map(.sku)"#, &doc),
        json!(["a1"])
    );
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_unknown_function() {
    match eval("$.items.explode()", &inventory()) {
        Err(QueryError::UnknownFunction { name }) => assert_eq!(name, "explode"),
        other => panic!("Expected UnknownFunction, got {:?}", other),
    }
}

#[test]
fn test_arity() {
    match eval("$.items.length(1)", &inventory()) {
        Err(QueryError::Arity { name, got, .. }) => {
            assert_eq!(name, "length");
            assert_eq!(got, 1);
        }
        other => panic!("Expected Arity, got {:?}", other),
    }
    assert_eq!(eval("$.items.map()", &inventory()).unwrap_err().code(), "E_ARITY");
}

#[test]
fn test_function_at_query_start() {
    assert_eq!(value("length()", &json!([1, 2])), json!(2));
}

#[test]
fn test_builtins_are_listed_by_name() {
    let registry = FunctionRegistry::with_builtins();
    let names: Vec<&str> = registry.builtins().iter().map(|b| b.name).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    for expected in ["length", "keys", "values", "map", "filter", "sum", "matches"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}

fn double(call: &jsonsift::functions::Call<'_>) -> Result<ValueSet, QueryError> {
    let doubled = call
        .input
        .items()
        .iter()
        .map(|v| json!(v.as_i64().unwrap_or(0) * 2))
        .collect();
    Ok(ValueSet::many(doubled))
}

#[test]
fn test_custom_function_registration() {
    let mut registry = FunctionRegistry::with_builtins();
    registry.register(Builtin {
        name: "double",
        min_args: 0,
        max_args: 0,
        summary: "twice every integer",
        call: double,
    });

    let policy = Policy::default();
    let evaluator = Evaluator::new(&policy, &registry);
    let query = parse_str("$.n.double().sum()").unwrap();
    let result = evaluator.eval_query(&query, &json!({"n": [1, 2, 3]})).unwrap();
    assert_eq!(result, Output::Value(json!(12)));
}
