// tests/parser_tests.rs

use jsonsift::ast::{CompareOp, LogicOp, Node, Slice};
use jsonsift::lexer::{Lexer, tokenize};
use jsonsift::parser::{Parser, parse, parse_str};
use serde_json::json;

fn nodes(query: &str) -> Vec<Node> {
    parse_str(query)
        .unwrap_or_else(|e| panic!("parse({}) failed: {}", query, e))
        .steps()
        .iter()
        .map(|s| s.node.clone())
        .collect()
}

fn prop(name: &str) -> Node {
    Node::Property(name.to_string())
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ============================================================================
// Path Steps
// ============================================================================

#[test]
fn test_root_only() {
    assert_eq!(nodes("$"), vec![Node::Root]);
    assert_eq!(nodes(""), vec![Node::Root]);
}

#[test]
fn test_properties() {
    assert_eq!(nodes("$.a.b"), vec![Node::Root, prop("a"), prop("b")]);
    assert_eq!(nodes("a.b"), vec![Node::Root, prop("a"), prop("b")]);
    assert_eq!(nodes(".a"), vec![Node::Root, prop("a")]);
    assert_eq!(nodes(r#"$."a b""#), vec![Node::Root, prop("a b")]);
    assert_eq!(nodes(r#"$["a b"]"#), vec![Node::Root, prop("a b")]);
}

#[test]
fn test_index_and_slice() {
    assert_eq!(nodes("$[-1]"), vec![Node::Root, Node::Index(-1)]);
    assert_eq!(
        nodes("$[1:3]"),
        vec![
            Node::Root,
            Node::Slice(Slice {
                start: Some(1),
                end: Some(3),
                step: None
            })
        ]
    );
    assert_eq!(
        nodes("$[::-1]"),
        vec![
            Node::Root,
            Node::Slice(Slice {
                start: None,
                end: None,
                step: Some(-1)
            })
        ]
    );
    assert_eq!(
        nodes("$[:2]"),
        vec![
            Node::Root,
            Node::Slice(Slice {
                start: None,
                end: Some(2),
                step: None
            })
        ]
    );
}

#[test]
fn test_wildcards() {
    assert_eq!(nodes("$.*"), vec![Node::Root, Node::Wildcard]);
    assert_eq!(nodes("$[*]"), vec![Node::Root, Node::Wildcard]);
}

#[test]
fn test_multi_key_spellings() {
    let expected = vec![Node::Root, Node::MultiKey(keys(&["a", "b"]))];
    assert_eq!(nodes(r#"["a","b"]"#), expected);
    assert_eq!(nodes("${a, b}"), expected);
    assert_eq!(nodes("$.{a,b}"), expected);
    assert_eq!(nodes(r#"{a, "b"}"#), expected);
}

#[test]
fn test_omission() {
    assert_eq!(
        nodes("$!{password,token}"),
        vec![Node::Root, Node::Omission(keys(&["password", "token"]))]
    );
    assert_eq!(
        nodes("$.user.!{id}"),
        vec![Node::Root, prop("user"), Node::Omission(keys(&["id"]))]
    );
}

#[test]
fn test_function_calls() {
    assert_eq!(
        nodes("$.items.length()"),
        vec![
            Node::Root,
            prop("items"),
            Node::FunctionCall {
                name: "length".to_string(),
                args: vec![]
            }
        ]
    );

    match nodes("$.items.filter(.price > 10)").as_slice() {
        [Node::Root, _, Node::FunctionCall { name, args }] => {
            assert_eq!(name, "filter");
            assert!(matches!(
                args.as_slice(),
                [Node::Comparison {
                    op: CompareOp::GreaterThan,
                    ..
                }]
            ));
        }
        other => panic!("Expected a filter call, got {:?}", other),
    }

    match nodes(r#"$.s.matches("^a", "x")"#).as_slice() {
        [_, _, Node::FunctionCall { args, .. }] => {
            assert_eq!(
                args,
                &vec![Node::Literal(json!("^a")), Node::Literal(json!("x"))]
            );
        }
        other => panic!("Expected a call, got {:?}", other),
    }
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_trailing_comparison_uses_the_path_result() {
    let steps = nodes("$.age > 18");
    assert_eq!(steps.len(), 3);
    assert_eq!(
        steps[2],
        Node::Comparison {
            op: CompareOp::GreaterThan,
            left: Box::new(Node::Current),
            right: Box::new(Node::Literal(json!(18))),
        }
    );
}

#[test]
fn test_literals() {
    let cases = vec![
        ("$.a == 1.5", json!(1.5)),
        ("$.a == -3", json!(-3)),
        (r#"$.a == "x""#, json!("x")),
        ("$.a == true", json!(true)),
        ("$.a == false", json!(false)),
        ("$.a == null", json!(null)),
    ];
    for (query, expected) in cases {
        match nodes(query).last() {
            Some(Node::Comparison { right, .. }) => {
                assert_eq!(**right, Node::Literal(expected), "Failed for query: {}", query);
            }
            other => panic!("Expected comparison for {}, got {:?}", query, other),
        }
    }
}

#[test]
fn test_operand_paths() {
    match nodes("$.a == $.b[0]").last() {
        Some(Node::Comparison { right, .. }) => match &**right {
            Node::Path(steps) => {
                let kinds: Vec<&Node> = steps.iter().map(|s| &s.node).collect();
                assert_eq!(kinds, vec![&Node::Root, &prop("b"), &Node::Index(0)]);
            }
            other => panic!("Expected path operand, got {:?}", other),
        },
        other => panic!("Expected comparison, got {:?}", other),
    }

    match nodes("@.x < y").last() {
        Some(Node::Comparison { left, right, .. }) => {
            assert!(matches!(&**left, Node::Path(steps) if steps[0].node == Node::Current));
            assert!(matches!(&**right, Node::Path(steps) if steps[0].node == Node::Current));
        }
        other => panic!("Expected comparison, got {:?}", other),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    let query = parse_str("$.a == 1 || $.b == 2 && $.c == 3").unwrap();
    match query.condition() {
        Some(Node::Condition {
            op: LogicOp::Or,
            left,
            right,
        }) => {
            assert!(matches!(**left, Node::Comparison { .. }));
            assert!(matches!(**right, Node::Condition { op: LogicOp::And, .. }));
        }
        other => panic!("Expected OR at the top, got {:?}", other),
    }
}

#[test]
fn test_conditions_are_left_associative() {
    let query = parse_str("$.a == 1 && $.b == 2 && $.c == 3").unwrap();
    match query.condition() {
        Some(Node::Condition {
            op: LogicOp::And,
            left,
            ..
        }) => assert!(matches!(**left, Node::Condition { op: LogicOp::And, .. })),
        other => panic!("Expected AND at the top, got {:?}", other),
    }
}

#[test]
fn test_grouping_and_negation() {
    let query = parse_str("!($.a == 1 || $.b == 2) && $.c == 3").unwrap();
    match query.condition() {
        Some(Node::Condition {
            op: LogicOp::And,
            left,
            ..
        }) => match &**left {
            Node::Not(inner) => {
                assert!(matches!(**inner, Node::Condition { op: LogicOp::Or, .. }))
            }
            other => panic!("Expected NOT, got {:?}", other),
        },
        other => panic!("Expected AND at the top, got {:?}", other),
    }
}

#[test]
fn test_is_predicate() {
    assert!(parse_str("$.a > 1").unwrap().is_predicate());
    assert!(!parse_str("$.a").unwrap().is_predicate());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_parser_errors() {
    let test_cases = vec![
        ("$[0:1:0]", "step cannot be zero"),
        ("$[]", "Empty brackets"),
        ("${}", "Empty key list"),
        ("$!{}", "Empty key list"),
        ("$.a > 1 .b", "cannot follow a condition"),
        ("$.a > ", "Expected value"),
        ("$.a &&", "Expected comparison operator"),
        ("$.a[1", "Expected ']'"),
        ("$.", "after '.'"),
        ("$.a)", "end of query"),
        ("$.a.map(", "Expected value"),
        (r#"$["a", 1]"#, "Expected string"),
    ];

    for (input, fragment) in test_cases {
        let err = parse_str(input).unwrap_err();
        assert!(
            err.message.contains(fragment),
            "Expected '{}' in '{}' for input: {}",
            fragment,
            err.message,
            input
        );
    }
}

#[test]
fn test_error_positions() {
    assert_eq!(parse_str("$.a > 1 .b").unwrap_err().position, 8);
    assert_eq!(parse_str("$[0:1:0]").unwrap_err().position, 6);
    assert_eq!(parse_str("$.a)").unwrap_err().position, 3);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_parse_is_deterministic() {
    let queries = vec![
        "$",
        "$.users[*].name",
        r#"$.users.filter(.age >= 18 && .role != "guest").map(.name)"#,
        "$.a[1:-1:2]{x,y}!{z}",
        "!($.a == 1) || $.b < 2",
    ];
    for query in queries {
        let first = parse(tokenize(query).unwrap()).unwrap();
        let second = parse(tokenize(query).unwrap()).unwrap();
        assert_eq!(first, second, "Failed for query: {}", query);
    }
}

#[test]
fn test_parser_from_lexer() {
    let mut parser = Parser::new(Lexer::new("$.a")).unwrap();
    let query = parser.parse_query().unwrap();
    assert_eq!(query.to_string(), "$.a");
}

#[test]
fn test_display_round_trips() {
    let queries = vec![
        "$.users[0:2]{name,age}",
        "$.a!{b}",
        r#"$["a b"].x"#,
        "$.n.filter(@ > 2)",
    ];
    for query in queries {
        let parsed = parse_str(query).unwrap();
        let reparsed = parse_str(&parsed.to_string()).unwrap();
        let strip = |q: &jsonsift::Query| -> Vec<Node> {
            q.steps().iter().map(|s| s.node.clone()).collect()
        };
        assert_eq!(strip(&parsed), strip(&reparsed), "Failed for query: {}", query);
    }
}
