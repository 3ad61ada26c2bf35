//! Resolution of single path steps against one JSON value.
//!
//! Every function here looks at one element of the value set; the evaluator
//! fans them out over the whole set and hands unresolved lookups to the
//! fallback policy.

pub mod fuzzy;

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    ast::{Node, Query, Slice, Step},
    config::{FuzzyConfig, Policy},
};

/// Exact key, then fuzzy match. `None` means unresolved.
///
/// Several fuzzy survivors count as unresolved: a property step selects one
/// value. `limit = 1` turns this into "closest key wins".
pub fn lookup_key<'v>(
    object: &'v Map<String, Value>,
    name: &str,
    fuzzy: &FuzzyConfig,
) -> Option<&'v Value> {
    if let Some(value) = object.get(name) {
        return Some(value);
    }
    if !fuzzy.enabled {
        return None;
    }

    match fuzzy::candidates(name, object.keys(), fuzzy).as_slice() {
        [only] => {
            debug!(requested = name, matched = *only, "fuzzy key match");
            object.get(*only)
        }
        [] => None,
        many => {
            debug!(requested = name, candidates = ?many, "ambiguous fuzzy match");
            None
        }
    }
}

/// Array element by index; negative counts from the end.
pub fn index(array: &[Value], i: i64) -> Option<&Value> {
    let len = array.len() as i64;
    let at = if i < 0 { len + i } else { i };
    if at < 0 {
        return None;
    }
    array.get(at as usize)
}

/// Python slice semantics; bounds are clamped, never an error.
pub fn slice(array: &[Value], bounds: &Slice) -> Vec<Value> {
    let len = array.len() as i64;
    let step = bounds.step.unwrap_or(1);

    let clamp = |bound: i64, low: i64, high: i64| {
        let at = if bound < 0 { bound.saturating_add(len) } else { bound };
        at.clamp(low, high)
    };

    let mut out = Vec::new();
    if step > 0 {
        let start = bounds.start.map_or(0, |s| clamp(s, 0, len));
        let end = bounds.end.map_or(len, |e| clamp(e, 0, len));
        let mut i = start;
        while i < end {
            out.push(array[i as usize].clone());
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else if step < 0 {
        let start = bounds.start.map_or(len - 1, |s| clamp(s, -1, len - 1));
        let end = bounds.end.map_or(-1, |e| clamp(e, -1, len - 1));
        let mut i = start;
        while i > end {
            out.push(array[i as usize].clone());
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    out
}

/// Members of an object in insertion order, or elements of an array.
pub fn wildcard(value: &Value) -> Vec<Value> {
    match value {
        Value::Object(map) => map.values().cloned().collect(),
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}

/// Copy of `object` without `names`, original key order kept.
pub fn omit(object: &Map<String, Value>, names: &[String]) -> Value {
    Value::Object(
        object
            .iter()
            .filter(|(key, _)| !names.iter().any(|n| n == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

/// Replaces aliased property steps with their target path.
///
/// Targets are absolute, so the steps before an alias are dropped and the
/// rest of the query continues from the target. Runs once per query, before
/// any element is resolved.
pub fn expand_aliases<'q>(query: &'q Query, policy: &Policy) -> Cow<'q, Query> {
    if !policy.has_aliases() {
        return Cow::Borrowed(query);
    }
    Cow::Owned(Query::from_steps(expand_steps(query.steps(), policy)))
}

fn expand_steps(steps: &[Step], policy: &Policy) -> Vec<Step> {
    let mut out: Vec<Step> = Vec::with_capacity(steps.len());

    for step in steps {
        if let Node::Property(name) = &step.node
            && let Some(target) = policy.alias(name)
        {
            debug!(alias = %name, target = %target, "expanding alias");
            out.clear();
            out.extend(
                target
                    .steps()
                    .iter()
                    .map(|s| Step::new(s.node.clone(), step.position)),
            );
            continue;
        }
        out.push(Step::new(expand_node(&step.node, policy), step.position));
    }
    out
}

fn expand_node(node: &Node, policy: &Policy) -> Node {
    match node {
        Node::Path(steps) => Node::Path(expand_steps(steps, policy)),
        Node::FunctionCall { name, args } => Node::FunctionCall {
            name: name.clone(),
            args: args.iter().map(|a| expand_node(a, policy)).collect(),
        },
        Node::Comparison { op, left, right } => Node::Comparison {
            op: *op,
            left: Box::new(expand_node(left, policy)),
            right: Box::new(expand_node(right, policy)),
        },
        Node::Condition { op, left, right } => Node::Condition {
            op: *op,
            left: Box::new(expand_node(left, policy)),
            right: Box::new(expand_node(right, policy)),
        },
        Node::Not(inner) => Node::Not(Box::new(expand_node(inner, policy))),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers() -> Vec<Value> {
        (0..5).map(|n| json!(n)).collect()
    }

    fn sliced(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<Value> {
        slice(&numbers(), &Slice { start, end, step })
    }

    #[test]
    fn test_slices() {
        assert_eq!(sliced(Some(1), Some(3), None), vec![json!(1), json!(2)]);
        assert_eq!(sliced(None, Some(2), None), vec![json!(0), json!(1)]);
        assert_eq!(sliced(Some(-2), None, None), vec![json!(3), json!(4)]);
        assert_eq!(sliced(Some(0), Some(5), Some(2)), vec![json!(0), json!(2), json!(4)]);
        assert_eq!(
            sliced(None, None, Some(-1)),
            vec![json!(4), json!(3), json!(2), json!(1), json!(0)]
        );
        assert_eq!(sliced(Some(3), Some(0), Some(-2)), vec![json!(3), json!(1)]);
        assert_eq!(sliced(Some(-100), Some(100), None).len(), 5);
        assert!(sliced(Some(4), Some(1), None).is_empty());
    }

    #[test]
    fn huge_steps_stop_at_the_first_element() {
        assert_eq!(sliced(Some(1), None, Some(i64::MAX)), vec![json!(1)]);
        assert_eq!(sliced(None, None, Some(i64::MAX)), vec![json!(0)]);
        assert_eq!(sliced(Some(3), None, Some(i64::MIN)), vec![json!(3)]);
        assert_eq!(sliced(None, None, Some(i64::MIN)), vec![json!(4)]);
        assert_eq!(sliced(Some(i64::MIN), Some(i64::MAX), None).len(), 5);
    }

    #[test]
    fn test_negative_index() {
        let items = numbers();
        assert_eq!(index(&items, -1), Some(&json!(4)));
        assert_eq!(index(&items, 0), Some(&json!(0)));
        assert_eq!(index(&items, 5), None);
        assert_eq!(index(&items, -6), None);
    }

    #[test]
    fn omit_keeps_key_order() {
        let object = json!({"z": 1, "a": 2, "m": 3});
        let Value::Object(map) = object else {
            unreachable!()
        };
        let result = omit(&map, &["a".to_string()]);
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "m"]);
    }
}
