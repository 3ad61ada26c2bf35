//! Helpers over `serde_json::Value` shared by comparisons and built-ins.

use std::cmp::Ordering;

use serde_json::{Number, Value};

/// Returns a human-readable type name for a value
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// True for null, booleans, numbers and strings.
pub fn is_scalar(v: &Value) -> bool {
    !matches!(v, Value::Array(_) | Value::Object(_))
}

/// Numeric ordering that stays exact for integers.
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Ordering between two numbers or two strings; `None` for any other pair.
pub fn compare_ordered(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Structural equality where `1` and `1.0` are equal.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| loose_eq(l, r)))
        }
        _ => a == b,
    }
}

/// Wraps an `f64` as a JSON number, integral values become integers.
pub fn number_from_f64(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number((n as i64).into())
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert!(loose_eq(&json!(1), &json!(1.0)));
        assert_eq!(compare_ordered(&json!(2), &json!(10.5)), Some(Ordering::Less));
        assert_eq!(compare_ordered(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(compare_ordered(&json!(true), &json!(false)), None);
    }

    #[test]
    fn whole_floats_become_integers() {
        assert_eq!(number_from_f64(4.0), json!(4));
        assert_eq!(number_from_f64(2.5), json!(2.5));
        assert_eq!(number_from_f64(f64::NAN), Value::Null);
    }
}
