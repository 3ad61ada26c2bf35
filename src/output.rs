//! Query results and their JSON rendering.
//!
//! A query produces one of three shapes:
//!
//! - **Value** - the path selected at most one value per step, so the
//!   result is that value itself
//! - **Values** - a wildcard, slice or key group fanned out, so the result
//!   is the ordered list of everything selected
//! - **Bool** - the query ended in a comparison or condition
//!
//! # Examples
//!
//! ```
//! use jsonsift::output::{Output, to_json};
//! use serde_json::json;
//!
//! assert_eq!(to_json(&Output::Value(json!({"a": 1}))), r#"{"a":1}"#);
//! assert_eq!(to_json(&Output::Values(vec![json!(1), json!(2)])), "[1,2]");
//! assert_eq!(to_json(&Output::Bool(true)), "true");
//! ```

use serde_json::Value;

use crate::evaluator::ValueSet;

/// Result of evaluating a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Value(Value),
    Values(Vec<Value>),
    Bool(bool),
}

impl Output {
    /// Collapses the result into a single JSON value; `Values` becomes an
    /// array.
    pub fn into_value(self) -> Value {
        match self {
            Output::Value(value) => value,
            Output::Values(values) => Value::Array(values),
            Output::Bool(b) => Value::Bool(b),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Output::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<ValueSet> for Output {
    fn from(set: ValueSet) -> Self {
        if set.is_definite() && set.len() == 1 {
            let mut values = set.into_values();
            match values.pop() {
                Some(value) => Output::Value(value),
                None => Output::Values(values),
            }
        } else {
            Output::Values(set.into_values())
        }
    }
}

impl From<Output> for Value {
    fn from(output: Output) -> Self {
        output.into_value()
    }
}

/// Compact JSON, object members in document order.
pub fn to_json(output: &Output) -> String {
    render(output, false)
}

/// Two-space indented JSON.
pub fn to_json_pretty(output: &Output) -> String {
    render(output, true)
}

fn render(output: &Output, pretty: bool) -> String {
    let value = output.clone().into_value();
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    // serializing a serde_json::Value cannot fail: keys are always strings
    rendered.unwrap_or_default()
}
