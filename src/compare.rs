//! Comparisons and boolean conditions over resolved values.

use std::cmp::Ordering;

use serde_json::Value;

use crate::{
    ast::{CompareOp, LogicOp, Node},
    error::QueryError,
    evaluator::{Evaluator, ValueSet},
    value::{compare_ordered, is_scalar, loose_eq, type_name},
};

/// Applies a comparison operator to two scalars.
///
/// `==` and `!=` never fail: values of different types are simply unequal.
/// Ordering operators need two numbers or two strings.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, QueryError> {
    let accepts: fn(Ordering) -> bool = match op {
        CompareOp::Equal => return Ok(loose_eq(left, right)),
        CompareOp::NotEqual => return Ok(!loose_eq(left, right)),
        CompareOp::LessThan => Ordering::is_lt,
        CompareOp::LessEqual => Ordering::is_le,
        CompareOp::GreaterThan => Ordering::is_gt,
        CompareOp::GreaterEqual => Ordering::is_ge,
    };

    let ordering = compare_ordered(left, right).ok_or_else(|| {
        QueryError::type_mismatch(format!(
            "Cannot compare {} {} {} (ordering requires two numbers or two strings)",
            type_name(left),
            op,
            type_name(right)
        ))
    })?;
    Ok(accepts(ordering))
}

impl Evaluator<'_> {
    /// Evaluates a comparison or condition against the value set flowing
    /// into it. `&&` and `||` short-circuit left to right.
    pub fn test(&self, node: &Node, base: &Value, current: &ValueSet) -> Result<bool, QueryError> {
        match node {
            Node::Comparison { op, left, right } => {
                let (Some(l), Some(r)) = (
                    self.operand(left, base, current)?,
                    self.operand(right, base, current)?,
                ) else {
                    // an operand skipped by the fallback policy matches nothing
                    return Ok(false);
                };
                compare(*op, &l, &r)
            }
            Node::Condition { op, left, right } => {
                let l = self.test(left, base, current)?;
                match (op, l) {
                    (LogicOp::And, false) => Ok(false),
                    (LogicOp::Or, true) => Ok(true),
                    _ => self.test(right, base, current),
                }
            }
            Node::Not(inner) => Ok(!self.test(inner, base, current)?),
            other => Err(QueryError::type_mismatch(format!(
                "'{}' is not a comparison or condition",
                other
            ))),
        }
    }

    /// Resolves an operand to a single scalar; `None` when it resolved to
    /// nothing.
    pub fn operand(
        &self,
        node: &Node,
        base: &Value,
        current: &ValueSet,
    ) -> Result<Option<Value>, QueryError> {
        let set = match node {
            Node::Literal(value) => return Ok(Some(value.clone())),
            Node::Current => current.clone(),
            Node::Path(steps) => self.eval_path(steps, base, Some(current))?,
            other => {
                return Err(QueryError::type_mismatch(format!(
                    "'{}' cannot be used as a comparison operand",
                    other
                )));
            }
        };

        let mut values = set.into_values();
        if values.len() > 1 {
            return Err(QueryError::type_mismatch(format!(
                "comparison operand '{}' resolved to {} values, expected one",
                node,
                values.len()
            )));
        }
        match values.pop() {
            None => Ok(None),
            Some(value) if is_scalar(&value) => Ok(Some(value)),
            Some(value) => Err(QueryError::type_mismatch(format!(
                "comparison operand '{}' is {}, expected a scalar",
                node,
                type_name(&value)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_across_types_is_false_not_an_error() {
        assert!(!compare(CompareOp::Equal, &json!("1"), &json!(1)).unwrap());
        assert!(compare(CompareOp::NotEqual, &json!(null), &json!(false)).unwrap());
    }

    #[test]
    fn ordering_needs_comparable_operands() {
        assert!(compare(CompareOp::LessThan, &json!("apple"), &json!("banana")).unwrap());
        assert!(compare(CompareOp::GreaterEqual, &json!(2.5), &json!(2)).unwrap());
        let err = compare(CompareOp::GreaterThan, &json!(true), &json!(1)).unwrap_err();
        assert_eq!(err.code(), "E_TYPE_MISMATCH");
    }

    #[test]
    fn each_ordering_operator_on_equal_operands() {
        let cases = vec![
            (CompareOp::LessThan, false),
            (CompareOp::LessEqual, true),
            (CompareOp::GreaterThan, false),
            (CompareOp::GreaterEqual, true),
        ];
        for (op, expected) in cases {
            assert_eq!(
                compare(op, &json!(3), &json!(3.0)).unwrap(),
                expected,
                "Failed for operator: {}",
                op
            );
        }
    }
}
