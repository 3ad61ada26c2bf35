//! What happens when a path step does not resolve.

use serde_json::Value;
use tracing::debug;

use crate::{
    ast::Step,
    config::{Fallback, InferPolicy},
    error::QueryError,
    evaluator::Evaluator,
    resolver::lookup_key,
};

/// A failed lookup, as seen by the fallback policy.
pub struct Unresolved<'a> {
    /// The step that failed
    pub step: &'a Step,
    /// Property name for key lookups; `None` for index/slice/omission steps
    pub key: Option<&'a str>,
    /// The element the step was applied to
    pub element: &'a Value,
    /// The evaluation base alternate queries start from
    pub base: &'a Value,
}

impl Unresolved<'_> {
    fn not_found(&self) -> QueryError {
        let step = match self.key {
            Some(key) => crate::ast::Node::Property(key.to_string()).to_string(),
            None => self.step.node.to_string(),
        };
        QueryError::PathNotFound {
            step,
            position: self.step.position,
        }
    }
}

/// Outcome of applying a fallback strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    /// Continue with these values in place of the missing one
    Substitute(Vec<Value>),
    /// Drop the element from the value set
    Skip,
}

/// Applies `fallback` to one unresolved lookup.
pub fn apply(
    fallback: &Fallback,
    missing: &Unresolved<'_>,
    evaluator: &Evaluator<'_>,
) -> Result<Recovery, QueryError> {
    match fallback {
        Fallback::Default(value) => {
            debug!(step = %missing.step.node, "fallback: substituting default value");
            Ok(Recovery::Substitute(vec![value.clone()]))
        }
        Fallback::Error => Err(missing.not_found()),
        Fallback::Skip => {
            debug!(step = %missing.step.node, "fallback: skipping element");
            Ok(Recovery::Skip)
        }
        Fallback::Infer(rules) => infer(rules, missing, evaluator),
    }
}

fn infer(
    rules: &InferPolicy,
    missing: &Unresolved<'_>,
    evaluator: &Evaluator<'_>,
) -> Result<Recovery, QueryError> {
    if missing.key.is_some()
        && let Value::Object(object) = missing.element
    {
        for alternate in &rules.alternate_keys {
            if let Some(value) = lookup_key(object, alternate, &evaluator.policy().fuzzy) {
                debug!(step = %missing.step.node, alternate = %alternate, "fallback: inferred key");
                return Ok(Recovery::Substitute(vec![value.clone()]));
            }
        }
    }

    // Alternates run strictly so a miss inside them cannot recurse into infer.
    let strict = evaluator.strict();
    for alternate in &rules.alternate_queries {
        match strict.eval_path(alternate.steps(), missing.base, None) {
            Ok(set) if !set.is_empty() => {
                debug!(step = %missing.step.node, alternate = %alternate, "fallback: inferred query");
                return Ok(Recovery::Substitute(set.into_values()));
            }
            Ok(_) | Err(QueryError::PathNotFound { .. }) => continue,
            Err(other) => return Err(other),
        }
    }

    debug!(step = %missing.step.node, "fallback: inference exhausted");
    match rules.exhausted.as_ref() {
        Fallback::Infer(_) => Err(missing.not_found()),
        terminal => apply(terminal, missing, evaluator),
    }
}
