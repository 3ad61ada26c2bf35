use serde_json::Value;
use tracing::trace;

use crate::{
    ast::{Node, Query, Step},
    config::{Fallback, Policy},
    error::QueryError,
    fallback::{self, Recovery, Unresolved},
    functions::FunctionRegistry,
    output::Output,
    resolver::{self, expand_aliases, lookup_key},
};

static STRICT: Fallback = Fallback::Error;

/// The ordered values currently flowing through a pipeline.
///
/// `definite` stays true while every step selected at most one value per
/// input (property, index, omission, aggregates); fan-out steps clear it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueSet {
    values: Vec<Value>,
    definite: bool,
}

impl ValueSet {
    pub fn single(value: Value) -> Self {
        ValueSet {
            values: vec![value],
            definite: true,
        }
    }

    pub fn many(values: Vec<Value>) -> Self {
        ValueSet {
            values,
            definite: false,
        }
    }

    /// Definite set holding at most one value.
    pub fn optional(value: Option<Value>) -> Self {
        ValueSet {
            values: value.into_iter().collect(),
            definite: true,
        }
    }

    /// A set with the given values that keeps the definiteness of `self`.
    pub fn with_values(&self, values: Vec<Value>) -> Self {
        ValueSet {
            values,
            definite: self.definite,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn is_definite(&self) -> bool {
        self.definite
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The elements a function operates on: a definite single array is
    /// opened up, anything else is the set itself.
    pub fn items(&self) -> Vec<Value> {
        match self.values.as_slice() {
            [Value::Array(items)] if self.definite => items.clone(),
            values => values.to_vec(),
        }
    }
}

/// Walks a query against a JSON value.
///
/// Holds only shared references; one evaluator can serve any number of
/// queries, and separate threads may each run their own.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    policy: &'a Policy,
    fallback: &'a Fallback,
    functions: &'a FunctionRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(policy: &'a Policy, functions: &'a FunctionRegistry) -> Self {
        Evaluator {
            policy,
            fallback: &policy.fallback,
            functions,
        }
    }

    pub fn policy(&self) -> &'a Policy {
        self.policy
    }

    /// Same evaluator with the `error` fallback in place of the configured one.
    pub fn strict(&self) -> Evaluator<'a> {
        Evaluator {
            fallback: &STRICT,
            ..*self
        }
    }

    /// Evaluates a complete query against a JSON document.
    ///
    /// Aliases are expanded once up front. The pipeline threads a value set
    /// through every path step; a trailing comparison or condition turns the
    /// final set into a boolean.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonsift::{Evaluator, FunctionRegistry, Output, Policy, parse_str};
    /// use serde_json::json;
    ///
    /// let policy = Policy::default();
    /// let functions = FunctionRegistry::with_builtins();
    /// let evaluator = Evaluator::new(&policy, &functions);
    ///
    /// let query = parse_str("$.age > 18").unwrap();
    /// let result = evaluator.eval_query(&query, &json!({"age": 25})).unwrap();
    /// assert_eq!(result, Output::Bool(true));
    /// ```
    pub fn eval_query(&self, query: &Query, document: &Value) -> Result<Output, QueryError> {
        let query = expand_aliases(query, self.policy);
        let steps = query.steps();

        let (path, condition) = match steps.split_last() {
            Some((last, rest)) if last.node.is_condition() => (rest, Some(&last.node)),
            _ => (steps, None),
        };

        let set = self.eval_path(path, document, None)?;
        match condition {
            Some(condition) => Ok(Output::Bool(self.test(condition, document, &set)?)),
            None => Ok(Output::from(set)),
        }
    }

    /// Evaluates path steps. `Root` starts from `base`, `Current` from
    /// `current` (or `base` when there is no current set).
    pub fn eval_path(
        &self,
        steps: &[Step],
        base: &Value,
        current: Option<&ValueSet>,
    ) -> Result<ValueSet, QueryError> {
        let mut set = match current {
            Some(set) => set.clone(),
            None => ValueSet::single(base.clone()),
        };

        for step in steps {
            trace!(step = %step.node, size = set.len(), "evaluating step");
            set = match &step.node {
                Node::Root => ValueSet::single(base.clone()),
                Node::Current => set,
                Node::FunctionCall { name, args } => {
                    self.functions.invoke(name, args, set, self, base)?
                }
                node if node.is_path_step() => self.apply_step(step, base, set)?,
                other => {
                    return Err(QueryError::type_mismatch(format!(
                        "'{}' cannot be used as a path step",
                        other
                    )));
                }
            };
        }
        Ok(set)
    }

    fn apply_step(&self, step: &Step, base: &Value, set: ValueSet) -> Result<ValueSet, QueryError> {
        let fans_out = matches!(
            step.node,
            Node::Wildcard | Node::Slice(_) | Node::MultiKey(_)
        );
        let definite = set.definite && !fans_out;

        let mut out = Vec::with_capacity(set.len());
        for element in &set.values {
            self.resolve(step, element, base, &mut out)?;
        }
        Ok(ValueSet {
            values: out,
            definite,
        })
    }

    /// Resolves one step against one element, appending to `out`.
    fn resolve(
        &self,
        step: &Step,
        element: &Value,
        base: &Value,
        out: &mut Vec<Value>,
    ) -> Result<(), QueryError> {
        match (&step.node, element) {
            (Node::Property(name), _) => self.resolve_key(step, name, element, base, out),
            (Node::MultiKey(names), _) => {
                for name in names {
                    match self.policy.alias(name) {
                        Some(target) => {
                            let resolved = self.eval_path(target.steps(), base, None)?;
                            out.extend(resolved.into_values());
                        }
                        None => self.resolve_key(step, name, element, base, out)?,
                    }
                }
                Ok(())
            }
            (Node::Index(i), Value::Array(items)) => match resolver::index(items, *i) {
                Some(value) => {
                    out.push(value.clone());
                    Ok(())
                }
                None => self.recover(step, None, element, base, out),
            },
            (Node::Slice(bounds), Value::Array(items)) => {
                out.extend(resolver::slice(items, bounds));
                Ok(())
            }
            (Node::Wildcard, _) => {
                out.extend(resolver::wildcard(element));
                Ok(())
            }
            (Node::Omission(names), Value::Object(object)) => {
                out.push(resolver::omit(object, names));
                Ok(())
            }
            _ => self.recover(step, None, element, base, out),
        }
    }

    fn resolve_key(
        &self,
        step: &Step,
        name: &str,
        element: &Value,
        base: &Value,
        out: &mut Vec<Value>,
    ) -> Result<(), QueryError> {
        let found = match element {
            Value::Object(object) => lookup_key(object, name, &self.policy.fuzzy),
            _ => None,
        };
        match found {
            Some(value) => {
                out.push(value.clone());
                Ok(())
            }
            None => self.recover(step, Some(name), element, base, out),
        }
    }

    fn recover(
        &self,
        step: &Step,
        key: Option<&str>,
        element: &Value,
        base: &Value,
        out: &mut Vec<Value>,
    ) -> Result<(), QueryError> {
        let missing = Unresolved {
            step,
            key,
            element,
            base,
        };
        match fallback::apply(self.fallback, &missing, self)? {
            Recovery::Substitute(values) => out.extend(values),
            Recovery::Skip => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn items_open_a_definite_array_only() {
        let single = ValueSet::single(json!([1, 2]));
        assert_eq!(single.items(), vec![json!(1), json!(2)]);

        let fanned = ValueSet::many(vec![json!([1, 2])]);
        assert_eq!(fanned.items(), vec![json!([1, 2])]);
    }
}
