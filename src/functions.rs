//! Built-in functions invocable as pipeline stages (`.length()`, `.map(.name)`).
//!
//! Functions receive the whole value set. Most of them work on its
//! [`items`](ValueSet::items): a definite single array is opened up, so
//! `$.users.length()` counts users while `$.users.*.length()` counts the
//! fanned-out set just the same.

use std::collections::HashMap;

use regex::Regex;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde_json::Value;

use crate::{
    ast::Node,
    error::QueryError,
    evaluator::{Evaluator, ValueSet},
    value::{compare_ordered, loose_eq, number_from_f64, type_name},
};

/// Signature every built-in implements.
pub type BuiltinFn = fn(&Call<'_>) -> Result<ValueSet, QueryError>;

/// A registered function.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub summary: &'static str,
    pub call: BuiltinFn,
}

impl Builtin {
    fn expected_args(&self) -> String {
        if self.min_args == self.max_args {
            format!("{} argument(s)", self.min_args)
        } else {
            format!("{} to {} arguments", self.min_args, self.max_args)
        }
    }
}

/// One invocation: the arguments as written plus the incoming value set.
pub struct Call<'a> {
    pub name: &'a str,
    pub args: &'a [Node],
    pub input: ValueSet,
    evaluator: &'a Evaluator<'a>,
    base: &'a Value,
}

impl Call<'_> {
    /// Evaluates `arg` as a nested query against one element.
    fn eval_for(&self, arg: &Node, item: &Value) -> Result<ValueSet, QueryError> {
        let current = ValueSet::single(item.clone());
        match arg {
            Node::Literal(value) => Ok(ValueSet::single(value.clone())),
            Node::Current => Ok(current),
            Node::Path(steps) => self.evaluator.eval_path(steps, self.base, Some(&current)),
            node if node.is_condition() => Ok(ValueSet::single(Value::Bool(
                self.evaluator.test(node, self.base, &current)?,
            ))),
            other => Err(QueryError::type_mismatch(format!(
                "{}() cannot use '{}' as an argument",
                self.name, other
            ))),
        }
    }

    fn test_for(&self, arg: &Node, item: &Value) -> Result<bool, QueryError> {
        self.evaluator
            .test(arg, self.base, &ValueSet::single(item.clone()))
    }

    /// Evaluates argument `i` to one scalar, relative to the input set.
    fn scalar_arg(&self, i: usize) -> Result<Value, QueryError> {
        let arg = &self.args[i];
        self.evaluator
            .operand(arg, self.base, &self.input)?
            .ok_or_else(|| {
                QueryError::type_mismatch(format!(
                    "{}() argument '{}' resolved to nothing",
                    self.name, arg
                ))
            })
    }

    fn objects(&self) -> Result<Vec<serde_json::Map<String, Value>>, QueryError> {
        self.input
            .items()
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(QueryError::type_mismatch(format!(
                    "{}() requires objects, got {}",
                    self.name,
                    type_name(&other)
                ))),
            })
            .collect()
    }

    /// One result per element; stays definite when the input was.
    fn per_item(&self, values: Vec<Value>) -> ValueSet {
        if values.len() == 1 && self.input.is_definite() {
            self.input.with_values(values)
        } else {
            ValueSet::many(values)
        }
    }
}

/// Name to built-in lookup table.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Builtin>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in BUILTINS {
            registry.register(*builtin);
        }
        registry
    }

    pub fn register(&mut self, builtin: Builtin) {
        self.functions.insert(builtin.name, builtin);
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.functions.get(name)
    }

    /// Registered functions sorted by name.
    pub fn builtins(&self) -> Vec<&Builtin> {
        let mut all: Vec<&Builtin> = self.functions.values().collect();
        all.sort_by_key(|b| b.name);
        all
    }

    /// Looks up `name`, checks arity and runs it over `input`.
    pub fn invoke(
        &self,
        name: &str,
        args: &[Node],
        input: ValueSet,
        evaluator: &Evaluator<'_>,
        base: &Value,
    ) -> Result<ValueSet, QueryError> {
        let builtin = self.get(name).ok_or_else(|| QueryError::UnknownFunction {
            name: name.to_string(),
        })?;

        if args.len() < builtin.min_args || args.len() > builtin.max_args {
            return Err(QueryError::Arity {
                name: name.to_string(),
                expected: builtin.expected_args(),
                got: args.len(),
            });
        }

        let call = Call {
            name,
            args,
            input,
            evaluator,
            base,
        };
        (builtin.call)(&call)
    }
}

const fn builtin(
    name: &'static str,
    min_args: usize,
    max_args: usize,
    summary: &'static str,
    call: BuiltinFn,
) -> Builtin {
    Builtin {
        name,
        min_args,
        max_args,
        summary,
        call,
    }
}

const BUILTINS: &[Builtin] = &[
    builtin("length", 0, 0, "number of elements, members or characters", length),
    builtin("keys", 0, 0, "member names of every object", keys),
    builtin("values", 0, 0, "member values of every object", values),
    builtin("map", 1, 1, "apply a nested query to every element", map),
    builtin("filter", 1, 1, "keep elements for which a condition holds", filter),
    builtin("sum", 0, 0, "exact sum of numbers", sum),
    builtin("avg", 0, 0, "average of numbers, null when empty", avg),
    builtin("min", 0, 0, "smallest number or string", min),
    builtin("max", 0, 0, "largest number or string", max),
    builtin("first", 0, 0, "first element", first),
    builtin("last", 0, 0, "last element", last),
    builtin("reverse", 0, 0, "elements in reverse order", reverse),
    builtin("sort", 0, 0, "numbers or strings in ascending order", sort),
    builtin("unique", 0, 0, "elements with duplicates removed", unique),
    builtin("flatten", 0, 0, "splice nested arrays one level", flatten),
    builtin("type", 0, 0, "JSON type name of each value", type_of),
    builtin("matches", 1, 1, "whether each string matches a regex", matches),
    builtin("contains", 1, 1, "membership in an array or substring test", contains),
];

// ========================================
// Core
// ========================================

fn length(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let input = &call.input;
    let count = match input.values() {
        [value] if input.is_definite() => match value {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            Value::String(s) => s.chars().count(),
            Value::Null => 0,
            other => {
                return Err(QueryError::type_mismatch(format!(
                    "length() requires array, object or string, got {}",
                    type_name(other)
                )));
            }
        },
        values => values.len(),
    };
    Ok(ValueSet::single(Value::from(count)))
}

fn keys(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let keys = call
        .objects()?
        .into_iter()
        .flat_map(|map| map.into_iter().map(|(k, _)| Value::String(k)))
        .collect();
    Ok(ValueSet::many(keys))
}

fn values(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let values = call
        .objects()?
        .into_iter()
        .flat_map(|map| map.into_iter().map(|(_, v)| v))
        .collect();
    Ok(ValueSet::many(values))
}

fn map(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let mut out = Vec::new();
    for item in call.input.items() {
        out.extend(call.eval_for(&call.args[0], &item)?.into_values());
    }
    Ok(ValueSet::many(out))
}

fn filter(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let condition = &call.args[0];
    if !condition.is_condition() {
        return Err(QueryError::type_mismatch(format!(
            "filter() requires a condition, got '{}'",
            condition
        )));
    }

    let mut kept = Vec::new();
    for item in call.input.items() {
        if call.test_for(condition, &item)? {
            kept.push(item);
        }
    }
    Ok(ValueSet::many(kept))
}

// ========================================
// Aggregates
// ========================================

fn numbers(call: &Call<'_>) -> Result<Vec<serde_json::Number>, QueryError> {
    call.input
        .items()
        .into_iter()
        .map(|item| match item {
            Value::Number(n) => Ok(n),
            other => Err(QueryError::type_mismatch(format!(
                "{}() requires numbers, got {}",
                call.name,
                type_name(&other)
            ))),
        })
        .collect()
}

fn to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        Decimal::from_i64(i)
    } else if let Some(u) = n.as_u64() {
        Decimal::from_u64(u)
    } else {
        // parse the shortest decimal text so 0.1 stays 0.1
        let text = n.to_string();
        text.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

fn sum(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let numbers = numbers(call)?;

    let exact: Option<Decimal> = numbers
        .iter()
        .try_fold(Decimal::ZERO, |acc, n| acc.checked_add(to_decimal(n)?));

    let total = match exact {
        Some(d) if d.is_integer() && d.to_i64().is_some() => d.to_i64().map(Value::from),
        Some(d) => d.to_f64().map(number_from_f64),
        None => None,
    }
    .unwrap_or_else(|| number_from_f64(numbers.iter().filter_map(|n| n.as_f64()).sum()));

    Ok(ValueSet::single(total))
}

fn avg(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let numbers = numbers(call)?;
    if numbers.is_empty() {
        return Ok(ValueSet::single(Value::Null));
    }
    let total: f64 = numbers.iter().filter_map(|n| n.as_f64()).sum();
    Ok(ValueSet::single(number_from_f64(total / numbers.len() as f64)))
}

fn extreme(call: &Call<'_>, keep_right: fn(std::cmp::Ordering) -> bool) -> Result<ValueSet, QueryError> {
    let mut best: Option<Value> = None;
    for item in call.input.items() {
        best = match best {
            None => Some(item),
            Some(current) => {
                let ordering = compare_ordered(&current, &item).ok_or_else(|| {
                    QueryError::type_mismatch(format!(
                        "{}() cannot compare {} with {}",
                        call.name,
                        type_name(&current),
                        type_name(&item)
                    ))
                })?;
                if keep_right(ordering) { Some(item) } else { Some(current) }
            }
        };
    }
    Ok(ValueSet::single(best.unwrap_or(Value::Null)))
}

fn min(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    extreme(call, |o| o.is_gt())
}

fn max(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    extreme(call, |o| o.is_lt())
}

// ========================================
// Ordering and shape
// ========================================

fn first(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    Ok(ValueSet::optional(call.input.items().into_iter().next()))
}

fn last(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    Ok(ValueSet::optional(call.input.items().pop()))
}

fn reverse(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let mut items = call.input.items();
    items.reverse();
    Ok(ValueSet::many(items))
}

fn sort(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let mut items = call.input.items();
    if let Some(pair) = items
        .windows(2)
        .find(|pair| compare_ordered(&pair[0], &pair[1]).is_none())
    {
        return Err(QueryError::type_mismatch(format!(
            "sort() cannot order {} with {}",
            type_name(&pair[0]),
            type_name(&pair[1])
        )));
    }
    items.sort_by(|a, b| compare_ordered(a, b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(ValueSet::many(items))
}

fn unique(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let mut seen: Vec<Value> = Vec::new();
    for item in call.input.items() {
        if !seen.iter().any(|s| loose_eq(s, &item)) {
            seen.push(item);
        }
    }
    Ok(ValueSet::many(seen))
}

fn flatten(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let mut result = Vec::new();
    for item in call.input.items() {
        match item {
            Value::Array(inner) => result.extend(inner),
            other => result.push(other),
        }
    }
    Ok(ValueSet::many(result))
}

fn type_of(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let names = call
        .input
        .values()
        .iter()
        .map(|v| Value::String(type_name(v).to_string()))
        .collect();
    Ok(call.input.with_values(names))
}

// ========================================
// Predicates
// ========================================

fn matches(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let pattern = match call.scalar_arg(0)? {
        Value::String(s) => s,
        other => {
            return Err(QueryError::type_mismatch(format!(
                "matches() pattern must be string, got {}",
                type_name(&other)
            )));
        }
    };
    let re = Regex::new(&pattern)
        .map_err(|e| QueryError::type_mismatch(format!("invalid regex: {e}")))?;

    let results = call
        .input
        .items()
        .iter()
        .map(|item| Value::Bool(matches!(item, Value::String(s) if re.is_match(s))))
        .collect();
    Ok(call.per_item(results))
}

fn contains(call: &Call<'_>) -> Result<ValueSet, QueryError> {
    let needle = call.scalar_arg(0)?;
    let found = match (call.input.values(), &needle) {
        ([Value::String(haystack)], Value::String(part)) if call.input.is_definite() => {
            haystack.contains(part.as_str())
        }
        _ => call.input.items().iter().any(|item| loose_eq(item, &needle)),
    };
    Ok(ValueSet::single(Value::Bool(found)))
}
