//! Configuration snapshot consumed by the engine.
//!
//! [`ConfigSnapshot`] is the serde shape callers hand in. It is checked once
//! by [`ConfigSnapshot::validate`], which returns a [`Policy`]: aliases and
//! alternate queries parsed, fallback strategy typed. The engine only ever
//! reads a `Policy`.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ast::Query, error::QueryError, parser::parse_str};

/// Raw configuration, as stored by the surrounding application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigSnapshot {
    pub aliases: Vec<Alias>,
    pub fallback: FallbackConfig,
    pub fuzzy: FuzzyConfig,
}

/// A shorthand property name that expands to a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub alias: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Substitute `value`
    Default,
    /// Abort with `PathNotFound`
    #[default]
    Error,
    /// Drop the element from the value set
    Skip,
    /// Try alternate keys, then alternate queries
    Infer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infer_rules: Option<InferRules>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferRules {
    pub alternate_keys: Vec<String>,
    pub alternate_queries: Vec<String>,
    /// Strategy applied once every alternative failed; `error` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<TerminalConfig>,
}

/// Terminal strategy nested inside `inferRules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    pub strategy: Strategy,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FuzzyConfig {
    pub enabled: bool,
    /// Maximum edit distance a candidate key may have
    pub distance: usize,
    /// Maximum number of candidates kept; `0` disables the match
    pub limit: usize,
    pub ignore_case: bool,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        FuzzyConfig {
            enabled: false,
            distance: 2,
            limit: 1,
            ignore_case: false,
        }
    }
}

/// Keeps an explicit `null` distinct from a missing field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ConfigSnapshot {
    /// Loads a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, QueryError> {
        serde_json::from_str(json)
            .map_err(|e| QueryError::invalid_config_caused_by("malformed configuration", e))
    }

    /// Checks the snapshot invariants and compiles it.
    pub fn validate(&self) -> Result<Policy, QueryError> {
        Ok(Policy {
            aliases: self.compile_aliases()?,
            fallback: compile_fallback(&self.fallback)?,
            fuzzy: self.fuzzy,
        })
    }

    fn compile_aliases(&self) -> Result<Vec<CompiledAlias>, QueryError> {
        let mut names = HashSet::new();
        let mut targets = HashSet::new();
        let mut compiled = Vec::with_capacity(self.aliases.len());

        for Alias { alias, path } in &self.aliases {
            if alias.trim().is_empty() {
                return Err(QueryError::invalid_config("alias name cannot be empty"));
            }
            if !names.insert(alias.as_str()) {
                return Err(QueryError::invalid_config(format!(
                    "duplicate alias '{}'",
                    alias
                )));
            }
            if !targets.insert(path.trim()) {
                return Err(QueryError::invalid_config(format!(
                    "alias '{}' repeats target path '{}'",
                    alias, path
                )));
            }
            let target = compile_path(path, &format!("alias '{}'", alias))?;
            compiled.push(CompiledAlias {
                name: alias.clone(),
                target,
            });
        }
        Ok(compiled)
    }
}

fn compile_path(path: &str, owner: &str) -> Result<Query, QueryError> {
    let query = parse_str(path).map_err(|e| {
        QueryError::invalid_config_caused_by(format!("{} has an unparsable path '{}'", owner, path), e)
    })?;
    if query.is_predicate() {
        return Err(QueryError::invalid_config(format!(
            "{} must be a path, not a condition: '{}'",
            owner, path
        )));
    }
    Ok(query)
}

fn compile_fallback(config: &FallbackConfig) -> Result<Fallback, QueryError> {
    let FallbackConfig {
        strategy,
        value,
        infer_rules,
    } = config;

    if *strategy != Strategy::Infer && infer_rules.is_some() {
        return Err(QueryError::invalid_config(
            "fallback.inferRules is only allowed with the 'infer' strategy",
        ));
    }

    match strategy {
        Strategy::Infer => {
            if value.is_some() {
                return Err(QueryError::invalid_config(
                    "fallback.value is only allowed with the 'default' strategy",
                ));
            }
            let rules = infer_rules.as_ref().ok_or_else(|| {
                QueryError::invalid_config("the 'infer' strategy requires fallback.inferRules")
            })?;
            compile_infer(rules)
        }
        other => compile_terminal(*other, value, "fallback"),
    }
}

fn compile_terminal(
    strategy: Strategy,
    value: &Option<Value>,
    owner: &str,
) -> Result<Fallback, QueryError> {
    match (strategy, value) {
        (Strategy::Default, Some(value)) => Ok(Fallback::Default(value.clone())),
        (Strategy::Default, None) => Err(QueryError::invalid_config(format!(
            "the 'default' strategy requires {}.value",
            owner
        ))),
        (_, Some(_)) => Err(QueryError::invalid_config(format!(
            "{}.value is only allowed with the 'default' strategy",
            owner
        ))),
        (Strategy::Error, None) => Ok(Fallback::Error),
        (Strategy::Skip, None) => Ok(Fallback::Skip),
        (Strategy::Infer, None) => Err(QueryError::invalid_config(format!(
            "{} cannot nest the 'infer' strategy",
            owner
        ))),
    }
}

fn compile_infer(rules: &InferRules) -> Result<Fallback, QueryError> {
    let alternate_keys: Vec<String> = rules
        .alternate_keys
        .iter()
        .filter(|k| !k.is_empty())
        .cloned()
        .collect();
    let alternate_queries = rules
        .alternate_queries
        .iter()
        .map(|q| compile_path(q, "alternate query"))
        .collect::<Result<Vec<_>, _>>()?;

    if alternate_keys.is_empty() && alternate_queries.is_empty() {
        return Err(QueryError::invalid_config(
            "fallback.inferRules needs at least one alternate key or query",
        ));
    }

    let exhausted = match &rules.exhausted {
        Some(terminal) => compile_terminal(
            terminal.strategy,
            &terminal.value,
            "fallback.inferRules.exhausted",
        )?,
        None => Fallback::Error,
    };

    Ok(Fallback::Infer(InferPolicy {
        alternate_keys,
        alternate_queries,
        exhausted: Box::new(exhausted),
    }))
}

/// An alias with its target already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledAlias {
    pub name: String,
    pub target: Query,
}

/// What to do when a path step does not resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    Default(Value),
    Error,
    Skip,
    Infer(InferPolicy),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferPolicy {
    pub alternate_keys: Vec<String>,
    pub alternate_queries: Vec<Query>,
    /// Never `Infer`
    pub exhausted: Box<Fallback>,
}

/// Validated, read-only configuration threaded through an evaluation.
///
/// Cheap to share between threads; nothing in it is mutated after
/// [`ConfigSnapshot::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    aliases: Vec<CompiledAlias>,
    pub fallback: Fallback,
    pub fuzzy: FuzzyConfig,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            aliases: Vec::new(),
            fallback: Fallback::Error,
            fuzzy: FuzzyConfig::default(),
        }
    }
}

impl Policy {
    pub fn alias(&self, name: &str) -> Option<&Query> {
        self.aliases
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.target)
    }

    pub fn aliases(&self) -> &[CompiledAlias] {
        &self.aliases
    }

    pub fn has_aliases(&self) -> bool {
        !self.aliases.is_empty()
    }
}
