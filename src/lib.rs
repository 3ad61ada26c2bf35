//! jsonsift - a path query language for JSON documents.
//!
//! A query is a pipeline of steps (property, index, slice, wildcard, key
//! group, omission, function call) optionally closed by a comparison or
//! boolean condition. Lookups that miss are handed to a configurable
//! fallback policy; property names can be aliased and fuzzily matched.
//!
//! # Examples
//!
//! ```
//! use jsonsift::{ConfigSnapshot, Output, evaluate};
//! use serde_json::json;
//!
//! let data = json!({"users": [{"name": "Ann", "age": 31}, {"name": "Bo", "age": 17}]});
//! let config = ConfigSnapshot::default();
//!
//! let names = evaluate("$.users.filter(.age >= 18).map(.name)", &data, &config).unwrap();
//! assert_eq!(names, Output::Values(vec![json!("Ann")]));
//! ```

pub mod ast;
pub mod compare;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod fallback;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

use serde_json::Value;
use tracing::debug;

pub use ast::{Node, Query, Token, TokenKind};
pub use config::{ConfigSnapshot, Policy};
pub use error::{QueryError, SyntaxError};
pub use evaluator::{Evaluator, ValueSet};
pub use functions::{Builtin, FunctionRegistry};
pub use lexer::{Lexer, tokenize};
pub use output::{Output, to_json, to_json_pretty};
pub use parser::{Parser, parse, parse_str};

/// Evaluates `query` against `data` under `config`.
///
/// The configuration is validated before the query is parsed, so an
/// invalid snapshot fails with `InvalidConfig` whatever the query.
pub fn evaluate(query: &str, data: &Value, config: &ConfigSnapshot) -> Result<Output, QueryError> {
    let policy = config.validate()?;
    let query = parse_str(query)?;
    debug!(query = %query, "parsed query");

    let functions = FunctionRegistry::with_builtins();
    Evaluator::new(&policy, &functions).eval_query(&query, data)
}
