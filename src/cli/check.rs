//! Execute jsift queries against JSON input

use tracing::debug;

use super::CliError;
use crate::{ConfigSnapshot, Output, QueryError, evaluate, parse_str};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to execute
    pub query: String,
    /// JSON input string
    pub input: Option<String>,
    /// Configuration snapshot as JSON text
    pub config: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed successfully
    Success(Output),
}

/// Execute a jsift check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let config = match &options.config {
        Some(text) => ConfigSnapshot::from_json_str(text)?,
        None => ConfigSnapshot::default(),
    };

    if options.syntax_only {
        config.validate()?;
        let query = parse_str(&options.query).map_err(QueryError::from)?;
        debug!(query = %query, "syntax check passed");
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let data: serde_json::Value = serde_json::from_str(json_str)?;

    let output = evaluate(&options.query, &data, &config)?;
    Ok(CheckResult::Success(output))
}
