//! CLI support for jsonsift
//!
//! Provides programmatic access to the jsift commands so other tools can
//! embed them without spawning a process.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

use crate::QueryError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Syntax, configuration or evaluation failure
    #[error("{}", render_query_error(.0))]
    Query(#[from] QueryError),
    /// Input document is not JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading stdin or a file failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
    /// Unknown documentation category
    #[error("Unknown category: '{0}'\nRun 'jsift docs' to see available categories.")]
    UnknownCategory(String),
}

impl CliError {
    /// Process exit code: 2 for a bad query or config, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Query(QueryError::Syntax(_) | QueryError::InvalidConfig { .. }) => 2,
            _ => 1,
        }
    }
}

fn render_query_error(err: &QueryError) -> String {
    match err.solution() {
        Some(hint) => format!("{} [{}]\n  hint: {}", err, err.code(), hint),
        None => format!("{} [{}]", err, err.code()),
    }
}
