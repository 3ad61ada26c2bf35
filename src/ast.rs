//! # Abstract Syntax Tree
//!
//! The tagged tree the parser builds from a token stream and the evaluator
//! walks against a JSON value.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - Node variants: path steps, operators, literals
//! - **[query]** - The complete pipeline rooted at `$`
//!
//! ## Quick Start
//!
//! ```text
//! $.users[0:2].name
//! ```
//!
//! parses to `Root`, `Property("users")`, `Slice(0, 2)`, `Property("name")`.
//!
//! ## Pipeline Structure
//!
//! Every query is `Root` followed by path steps and, optionally, one
//! trailing comparison or condition:
//!
//! ```text
//! $ step step ... (comparison | condition)?
//! ```
//!
//! ### Path Steps
//!
//! - `.name`, `["name"]` - property
//! - `[n]` - index, negative counts from the end
//! - `[a:b:c]` - slice
//! - `.*`, `[*]` - wildcard
//! - `["a","b"]`, `{a,b}` - multi-key
//! - `!{a,b}` - omission
//! - `.fn(args)` - function call
//!
//! ### Conditions
//!
//! ```text
//! $.age >= 18 && $.country == "NL" || $.admin == true
//! ```
//!
//! `&&` binds tighter than `||`; `!( ... )` negates.
pub mod nodes;
pub mod query;
pub mod tokens;

pub use nodes::{CompareOp, LogicOp, Node, Slice, Step};
pub use query::Query;
pub use tokens::{Token, TokenKind};
