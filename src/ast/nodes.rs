use std::fmt;

use serde_json::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::LessThan => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean connectives. `And` binds tighter than `Or`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Python-style slice bounds; `step` is never `Some(0)` once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

/// A node together with the byte offset it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub node: Node,
    pub position: usize,
}

impl Step {
    pub fn new(node: Node, position: usize) -> Self {
        Step { node, position }
    }
}

/// Abstract Syntax Tree node.
///
/// Path-step variants narrow a value set; `Comparison`, `Condition` and
/// `Not` produce a boolean; `Literal` and `Path` only appear as operands
/// and function arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Anchors traversal at the evaluation base (`$`)
    Root,

    /// Anchors an operand path at the value set flowing into it (`@`)
    Current,

    /// Object member access
    ///
    /// # Examples
    /// ```text
    /// .name
    /// ["first name"]
    /// ```
    Property(String),

    /// Array element, negative counts from the end
    ///
    /// # Examples
    /// ```text
    /// [0]
    /// [-1]
    /// ```
    Index(i64),

    /// Array slice
    ///
    /// # Examples
    /// ```text
    /// [1:3]
    /// [::-1]
    /// ```
    Slice(Slice),

    /// Every member of an object or element of an array (`.*`, `[*]`)
    Wildcard,

    /// Several members in the requested order
    ///
    /// # Examples
    /// ```text
    /// ["a","b"]
    /// {a, b}
    /// ```
    MultiKey(Vec<String>),

    /// Object without the named members (`!{password}`)
    Omission(Vec<String>),

    /// Registered function applied to the whole value set
    ///
    /// # Examples
    /// ```text
    /// .length()
    /// .filter(.age > 18)
    /// ```
    FunctionCall { name: String, args: Vec<Node> },

    /// Binary comparison between two operands
    Comparison {
        op: CompareOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `&&` / `||` over comparisons and nested conditions
    Condition {
        op: LogicOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Unary negation of a comparison or condition
    Not(Box<Node>),

    /// Number, string, boolean or null constant
    Literal(Value),

    /// Nested path operand; the first step is `Root` or `Current`
    Path(Vec<Step>),
}

impl Node {
    /// True for the variants that narrow a value set.
    pub fn is_path_step(&self) -> bool {
        matches!(
            self,
            Node::Property(_)
                | Node::Index(_)
                | Node::Slice(_)
                | Node::Wildcard
                | Node::MultiKey(_)
                | Node::Omission(_)
                | Node::FunctionCall { .. }
        )
    }

    /// True for the variants that produce a boolean.
    pub fn is_condition(&self) -> bool {
        matches!(
            self,
            Node::Comparison { .. } | Node::Condition { .. } | Node::Not(_)
        )
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    let plain = key
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if plain {
        f.write_str(key)
    } else {
        write!(f, "{}", Value::String(key.to_string()))
    }
}

fn write_keys(f: &mut fmt::Formatter<'_>, keys: &[String]) -> fmt::Result {
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write_key(f, key)?;
    }
    Ok(())
}

/// Renders a node back into query syntax; used in error messages.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Root => f.write_str("$"),
            Node::Current => f.write_str("@"),
            Node::Property(name) => {
                f.write_str(".")?;
                write_key(f, name)
            }
            Node::Index(i) => write!(f, "[{}]", i),
            Node::Slice(Slice { start, end, step }) => {
                f.write_str("[")?;
                if let Some(s) = start {
                    write!(f, "{}", s)?;
                }
                f.write_str(":")?;
                if let Some(e) = end {
                    write!(f, "{}", e)?;
                }
                if let Some(s) = step {
                    write!(f, ":{}", s)?;
                }
                f.write_str("]")
            }
            Node::Wildcard => f.write_str(".*"),
            Node::MultiKey(keys) => {
                f.write_str("{")?;
                write_keys(f, keys)?;
                f.write_str("}")
            }
            Node::Omission(keys) => {
                f.write_str("!{")?;
                write_keys(f, keys)?;
                f.write_str("}")
            }
            Node::FunctionCall { name, args } => {
                write!(f, ".{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Node::Comparison { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Node::Condition { op, left, right } => {
                let op = match op {
                    LogicOp::And => "&&",
                    LogicOp::Or => "||",
                };
                write!(f, "({} {} {})", left, op, right)
            }
            Node::Not(inner) => write!(f, "!({})", inner),
            Node::Literal(value) => write!(f, "{}", value),
            Node::Path(steps) => {
                for step in steps {
                    write!(f, "{}", step.node)?;
                }
                Ok(())
            }
        }
    }
}
