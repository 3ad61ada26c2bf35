use std::fmt;

use crate::ast::CompareOp;

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Root anchor
    ///
    /// # Examples
    /// ```text
    /// $
    /// $.user
    /// ```
    Root,

    /// Current value set inside an operand
    ///
    /// # Examples
    /// ```text
    /// filter(@ > 2)
    /// ```
    At,

    /// Property separator, or the prefix of a function call
    Dot,

    /// Left bracket for indexes, slices and quoted key lists
    LBracket,

    /// Right bracket
    RBracket,

    /// Left brace opening a multi-key or omission group
    ///
    /// # Examples
    /// ```text
    /// {name, age}
    /// !{password}
    /// ```
    LBrace,

    /// Right brace
    RBrace,

    /// Left parenthesis for function arguments and grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Bare identifier: letters, digits, `_` and `-`
    ///
    /// Must start with a letter or underscore, except directly after a dot
    /// where `.0` names the key `"0"`.
    Property,

    /// Signed integer or decimal number
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1
    /// 2.5
    /// ```
    Number,

    /// Quoted text, single or double quotes; `text` holds the unescaped value
    String,

    /// Wildcard
    Star,

    /// Separator in key lists and argument lists
    Comma,

    /// Slice separator
    Colon,

    /// Omission marker or logical negation
    Bang,

    /// One of `==`, `!=`, `<`, `<=`, `>`, `>=`
    Comparator(CompareOp),

    /// `&&` or the keyword `and`
    And,

    /// `||` or the keyword `or`
    Or,

    /// End of query; always the last token, exactly once
    Eoq,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Root => "'$'",
            TokenKind::At => "'@'",
            TokenKind::Dot => "'.'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Property => "property name",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Star => "'*'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Bang => "'!'",
            TokenKind::Comparator(op) => return write!(f, "'{}'", op),
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Eoq => "end of query",
        };
        f.write_str(name)
    }
}

/// A token with its source text and byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
