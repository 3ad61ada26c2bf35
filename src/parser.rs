use serde_json::{Number, Value};

use crate::{
    ast::{LogicOp, Node, Query, Slice, Step, Token, TokenKind},
    error::SyntaxError,
    lexer::Lexer,
};

/// Recursive-descent parser over a token sequence.
///
/// Precedence, low to high: `||`, `&&`, `!`, comparison, path steps.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, SyntaxError> {
        Ok(Self::from_tokens(lexer.tokenize()?))
    }

    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eoq)) {
            let end = tokens
                .last()
                .map(|t| t.position + t.text.len())
                .unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eoq, "", end));
        }
        Parser { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        let got = match token.kind {
            TokenKind::Property => format!("property '{}'", token.text),
            TokenKind::Number => format!("number {}", token.text),
            TokenKind::String => format!("string \"{}\"", token.text),
            kind => kind.to_string(),
        };
        SyntaxError::new(format!("Expected {}, got {}", expected, got), token.position)
    }

    /// True when `!` introduces an omission group rather than a negation.
    fn at_omission(&self) -> bool {
        self.check(TokenKind::Bang) && self.peek(1).is(TokenKind::LBrace)
    }

    fn at_path_step(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Dot | TokenKind::LBracket | TokenKind::LBrace
        ) || self.at_omission()
    }

    fn is_literal_keyword(token: &Token) -> bool {
        token.is(TokenKind::Property) && matches!(token.text.as_str(), "true" | "false" | "null")
    }

    /// Parse a complete query
    pub fn parse_query(&mut self) -> Result<Query, SyntaxError> {
        let root_position = self.current().position;
        if self.check(TokenKind::Root) {
            self.advance();
        }
        let mut steps = vec![Step::new(Node::Root, root_position)];

        // `name.rest` and `fn()` at the very start imply `$.`
        if self.check(TokenKind::Property) && !Self::is_literal_keyword(self.current()) {
            let step = self.parse_named_step()?;
            steps.push(step);
        }
        self.parse_path_steps(&mut steps)?;

        let condition_position = self.current().position;
        let condition = match self.current().kind {
            TokenKind::Comparator(_) => Some(self.parse_condition(Some(Node::Current))?),
            TokenKind::And | TokenKind::Or => {
                return Err(self.unexpected("comparison operator"));
            }
            TokenKind::LParen
            | TokenKind::Bang
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::At
            | TokenKind::Property
                if steps.len() == 1 =>
            {
                Some(self.parse_condition(None)?)
            }
            _ => None,
        };

        if let Some(condition) = condition {
            steps.push(Step::new(condition, condition_position));
            if self.at_path_step() {
                return Err(SyntaxError::new(
                    "Path step cannot follow a condition",
                    self.current().position,
                ));
            }
        }

        self.expect(TokenKind::Eoq)
            .map_err(|_| self.unexpected("path step, comparison or end of query"))?;
        Ok(Query::from_steps(steps))
    }

    fn parse_path_steps(&mut self, steps: &mut Vec<Step>) -> Result<(), SyntaxError> {
        loop {
            let position = self.current().position;
            let node = match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    match self.current().kind {
                        TokenKind::Property => {
                            steps.push(self.parse_named_step()?);
                            continue;
                        }
                        TokenKind::String => Node::Property(self.advance().text),
                        TokenKind::Star => {
                            self.advance();
                            Node::Wildcard
                        }
                        TokenKind::LBrace => Node::MultiKey(self.parse_key_group()?),
                        TokenKind::Bang if self.at_omission() => {
                            self.advance();
                            Node::Omission(self.parse_key_group()?)
                        }
                        _ => return Err(self.unexpected("property name, '*' or key group after '.'")),
                    }
                }
                TokenKind::LBracket => self.parse_bracket()?,
                TokenKind::LBrace => Node::MultiKey(self.parse_key_group()?),
                TokenKind::Bang if self.at_omission() => {
                    self.advance();
                    Node::Omission(self.parse_key_group()?)
                }
                _ => break,
            };
            steps.push(Step::new(node, position));
        }
        Ok(())
    }

    /// `name` or `name(args)`; the current token is a property.
    fn parse_named_step(&mut self) -> Result<Step, SyntaxError> {
        let token = self.advance();
        let node = if self.check(TokenKind::LParen) {
            Node::FunctionCall {
                name: token.text,
                args: self.parse_arguments()?,
            }
        } else {
            Node::Property(token.text)
        };
        Ok(Step::new(node, token.position))
    }

    fn parse_bracket(&mut self) -> Result<Node, SyntaxError> {
        let open = self.expect(TokenKind::LBracket)?;

        match self.current().kind {
            TokenKind::Star => {
                self.advance();
                self.expect(TokenKind::RBracket)?;
                Ok(Node::Wildcard)
            }
            TokenKind::String => {
                let mut keys = vec![self.advance().text];
                while self.check(TokenKind::Comma) {
                    self.advance();
                    keys.push(self.expect(TokenKind::String)?.text);
                }
                self.expect(TokenKind::RBracket)?;
                if keys.len() == 1 {
                    Ok(Node::Property(keys.remove(0)))
                } else {
                    Ok(Node::MultiKey(keys))
                }
            }
            TokenKind::Number | TokenKind::Colon => self.parse_index_or_slice(),
            TokenKind::RBracket => Err(SyntaxError::new("Empty brackets", open.position)),
            _ => Err(self.unexpected("index, slice, '*' or quoted key")),
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<Node, SyntaxError> {
        let start = self.parse_optional_integer()?;

        if !self.check(TokenKind::Colon) {
            self.expect(TokenKind::RBracket)?;
            return match start {
                Some(index) => Ok(Node::Index(index)),
                None => Err(self.unexpected("index")),
            };
        }
        self.advance();

        let end = self.parse_optional_integer()?;
        let mut step = None;
        if self.check(TokenKind::Colon) {
            self.advance();
            let step_position = self.current().position;
            step = self.parse_optional_integer()?;
            if step == Some(0) {
                return Err(SyntaxError::new("Slice step cannot be zero", step_position));
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Node::Slice(Slice { start, end, step }))
    }

    fn parse_optional_integer(&mut self) -> Result<Option<i64>, SyntaxError> {
        if !self.check(TokenKind::Number) {
            return Ok(None);
        }
        let token = self.advance();
        token
            .text
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SyntaxError::new(format!("Expected integer, got {}", token.text), token.position))
    }

    /// `{a, "b c"}`; the current token is the opening brace.
    fn parse_key_group(&mut self) -> Result<Vec<String>, SyntaxError> {
        let open = self.expect(TokenKind::LBrace)?;
        if self.check(TokenKind::RBrace) {
            return Err(SyntaxError::new("Empty key list", open.position));
        }

        let mut keys = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::Property | TokenKind::String => keys.push(self.advance().text),
                _ => return Err(self.unexpected("key name")),
            }
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(keys)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let mut args = vec![];

        if self.check(TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_argument()?);
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        Ok(args)
    }

    /// An operand, or a condition when a comparison follows.
    fn parse_argument(&mut self) -> Result<Node, SyntaxError> {
        if self.check(TokenKind::LParen) || (self.check(TokenKind::Bang) && !self.at_omission()) {
            return self.parse_condition(None);
        }

        let operand = self.parse_operand()?;
        match self.current().kind {
            TokenKind::Comparator(_) => self.parse_condition(Some(operand)),
            TokenKind::And | TokenKind::Or => Err(self.unexpected("comparison operator")),
            _ => Ok(operand),
        }
    }

    /// Parses `||`-joined conditions. `subject`, when given, is the left
    /// operand of the first comparison.
    fn parse_condition(&mut self, subject: Option<Node>) -> Result<Node, SyntaxError> {
        let mut subject = subject;
        self.parse_or(&mut subject)
    }

    fn parse_or(&mut self, subject: &mut Option<Node>) -> Result<Node, SyntaxError> {
        let mut left = self.parse_and(subject)?;

        while self.check(TokenKind::Or) {
            self.advance();
            let right = self.parse_and(&mut None)?;
            left = Node::Condition {
                op: LogicOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self, subject: &mut Option<Node>) -> Result<Node, SyntaxError> {
        let mut left = self.parse_unary(subject)?;

        while self.check(TokenKind::And) {
            self.advance();
            let right = self.parse_unary(&mut None)?;
            left = Node::Condition {
                op: LogicOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self, subject: &mut Option<Node>) -> Result<Node, SyntaxError> {
        if let Some(left) = subject.take() {
            return self.parse_comparison(left);
        }

        if self.check(TokenKind::Bang) && !self.at_omission() {
            self.advance();
            let inner = self.parse_unary(&mut None)?;
            return Ok(Node::Not(Box::new(inner)));
        }

        if self.check(TokenKind::LParen) {
            self.advance();
            let inner = self.parse_or(&mut None)?;
            self.expect(TokenKind::RParen)?;
            return Ok(inner);
        }

        let left = self.parse_operand()?;
        self.parse_comparison(left)
    }

    fn parse_comparison(&mut self, left: Node) -> Result<Node, SyntaxError> {
        let op = match self.current().kind {
            TokenKind::Comparator(op) => op,
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        let right = self.parse_operand()?;

        Ok(Node::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Node, SyntaxError> {
        let position = self.current().position;
        match self.current().kind {
            TokenKind::Number => {
                let token = self.advance();
                Ok(Node::Literal(Self::number_literal(&token)?))
            }
            TokenKind::String => Ok(Node::Literal(Value::String(self.advance().text))),
            TokenKind::Property if Self::is_literal_keyword(self.current()) => {
                let literal = match self.advance().text.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::Null,
                };
                Ok(Node::Literal(literal))
            }
            TokenKind::Property => {
                let mut steps = vec![Step::new(Node::Current, position)];
                steps.push(self.parse_named_step()?);
                self.parse_path_steps(&mut steps)?;
                Ok(Node::Path(steps))
            }
            TokenKind::Root => {
                self.advance();
                let mut steps = vec![Step::new(Node::Root, position)];
                self.parse_path_steps(&mut steps)?;
                Ok(Node::Path(steps))
            }
            TokenKind::At => {
                self.advance();
                self.relative_path(position)
            }
            _ if self.at_path_step() => self.relative_path(position),
            _ => Err(self.unexpected("value")),
        }
    }

    fn relative_path(&mut self, position: usize) -> Result<Node, SyntaxError> {
        let mut steps = vec![Step::new(Node::Current, position)];
        self.parse_path_steps(&mut steps)?;
        if steps.len() == 1 {
            Ok(Node::Current)
        } else {
            Ok(Node::Path(steps))
        }
    }

    fn number_literal(token: &Token) -> Result<Value, SyntaxError> {
        if let Ok(n) = token.text.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        token
            .text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| SyntaxError::new(format!("Invalid number '{}'", token.text), token.position))
    }
}

/// Parses a token sequence produced by [`crate::lexer::tokenize`].
pub fn parse(tokens: Vec<Token>) -> Result<Query, SyntaxError> {
    Parser::from_tokens(tokens).parse_query()
}

/// Tokenizes and parses a query string.
pub fn parse_str(query: &str) -> Result<Query, SyntaxError> {
    Parser::new(Lexer::new(query))?.parse_query()
}

#[test]
fn test_and_binds_tighter_than_or() {
    let query = parse_str("$.a == 1 || $.b == 2 && $.c == 3").unwrap();
    match query.condition() {
        Some(Node::Condition { op: LogicOp::Or, right, .. }) => {
            assert!(matches!(**right, Node::Condition { op: LogicOp::And, .. }));
        }
        other => panic!("Expected OR at the top, got {:?}", other),
    }
}
