use crate::{
    ast::{CompareOp, Token, TokenKind},
    error::SyntaxError,
};

/// Single forward scan over a query string.
///
/// Positions are byte offsets into the source. A `Lexer` is consumed by one
/// tokenization; nothing is shared between calls.
pub struct Lexer {
    input: Vec<(usize, char)>,
    len: usize,
    position: usize,
    last_kind: Option<TokenKind>,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.char_indices().collect(),
            len: input.len(),
            position: 0,
            last_kind: None,
            finished: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).map(|(_, c)| *c)
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|(_, c)| *c)
    }

    /// Byte offset of the current character, or the input length at the end.
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.len)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '-'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_identifier_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start = self.offset();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.offset();
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some('/') => result.push('/'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some('u') => {
                            result.push(self.read_unicode_escape(escape_at)?);
                            continue;
                        }
                        Some(other) => {
                            return Err(SyntaxError::new(
                                format!("Invalid escape sequence '\\{}'", other),
                                escape_at,
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(SyntaxError::new("Unterminated string", start))
    }

    /// Reads the four hex digits after `\u`; leaves the cursor past them.
    fn read_unicode_escape(&mut self, escape_at: usize) -> Result<char, SyntaxError> {
        self.advance(); // 'u'
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| SyntaxError::new("Invalid unicode escape", escape_at))?;
            code = code * 16 + digit;
            self.advance();
        }
        char::from_u32(code).ok_or_else(|| SyntaxError::new("Invalid unicode escape", escape_at))
    }

    fn read_number(&mut self) -> Result<String, SyntaxError> {
        let start = self.offset();
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }
        self.read_digits(&mut number);

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let signed = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(ch) = self.current_char() {
                        number.push(ch);
                    }
                    self.advance();
                }
                self.read_digits(&mut number);
            }
        }

        if self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(SyntaxError::new(
                format!("Invalid number '{}{}'", number, self.read_identifier()),
                start,
            ));
        }
        Ok(number)
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn single(&mut self, kind: TokenKind, text: &str, position: usize) -> Token {
        self.advance();
        Token::new(kind, text, position)
    }

    fn double(&mut self, kind: TokenKind, text: &str, position: usize) -> Token {
        self.advance();
        self.advance();
        Token::new(kind, text, position)
    }

    /// Produces the next token; after `Eoq` every call yields `Eoq` again.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let token = self.scan()?;
        self.last_kind = Some(token.kind);
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();
        let position = self.offset();

        let token = match self.current_char() {
            None => {
                self.finished = true;
                Token::new(TokenKind::Eoq, "", position)
            }
            Some('$') => self.single(TokenKind::Root, "$", position),
            Some('@') => self.single(TokenKind::At, "@", position),
            Some('.') => self.single(TokenKind::Dot, ".", position),
            Some('[') => self.single(TokenKind::LBracket, "[", position),
            Some(']') => self.single(TokenKind::RBracket, "]", position),
            Some('{') => self.single(TokenKind::LBrace, "{", position),
            Some('}') => self.single(TokenKind::RBrace, "}", position),
            Some('(') => self.single(TokenKind::LParen, "(", position),
            Some(')') => self.single(TokenKind::RParen, ")", position),
            Some('*') => self.single(TokenKind::Star, "*", position),
            Some(',') => self.single(TokenKind::Comma, ",", position),
            Some(':') => self.single(TokenKind::Colon, ":", position),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.double(TokenKind::Comparator(CompareOp::Equal), "==", position)
                } else {
                    return Err(SyntaxError::new(
                        "Unexpected '=' (did you mean '=='?)",
                        position,
                    ));
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.double(TokenKind::Comparator(CompareOp::NotEqual), "!=", position)
                } else {
                    self.single(TokenKind::Bang, "!", position)
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.double(TokenKind::Comparator(CompareOp::LessEqual), "<=", position)
                } else {
                    self.single(TokenKind::Comparator(CompareOp::LessThan), "<", position)
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.double(TokenKind::Comparator(CompareOp::GreaterEqual), ">=", position)
                } else {
                    self.single(TokenKind::Comparator(CompareOp::GreaterThan), ">", position)
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.double(TokenKind::And, "&&", position)
                } else {
                    return Err(SyntaxError::new(
                        "Unexpected '&' (did you mean '&&'?)",
                        position,
                    ));
                }
            }
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.double(TokenKind::Or, "||", position)
                } else {
                    return Err(SyntaxError::new(
                        "Unexpected '|' (did you mean '||'?)",
                        position,
                    ));
                }
            }
            Some(quote @ ('"' | '\'')) => {
                let text = self.read_string(quote)?;
                Token::new(TokenKind::String, text, position)
            }
            // `.0` and `.-x` name keys, everywhere else a leading digit is a number
            Some(ch)
                if self.last_kind == Some(TokenKind::Dot)
                    && (ch.is_ascii_digit() || ch == '-') =>
            {
                Token::new(TokenKind::Property, self.read_identifier(), position)
            }
            Some(ch)
                if ch.is_ascii_digit()
                    || (ch == '-' && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())) =>
            {
                Token::new(TokenKind::Number, self.read_number()?, position)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "and" => Token::new(TokenKind::And, ident, position),
                    "or" => Token::new(TokenKind::Or, ident, position),
                    _ => Token::new(TokenKind::Property, ident, position),
                }
            }
            Some(ch) => {
                return Err(SyntaxError::new(
                    format!("Unexpected character '{}'", ch),
                    position,
                ));
            }
        };
        Ok(token)
    }

    /// Drains the whole input. The result ends with exactly one `Eoq`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        while !self.finished {
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }
}

/// Tokenizes a query string.
pub fn tokenize(query: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(query).tokenize()
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or true");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::And);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Or);
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::new(TokenKind::Property, "true", 7)
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eoq);
}

#[test]
fn test_positions_are_byte_offsets() {
    let tokens = tokenize("$.\"né\" == 1").unwrap();
    let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 8, 11, 12]);
}
