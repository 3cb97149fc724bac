use crate::error::{MiniqlError, MiniqlResult};

/// Token kinds produced by the lexer.
///
/// `Function` and `UnaryOp` are never produced by the scanner itself: the
/// expression parser reclassifies an identifier followed by `(` into a
/// function marker, and an operator in operand position into a unary
/// operator, the same way the clause grammar expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Integer,
    Float,
    Str,
    Op,
    UnaryOp,
    Star,
    Dot,
    Comma,
    LeftParen,
    RightParen,
    Function,
    Eof,
}

/// A lexical token: a kind plus the raw spelling it was scanned from.
///
/// Keywords keep their source spelling (`"FROM"`, `"from"`) so error
/// messages can echo what the user typed; keyword comparison is
/// case-insensitive via [`Token::is_keyword`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    /// Case-insensitive keyword test.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value.eq_ignore_ascii_case(keyword)
    }
}

const KEYWORDS: &[&str] = &[
    "select", "from", "where", "order", "by", "asc", "desc", "and", "or", "not", "like", "true",
    "false", "null",
];

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        // Skip -- comments
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        // Skip /* */ comments
        self.advance(); // skip /
        self.advance(); // skip *
        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn read_number(&mut self) -> MiniqlResult<Token> {
        let mut num_str = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot {
                // Decimal point only when followed by a digit, otherwise the
                // dot belongs to a qualified name or ends the number.
                if let Some(next) = self.peek() {
                    if next.is_ascii_digit() {
                        has_dot = true;
                        num_str.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        if has_dot {
            num_str
                .parse::<f64>()
                .map(|_| Token::new(TokenKind::Float, num_str.clone()))
                .map_err(|_| MiniqlError::Parse(format!("invalid float number: {}", num_str)))
        } else {
            num_str
                .parse::<i64>()
                .map(|_| Token::new(TokenKind::Integer, num_str.clone()))
                .map_err(|_| MiniqlError::Parse(format!("invalid integer number: {}", num_str)))
        }
    }

    fn read_string(&mut self) -> MiniqlResult<Token> {
        let quote = self.current_char.unwrap_or('\'');
        self.advance(); // Skip opening quote

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                // Doubled quote is an escaped quote
                if self.peek() == Some(quote) {
                    string.push(quote);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // Skip closing quote
                    return Ok(Token::new(TokenKind::Str, string));
                }
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    string.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        _ => escaped,
                    });
                    self.advance();
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(MiniqlError::Parse("unterminated string".to_string()))
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let lower = ident.to_lowercase();
        if KEYWORDS.contains(&lower.as_str()) {
            Token::new(TokenKind::Keyword, ident)
        } else {
            Token::new(TokenKind::Identifier, ident)
        }
    }

    fn read_quoted_identifier(&mut self) -> MiniqlResult<Token> {
        self.advance(); // Skip opening backtick

        let mut ident = String::new();

        while let Some(ch) = self.current_char {
            if ch == '`' {
                self.advance();
                return Ok(Token::new(TokenKind::Identifier, ident));
            }
            ident.push(ch);
            self.advance();
        }

        Err(MiniqlError::Parse(
            "unterminated quoted identifier".to_string(),
        ))
    }

    pub fn next_token(&mut self) -> MiniqlResult<Token> {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Ok(Token::eof()),

                // Comments
                Some('-') if self.peek() == Some('-') => {
                    self.skip_line_comment();
                    continue;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.skip_block_comment();
                    continue;
                }

                _ => break,
            }
        }

        let token = match self.current_char {
            None => Token::eof(),

            Some(ch) if ch.is_ascii_digit() => {
                return self.read_number();
            }

            Some('\'') | Some('"') => {
                return self.read_string();
            }

            Some('`') => {
                return self.read_quoted_identifier();
            }

            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                return Ok(self.read_identifier());
            }

            Some('=') => {
                self.advance();
                Token::new(TokenKind::Op, "=")
            }

            Some('!') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Op, "!=")
                } else {
                    return Err(MiniqlError::Parse("unexpected character: !".to_string()));
                }
            }

            Some('<') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Op, "<=")
                } else if self.current_char == Some('>') {
                    self.advance();
                    Token::new(TokenKind::Op, "<>")
                } else {
                    Token::new(TokenKind::Op, "<")
                }
            }

            Some('>') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Op, ">=")
                } else {
                    Token::new(TokenKind::Op, ">")
                }
            }

            Some('+') => {
                self.advance();
                Token::new(TokenKind::Op, "+")
            }
            Some('-') => {
                self.advance();
                Token::new(TokenKind::Op, "-")
            }
            Some('*') => {
                self.advance();
                if self.current_char == Some('*') {
                    self.advance();
                    Token::new(TokenKind::Op, "**")
                } else {
                    Token::new(TokenKind::Star, "*")
                }
            }
            Some('/') => {
                self.advance();
                Token::new(TokenKind::Op, "/")
            }
            Some('%') => {
                self.advance();
                Token::new(TokenKind::Op, "%")
            }
            Some(',') => {
                self.advance();
                Token::new(TokenKind::Comma, ",")
            }
            Some('.') => {
                self.advance();
                Token::new(TokenKind::Dot, ".")
            }
            Some('(') => {
                self.advance();
                Token::new(TokenKind::LeftParen, "(")
            }
            Some(')') => {
                self.advance();
                Token::new(TokenKind::RightParen, ")")
            }

            Some(ch) => {
                return Err(MiniqlError::Parse(format!("unexpected character: {}", ch)));
            }
        };

        Ok(token)
    }

    /// Scan the whole input. The returned vector always ends with exactly one
    /// end-of-input token.
    pub fn tokenize(&mut self) -> MiniqlResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }
}

/// A consumable view over the scanned tokens with single-token pushback.
///
/// `next` keeps returning the end-of-input token once the stream is
/// exhausted. `pushback` re-delivers the most recently consumed token on the
/// following `next`; it is a single-slot buffer, valid only immediately
/// after a `next`.
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
    can_push_back: bool,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            can_push_back: false,
        }
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Token {
        self.can_push_back = true;
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                token.clone()
            }
            None => Token::eof(),
        }
    }

    /// Return the most recently consumed token to the stream.
    ///
    /// # Panics
    ///
    /// Panics when called twice without a consuming `next` in between, or
    /// before any token was consumed. A second pushback would silently drop
    /// a token, so the precondition is enforced rather than documented away.
    pub fn pushback(&mut self) {
        if !self.can_push_back {
            panic!("pushback without a preceding read");
        }
        self.can_push_back = false;
        if self.position > 0 && self.position <= self.tokens.len() {
            self.position -= 1;
        }
    }
}
