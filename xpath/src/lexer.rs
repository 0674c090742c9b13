//! Lexer (tokenizer) for constraint expression text.

use crate::{ParseError, ParseResult};

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Name (NCName): element names, prefixes, and the word-operators
    /// `and`/`or`/`div`/`mod`, which the parser recognizes by position.
    Ident(String),
    /// Numeric literal.
    Number(f64),
    /// String literal (single or double quoted).
    String(String),

    Slash,    // /
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :
    Dot,      // .
    DotDot,   // ..
    Eq,       // =
    NotEq,    // !=
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=
    Plus,     // +
    Minus,    // -
    Star,     // *
}

impl TokenKind {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("'{}'", name),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::String(s) => format!("string '{}'", s),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::DotDot => "'..'".to_string(),
            TokenKind::Eq => "'='".to_string(),
            TokenKind::NotEq => "'!='".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::LtEq => "'<='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::GtEq => "'>='".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
        }
    }
}

/// A token with its source offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Tokenizer over expression source text.
pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            source,
        }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let offset = self.pos;
            let ch = match self.peek() {
                Some(c) => c,
                None => break,
            };
            let kind = match ch {
                '/' => {
                    self.advance();
                    TokenKind::Slash
                }
                '(' => {
                    self.advance();
                    TokenKind::LParen
                }
                ')' => {
                    self.advance();
                    TokenKind::RParen
                }
                '[' => {
                    self.advance();
                    TokenKind::LBracket
                }
                ']' => {
                    self.advance();
                    TokenKind::RBracket
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                ':' => {
                    self.advance();
                    TokenKind::Colon
                }
                '+' => {
                    self.advance();
                    TokenKind::Plus
                }
                '-' => {
                    self.advance();
                    TokenKind::Minus
                }
                '*' => {
                    self.advance();
                    TokenKind::Star
                }
                '=' => {
                    self.advance();
                    TokenKind::Eq
                }
                '!' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::NotEq
                    } else {
                        return Err(ParseError::UnexpectedChar { ch: '!', offset });
                    }
                }
                '<' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    }
                }
                '\'' | '"' => self.lex_string(ch, offset)?,
                '.' => {
                    // `.` / `..` / `.5`
                    if self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
                        self.lex_number(offset)?
                    } else if self.peek_at(1) == Some('.') {
                        self.advance();
                        self.advance();
                        TokenKind::DotDot
                    } else {
                        self.advance();
                        TokenKind::Dot
                    }
                }
                c if c.is_ascii_digit() => self.lex_number(offset)?,
                c if is_name_start(c) => self.lex_ident(),
                c => return Err(ParseError::UnexpectedChar { ch: c, offset }),
            };
            tokens.push(Token { kind, offset });
        }
        Ok(tokens)
    }

    fn lex_string(&mut self, quote: char, offset: usize) -> ParseResult<TokenKind> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::String(value));
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return Err(ParseError::UnterminatedString { offset }),
            }
        }
    }

    fn lex_number(&mut self, offset: usize) -> ParseResult<TokenKind> {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1) != Some('.') {
            self.advance();
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::MalformedNumber { offset })
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance();
        while self.peek().map_or(false, is_name_continue) {
            self.advance();
        }
        TokenKind::Ident(self.chars[start..self.pos].iter().collect())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// The source text being tokenized.
    pub fn source(&self) -> &'a str {
        self.source
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    // NCName continuation: '.' is allowed mid-name; the lone-dot and
    // dot-dot tokens are only produced outside a name.
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
