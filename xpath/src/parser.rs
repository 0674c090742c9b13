//! Expression parsing.
//!
//! Precedence-climbing over the token stream:
//! - Logical: `or`, `and`
//! - Equality: `=`, `!=`
//! - Relational: `<`, `<=`, `>`, `>=`
//! - Additive: `+`, `-`
//! - Multiplicative: `*`, `div`, `mod`
//! - Unary: `-`
//! - Primary: literals, location paths, function calls, parentheses
//!
//! `and`/`or`/`div`/`mod` arrive as plain identifiers; they only act as
//! operators in operator position, so they stay usable as node names.

use crate::ast::{Axis, BinaryOp, Expr, FnCall, LocationPath, PathStart, QName, Step};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parse one expression from source text.
pub fn parse(source: &str) -> ParseResult<Expr> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Some(tok) => Err(ParseError::TrailingInput { offset: tok.offset }),
        None => Ok(expr),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_word("or") {
            let right = self.parse_and()?;
            left = Expr::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat_word("and") {
            let right = self.parse_equality()?;
            left = Expr::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.eat(&TokenKind::Eq) {
                BinaryOp::Eq
            } else if self.eat(&TokenKind::NotEq) {
                BinaryOp::NotEq
            } else {
                break;
            };
            let right = self.parse_relational()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.eat(&TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.eat(&TokenKind::LtEq) {
                BinaryOp::LtEq
            } else if self.eat(&TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.eat(&TokenKind::GtEq) {
                BinaryOp::GtEq
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat_word("div") {
                BinaryOp::Div
            } else if self.eat_word("mod") {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(ParseError::unexpected_end("expression")),
        };
        match tok.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Literal(s))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Slash => {
                self.advance();
                let steps = self.parse_steps()?;
                Ok(Expr::Path(LocationPath::new(PathStart::Root, steps)))
            }
            TokenKind::Dot | TokenKind::DotDot => {
                let steps = self.parse_steps()?;
                Ok(Expr::Path(LocationPath::new(PathStart::Context, steps)))
            }
            TokenKind::Ident(ref name) => {
                if self.peek_kind_at(1) == Some(&TokenKind::LParen) {
                    self.parse_fn_call_or_current_path(name.clone(), tok.offset)
                } else {
                    let steps = self.parse_steps()?;
                    Ok(Expr::Path(LocationPath::new(PathStart::Context, steps)))
                }
            }
            other => Err(ParseError::unexpected_token(
                other.describe(),
                "expression",
                tok.offset,
            )),
        }
    }

    /// `name(args...)`, special-casing `current()` followed by `/` which
    /// starts a location path rooted at the current node.
    fn parse_fn_call_or_current_path(&mut self, name: String, offset: usize) -> ParseResult<Expr> {
        self.advance(); // name
        self.advance(); // (
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        if name == "current" && self.check(&TokenKind::Slash) {
            if !args.is_empty() {
                return Err(ParseError::unexpected_token(
                    "arguments",
                    "current() takes no arguments",
                    offset,
                ));
            }
            self.advance(); // /
            let steps = self.parse_steps()?;
            return Ok(Expr::Path(LocationPath::new(PathStart::CurrentFn, steps)));
        }

        Ok(Expr::FnCall(FnCall { name, args }))
    }

    /// Parse `step ('/' step)*`.
    fn parse_steps(&mut self) -> ParseResult<Vec<Step>> {
        let mut steps = vec![self.parse_step()?];
        while self.check(&TokenKind::Slash) {
            self.advance();
            steps.push(self.parse_step()?);
        }
        Ok(steps)
    }

    fn parse_step(&mut self) -> ParseResult<Step> {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(ParseError::unexpected_end("path step")),
        };
        match tok.kind {
            TokenKind::Dot => {
                self.advance();
                Ok(Step::self_axis())
            }
            TokenKind::DotDot => {
                self.advance();
                Ok(Step::parent())
            }
            TokenKind::Ident(first) => {
                self.advance();
                let name = if self.eat(&TokenKind::Colon) {
                    let local = self.expect_ident()?;
                    QName::new(Some(first), local)
                } else {
                    QName::unprefixed(first)
                };
                let mut step = Step::child(name);
                while self.eat(&TokenKind::LBracket) {
                    step.predicates.push(self.parse_expr()?);
                    self.expect(&TokenKind::RBracket)?;
                }
                Ok(step)
            }
            other => Err(ParseError::unexpected_token(
                other.describe(),
                "path step",
                tok.offset,
            )),
        }
    }

    // ========== Token helpers ==========

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().map_or(false, |t| &t.kind == kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume an identifier acting as a word operator, but only when it
    /// is followed by something (an operator cannot end the expression).
    fn eat_word(&mut self, word: &str) -> bool {
        let is_word = matches!(
            self.peek(),
            Some(Token { kind: TokenKind::Ident(name), .. }) if name == word
        );
        if is_word && self.pos + 1 < self.tokens.len() {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<()> {
        match self.peek() {
            Some(tok) if &tok.kind == kind => {
                self.advance();
                Ok(())
            }
            Some(tok) => Err(ParseError::unexpected_token(
                tok.kind.describe(),
                kind.describe(),
                tok.offset,
            )),
            None => Err(ParseError::unexpected_end(kind.describe())),
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek().cloned() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                self.advance();
                Ok(name)
            }
            Some(tok) => Err(ParseError::unexpected_token(
                tok.kind.describe(),
                "name",
                tok.offset,
            )),
            None => Err(ParseError::unexpected_end("name")),
        }
    }
}
