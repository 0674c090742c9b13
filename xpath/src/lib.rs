//! Canopy XPath
//!
//! Syntax layer for the constraint expression language: a lexer and a
//! recursive-descent parser producing a typed AST. Expressions are parsed
//! once, at schema-load time; the evaluation engine walks the AST and
//! never sees source text again.
//!
//! The dialect is the XPath 1.0 subset the schema language actually uses:
//! relative and absolute location paths (including cross-module absolute
//! paths), `current()` as a path start, key predicates on list steps, the
//! standard string/boolean/numeric function names plus the schema-language
//! extensions (`derived-from`, `derived-from-or-self`, `enum-value`).

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Axis, BinaryOp, Expr, FnCall, LocationPath, PathStart, QName, Step};
pub use error::{ParseError, ParseResult};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::parse;
