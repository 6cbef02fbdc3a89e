//! shell-front - a front end for a small shell language
//!
//! This library turns shell source text into an AST: a single-pass lexer
//! with contextual keywords feeds a recursive-descent parser that assembles
//! the tree through a builder stack and stops at the first error.

pub mod ast;
pub mod parser;

pub use ast::types::*;
pub use parser::{parse, parse_str, ErrorKind, ParseError, ParseOutcome, Parser, ParserOptions};
