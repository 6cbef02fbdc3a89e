//! Parser Types and Constants
//!
//! Errors, options and token classes shared by the lexer and parser modules.

use std::io;
use thiserror::Error;

use crate::ast::types::{BinaryOperator, Position, RedirectionOperator};
use crate::parser::lexer::TokenType;

// Parser limits to prevent hangs and resource exhaustion
pub const MAX_INPUT_SIZE: usize = 10_000_000; // 10MB max input for in-memory sources
pub const MAX_PARSER_DEPTH: usize = 200; // Max recursion depth for nested constructs

/// Options accepted by [`crate::parser::Parser`].
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Maximum nesting of commands and command substitutions.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_PARSER_DEPTH,
        }
    }
}

/// Map a redirection token to its operator
pub fn redirection_operator(t: TokenType) -> Option<RedirectionOperator> {
    match t {
        TokenType::Great => Some(RedirectionOperator::Great),
        TokenType::DGreat => Some(RedirectionOperator::DGreat),
        TokenType::Less => Some(RedirectionOperator::Less),
        _ => None,
    }
}

/// Map a binary operator token to its operator
pub fn binary_operator(t: TokenType) -> Option<BinaryOperator> {
    match t {
        TokenType::AndAnd => Some(BinaryOperator::And),
        TokenType::OrOr => Some(BinaryOperator::Or),
        TokenType::Pipe => Some(BinaryOperator::Pipe),
        _ => None,
    }
}

/// What went wrong, without location information.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("reached EOF without closing quote {0}")]
    UnterminatedQuote(char),

    #[error("unexpected token {found} - wanted {wanted}")]
    Unexpected { found: String, wanted: String },

    #[error("unexpected token {found} after {after}")]
    UnexpectedAfter { found: String, after: String },

    #[error("unexpected token {found} - wanted command")]
    EmptyBody { found: String },

    #[error("invalid func name {0:?}")]
    InvalidFunctionName(String),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

/// Error raised by the lexer before the source name is known
#[derive(Debug, Error)]
#[error("{pos}: {kind}")]
pub struct LexerError {
    pub pos: Position,
    pub kind: ErrorKind,
}

impl LexerError {
    pub fn new(pos: Position, kind: ErrorKind) -> Self {
        Self { pos, kind }
    }
}

/// The single error produced by a failed parse.
#[derive(Debug, Error)]
#[error("{source_name}:{pos}: {kind}")]
pub struct ParseError {
    pub source_name: String,
    pub pos: Position,
    pub kind: ErrorKind,
}

impl ParseError {
    pub fn new(source_name: impl Into<String>, pos: Position, kind: ErrorKind) -> Self {
        Self {
            source_name: source_name.into(),
            pos,
            kind,
        }
    }

    pub fn from_lexer(source_name: impl Into<String>, err: LexerError) -> Self {
        Self::new(source_name, err.pos, err.kind)
    }

    pub fn line(&self) -> usize {
        self.pos.line
    }

    pub fn column(&self) -> usize {
        self.pos.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_format() {
        let err = ParseError::new(
            "script.sh",
            Position::new(3, 7),
            ErrorKind::Unexpected {
                found: "EOF".into(),
                wanted: ")".into(),
            },
        );
        assert_eq!(err.to_string(), "script.sh:3:7: unexpected token EOF - wanted )");
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 7);
    }

    #[test]
    fn test_invalid_name_format() {
        let err = ParseError::new(
            "x",
            Position::new(1, 1),
            ErrorKind::InvalidFunctionName("123abc".into()),
        );
        assert_eq!(err.to_string(), "x:1:1: invalid func name \"123abc\"");
    }

    #[test]
    fn test_from_lexer() {
        let lex = LexerError::new(Position::new(2, 4), ErrorKind::UnterminatedQuote('\''));
        let err = ParseError::from_lexer("in", lex);
        assert_eq!(err.to_string(), "in:2:4: reached EOF without closing quote '");
    }

    #[test]
    fn test_redirection_operator() {
        assert_eq!(
            redirection_operator(TokenType::DGreat),
            Some(RedirectionOperator::DGreat)
        );
        assert_eq!(redirection_operator(TokenType::Pipe), None);
        assert_eq!(binary_operator(TokenType::Pipe), Some(BinaryOperator::Pipe));
        assert_eq!(binary_operator(TokenType::Amp), None);
    }

    #[test]
    fn test_default_options() {
        assert_eq!(ParserOptions::default().max_depth, MAX_PARSER_DEPTH);
    }
}
