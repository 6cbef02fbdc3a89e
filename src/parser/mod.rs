//! Parser module for shell scripts
//!
//! This module contains the character reader, the lexer and the
//! recursive-descent parser with its builder stack.

pub mod types;
pub mod reader;
pub mod lexer;
pub mod builder;
pub mod word_parser;
pub mod compound_parser;
pub mod command_parser;
pub mod parser;

// Re-exports
pub use types::{ErrorKind, LexerError, ParseError, ParserOptions};
pub use lexer::{Keyword, Lexer, Token, TokenType};
pub use parser::{parse, parse_str, ParseOutcome, Parser};
