//! Abstract Syntax Tree (AST) Types for shell programs
//!
//! Architecture:
//!   Input → Reader → Lexer → Parser (builder stack) → AST

pub mod types;
