//! Word Parser
//!
//! A word is a run of literal and expansion parts with no whitespace
//! between them. Expansions:
//! - `${...}` keeps its raw inner text
//! - `$(...)` is parsed recursively as a command list
//! - `$name` is folded into a literal carrying the `$`

use std::io::Read;

use crate::ast::types::{WordNode, WordPart, AST};
use crate::parser::lexer::TokenType;
use crate::parser::parser::{Expected, ParseResult, Parser};

const SUBST_STOP: &[Expected] = &[Expected::Token(TokenType::RParen)];

impl<R: Read> Parser<R> {
    pub(crate) fn peek_word(&self) -> bool {
        self.peek(TokenType::Literal) || self.peek(TokenType::Dollar)
    }

    pub(crate) fn word(&mut self) -> ParseResult<WordNode> {
        let mut parts = Vec::new();
        while !self.peek(TokenType::Eof) {
            if !parts.is_empty() && self.tok.spaced {
                break;
            }
            if self.got(TokenType::Literal)? {
                parts.push(AST::literal(self.take_last_value()));
            } else if self.got(TokenType::Dollar)? {
                parts.push(self.expansion()?);
            } else {
                break;
            }
        }
        if parts.is_empty() {
            return Err(self.err_wanted("word"));
        }
        Ok(AST::word(parts))
    }

    /// Words up to a `;` or newline, which is consumed. A trailing comment
    /// also ends the list and is left for the caller.
    pub(crate) fn word_list(&mut self) -> ParseResult<Vec<WordNode>> {
        let mut words = Vec::new();
        while !self.peek(TokenType::Eof) {
            if self.got(TokenType::Semicolon)? || self.got(TokenType::Newline)? {
                break;
            }
            if self.peek(TokenType::Comment) {
                break;
            }
            words.push(self.word()?);
        }
        Ok(words)
    }

    /// Called with `$` consumed.
    fn expansion(&mut self) -> ParseResult<WordPart> {
        if self.tok.spaced {
            return Ok(AST::literal("$"));
        }
        match self.tok.token_type {
            TokenType::LBrace => {
                let text = self.read_param_body()?;
                self.next()?;
                Ok(AST::parameter_expansion(text))
            }
            TokenType::LParen => self.nested(|p| {
                p.next()?;
                p.builder.push_sequence();
                p.commands_limited(SUBST_STOP)?;
                let body = p.builder.pop_sequence();
                p.want(TokenType::RParen)?;
                Ok(AST::command_substitution(body))
            }),
            TokenType::Literal => {
                self.next()?;
                Ok(AST::literal(format!("${}", self.take_last_value())))
            }
            _ => Ok(AST::literal("$")),
        }
    }
}
