//! Compound Command Parser
//!
//! Handles parsing of compound commands: subshell, block, if, while, for.
//! Each rule is entered after its opening token has been consumed.

use std::io::Read;

use crate::ast::types::{
    BlockNode, ElifClause, ForNode, IfNode, StatementNode, SubshellNode, WhileNode,
};
use crate::parser::lexer::{Keyword, TokenType};
use crate::parser::parser::{Expected, ParseResult, Parser};

const IF_BODY_STOP: &[Expected] = &[
    Expected::Keyword(Keyword::Fi),
    Expected::Keyword(Keyword::Elif),
    Expected::Keyword(Keyword::Else),
];
const FI_STOP: &[Expected] = &[Expected::Keyword(Keyword::Fi)];
const DONE_STOP: &[Expected] = &[Expected::Keyword(Keyword::Done)];
const RPAREN_STOP: &[Expected] = &[Expected::Token(TokenType::RParen)];
const RBRACE_STOP: &[Expected] = &[Expected::Token(TokenType::RBrace)];

impl<R: Read> Parser<R> {
    /// ( commands )
    pub(crate) fn subshell(&mut self) -> ParseResult<()> {
        self.builder.push_sequence();
        if self.commands_limited(RPAREN_STOP)? == 0 {
            return Err(self.err_empty_body());
        }
        self.want(TokenType::RParen)?;
        self.builder
            .pop_and_append(|body| StatementNode::Subshell(SubshellNode { body }));
        Ok(())
    }

    /// { commands }
    pub(crate) fn block(&mut self) -> ParseResult<()> {
        self.builder.push_sequence();
        if self.commands(RBRACE_STOP)? == 0 {
            return Err(self.err_empty_body());
        }
        self.want(TokenType::RBrace)?;
        self.builder
            .pop_and_append(|body| StatementNode::Block(BlockNode { body }));
        Ok(())
    }

    /// if cond; then ...; [elif cond; then ...;]* [else ...;] fi
    pub(crate) fn if_statement(&mut self) -> ParseResult<()> {
        let condition = self.nested_command(&[])?;
        self.skip_linebreaks()?;
        self.want(Keyword::Then)?;
        let then_body = self.body(IF_BODY_STOP)?;

        let mut elifs = Vec::new();
        while self.got(Keyword::Elif)? {
            let condition = self.nested_command(&[])?;
            self.skip_linebreaks()?;
            self.want(Keyword::Then)?;
            let then_body = self.body(IF_BODY_STOP)?;
            elifs.push(ElifClause {
                condition: Box::new(condition),
                then_body,
            });
        }

        let else_body = if self.got(Keyword::Else)? {
            Some(self.body(FI_STOP)?)
        } else {
            None
        };
        self.want(Keyword::Fi)?;

        self.builder.append(StatementNode::If(IfNode {
            condition: Box::new(condition),
            then_body,
            elifs,
            else_body,
        }));
        Ok(())
    }

    /// while cond; do ...; done
    pub(crate) fn while_statement(&mut self) -> ParseResult<()> {
        let condition = self.nested_command(&[])?;
        self.skip_linebreaks()?;
        self.want(Keyword::Do)?;
        let body = self.body(DONE_STOP)?;
        self.want(Keyword::Done)?;

        self.builder.append(StatementNode::While(WhileNode {
            condition: Box::new(condition),
            body,
        }));
        Ok(())
    }

    /// for name in words; do ...; done
    pub(crate) fn for_statement(&mut self) -> ParseResult<()> {
        if !self.got(TokenType::Literal)? {
            return Err(self.err_wanted("name"));
        }
        let variable = self.take_last_value();
        self.want(Keyword::In)?;
        let words = self.word_list()?;
        self.skip_linebreaks()?;
        self.want(Keyword::Do)?;
        let body = self.body(DONE_STOP)?;
        self.want(Keyword::Done)?;

        self.builder.append(StatementNode::For(ForNode {
            variable,
            words,
            body,
        }));
        Ok(())
    }
}
