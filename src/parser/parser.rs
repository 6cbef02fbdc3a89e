//! Recursive Descent Parser for shell scripts
//!
//! The parser pulls one token at a time from the lexer, keeps one token of
//! lookahead and one of lookback, and assembles the tree through a
//! [`Builder`] stack.
//!
//! Grammar (simplified):
//!   program     ::= commands
//!   commands    ::= command* (until EOF or a stop token)
//!   command     ::= comment | subshell | block | if | while | for
//!                 | function_decl | simple_cmd
//!   simple_cmd  ::= word (word | redirect)* [&|;|NEWLINE]
//!                 | word (word | redirect)* (&&|'||'|'|') command
//!   word        ::= (LITERAL | ${...} | $(commands) | $LITERAL)+

use std::fmt;
use std::io::Read;

use crate::ast::types::{Position, ProgramNode, StatementNode, AST};
use crate::parser::builder::Builder;
use crate::parser::lexer::{Keyword, Lexer, Token, TokenType};
use crate::parser::types::{
    ErrorKind, LexerError, ParseError, ParserOptions, MAX_INPUT_SIZE,
};

pub type ParseResult<T> = Result<T, ParseError>;

/// A token kind or a keyword the grammar is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenType),
    Keyword(Keyword),
}

impl From<TokenType> for Expected {
    fn from(t: TokenType) -> Self {
        Self::Token(t)
    }
}

impl From<Keyword> for Expected {
    fn from(kw: Keyword) -> Self {
        Self::Keyword(kw)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(t) => write!(f, "{}", t),
            Self::Keyword(kw) => write!(f, "{}", kw),
        }
    }
}

/// Result of [`Parser::run`]: the tree built so far and the first error.
#[derive(Debug)]
pub struct ParseOutcome {
    /// Complete on success. On failure, holds the top-level statements that
    /// were completed before the error.
    pub program: ProgramNode,
    pub error: Option<ParseError>,
}

impl ParseOutcome {
    pub fn into_result(self) -> Result<ProgramNode, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.program),
        }
    }
}

/// Parse a script from any reader. `name` only qualifies diagnostics.
pub fn parse<R: Read>(input: R, name: &str) -> Result<ProgramNode, ParseError> {
    Parser::new(input, name).run().into_result()
}

/// Parse a script held in memory
pub fn parse_str(input: &str, name: &str) -> Result<ProgramNode, ParseError> {
    if input.len() > MAX_INPUT_SIZE {
        return Err(ParseError::new(
            name,
            Position::default(),
            ErrorKind::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "input too large: {} bytes exceeds limit of {}",
                    input.len(),
                    MAX_INPUT_SIZE
                ),
            )),
        ));
    }
    parse(input.as_bytes(), name)
}

/// Main parser struct
pub struct Parser<R> {
    lexer: Lexer<R>,
    name: String,
    options: ParserOptions,
    /// Current token (the lookahead)
    pub(crate) tok: Token,
    /// Previously consumed token
    pub(crate) last: Token,
    pub(crate) builder: Builder<StatementNode>,
    depth: usize,
}

impl<R: Read> Parser<R> {
    pub fn new(input: R, name: impl Into<String>) -> Self {
        Self::with_options(input, name, ParserOptions::default())
    }

    pub fn with_options(input: R, name: impl Into<String>, options: ParserOptions) -> Self {
        Self {
            lexer: Lexer::new(input),
            name: name.into(),
            options,
            tok: Token::eof(Position::default()),
            last: Token::eof(Position::default()),
            builder: Builder::new(),
            depth: 0,
        }
    }

    /// Parse the whole input.
    pub fn run(mut self) -> ParseOutcome {
        tracing::debug!(source = %self.name, "parse start");
        self.builder.push_sequence();
        match self.program() {
            Ok(()) => {
                let statements = self.builder.pop_sequence();
                assert_eq!(self.builder.depth(), 0, "builder stack unbalanced");
                tracing::debug!(source = %self.name, statements = statements.len(), "parse done");
                ParseOutcome {
                    program: AST::program(statements),
                    error: None,
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "parse failed");
                ParseOutcome {
                    program: AST::program(self.builder.into_root()),
                    error: Some(err),
                }
            }
        }
    }

    fn program(&mut self) -> ParseResult<()> {
        self.next()?;
        self.commands(&[])?;
        Ok(())
    }

    // ===========================================================================
    // TOKEN / KEYWORD LAYER
    // ===========================================================================

    pub(crate) fn next(&mut self) -> ParseResult<()> {
        let tok = self.lexer.next_token().map_err(|e| self.lex_error(e))?;
        self.last = std::mem::replace(&mut self.tok, tok);
        Ok(())
    }

    pub(crate) fn lex_error(&self, err: LexerError) -> ParseError {
        ParseError::from_lexer(self.name.as_str(), err)
    }

    pub(crate) fn read_param_body(&mut self) -> ParseResult<String> {
        self.lexer.read_param_body().map_err(|e| self.lex_error(e))
    }

    /// True if the current token is `want`, or a literal spelling the keyword.
    pub(crate) fn peek(&self, want: impl Into<Expected>) -> bool {
        match want.into() {
            Expected::Token(t) => self.tok.token_type == t,
            Expected::Keyword(kw) => self.tok.is_keyword(kw),
        }
    }

    pub(crate) fn peek_any(&self, stop: &[Expected]) -> bool {
        stop.iter().any(|s| self.peek(*s))
    }

    pub(crate) fn got(&mut self, want: impl Into<Expected>) -> ParseResult<bool> {
        if self.peek(want) {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub(crate) fn want(&mut self, want: impl Into<Expected>) -> ParseResult<()> {
        let want = want.into();
        if !self.peek(want) {
            return Err(self.err_wanted(want.to_string()));
        }
        self.next()
    }

    pub(crate) fn skip_newlines(&mut self) -> ParseResult<()> {
        while self.got(TokenType::Newline)? {}
        Ok(())
    }

    /// Skip line feeds and comments where no statement list can hold them,
    /// e.g. before `then` or after `|`.
    pub(crate) fn skip_linebreaks(&mut self) -> ParseResult<()> {
        while self.got(TokenType::Newline)? || self.got(TokenType::Comment)? {}
        Ok(())
    }

    /// Take the text of the token just consumed
    pub(crate) fn take_last_value(&mut self) -> String {
        std::mem::take(&mut self.last.value)
    }

    // ===========================================================================
    // ERRORS
    // ===========================================================================

    pub(crate) fn error_at(&self, pos: Position, kind: ErrorKind) -> ParseError {
        ParseError::new(self.name.as_str(), pos, kind)
    }

    /// Where the current token starts; at EOF, the final cursor position.
    fn current_pos(&self) -> Position {
        if self.tok.token_type == TokenType::Eof {
            self.lexer.position()
        } else {
            self.tok.pos
        }
    }

    pub(crate) fn err_wanted(&self, wanted: impl Into<String>) -> ParseError {
        self.error_at(
            self.current_pos(),
            ErrorKind::Unexpected {
                found: self.tok.describe(),
                wanted: wanted.into(),
            },
        )
    }

    pub(crate) fn err_after(&self, after: impl Into<String>) -> ParseError {
        self.error_at(
            self.current_pos(),
            ErrorKind::UnexpectedAfter {
                found: self.tok.describe(),
                after: after.into(),
            },
        )
    }

    pub(crate) fn err_empty_body(&self) -> ParseError {
        self.error_at(
            self.current_pos(),
            ErrorKind::EmptyBody {
                found: self.tok.describe(),
            },
        )
    }

    // ===========================================================================
    // COMMAND LISTS
    // ===========================================================================

    /// Parse commands until EOF or one of `stop`. Returns how many were parsed.
    pub(crate) fn commands(&mut self, stop: &[Expected]) -> ParseResult<usize> {
        self.commands_propagating(false, stop)
    }

    /// Like `commands`, but the stop tokens also end each simple command, so
    /// `(echo hi)` closes without a separator.
    pub(crate) fn commands_limited(&mut self, stop: &[Expected]) -> ParseResult<usize> {
        self.commands_propagating(true, stop)
    }

    fn commands_propagating(&mut self, propagate: bool, stop: &[Expected]) -> ParseResult<usize> {
        let cmd_stop: &[Expected] = if propagate { stop } else { &[] };
        let mut count = 0;
        loop {
            self.skip_newlines()?;
            if self.peek(TokenType::Eof) || self.peek_any(stop) {
                return Ok(count);
            }
            self.command(cmd_stop)?;
            count += 1;
        }
    }

    /// Parse a non-empty statement list into a fresh sequence.
    pub(crate) fn body(&mut self, stop: &[Expected]) -> ParseResult<Vec<StatementNode>> {
        self.builder.push_sequence();
        if self.commands(stop)? == 0 {
            return Err(self.err_empty_body());
        }
        Ok(self.builder.pop_sequence())
    }

    /// Parse exactly one command into a single slot and return it.
    pub(crate) fn nested_command(&mut self, stop: &[Expected]) -> ParseResult<StatementNode> {
        self.skip_linebreaks()?;
        self.builder.push_single();
        self.command(stop)?;
        self.builder
            .pop_single()
            .ok_or_else(|| self.err_wanted("command"))
    }

    // ===========================================================================
    // COMMAND DISPATCH
    // ===========================================================================

    /// Parse one command and append it to the current destination.
    pub(crate) fn command(&mut self, stop: &[Expected]) -> ParseResult<()> {
        let entry = self.builder.depth();
        self.nested(|p| p.dispatch_command(stop))?;
        assert_eq!(self.builder.depth(), entry, "builder stack unbalanced");
        Ok(())
    }

    /// Run one level of grammar recursion under the depth limit.
    pub(crate) fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= self.options.max_depth {
            return Err(self.error_at(self.tok.pos, ErrorKind::TooDeep(self.options.max_depth)));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn dispatch_command(&mut self, stop: &[Expected]) -> ParseResult<()> {
        self.skip_newlines()?;

        if self.got(TokenType::Comment)? {
            let text = self.take_last_value();
            self.builder.append(AST::comment(text));
            return Ok(());
        }
        if self.got(TokenType::LParen)? {
            return self.subshell();
        }
        if self.got(TokenType::LBrace)? {
            return self.block();
        }
        if self.got(Keyword::If)? {
            return self.if_statement();
        }
        if self.got(Keyword::While)? {
            return self.while_statement();
        }
        if self.got(Keyword::For)? {
            return self.for_statement();
        }
        if self.peek(TokenType::Literal) || self.peek(TokenType::Dollar) {
            return self.simple_command(stop);
        }
        Err(self.err_wanted("command"))
    }
}
