//! Command Parser
//!
//! Handles parsing of simple commands, function declarations, binary
//! expressions (`&&`, `||`, `|`) and redirections.

use std::io::Read;

use crate::ast::types::{
    BinaryOperator, CommandArg, CommandNode, FunctionDeclNode, Position, StatementNode,
    WordNode, AST,
};
use crate::parser::lexer::TokenType;
use crate::parser::parser::{Expected, ParseResult, Parser};
use crate::parser::types::{binary_operator, redirection_operator, ErrorKind};

lazy_static::lazy_static! {
    static ref IDENT_RE: regex_lite::Regex =
        regex_lite::Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Check if a string is a valid function name
pub fn is_valid_name(s: &str) -> bool {
    IDENT_RE.is_match(s)
}

impl<R: Read> Parser<R> {
    /// A simple command, or a function declaration when the first word is
    /// followed by `()`.
    pub(crate) fn simple_command(&mut self, stop: &[Expected]) -> ParseResult<()> {
        let start = self.tok.pos;
        let first = self.word()?;
        if self.got(TokenType::LParen)? {
            self.want(TokenType::RParen)?;
            return self.function_decl(first, start);
        }

        let mut cmd = CommandNode {
            args: vec![CommandArg::Word(first)],
            background: false,
        };
        while !self.peek(TokenType::Eof) {
            if self.peek_any(stop) {
                break;
            }
            if self.peek_word() {
                cmd.args.push(CommandArg::Word(self.word()?));
                continue;
            }
            if let Some(op) = binary_operator(self.tok.token_type) {
                self.next()?;
                return self.binary(op, cmd, stop);
            }
            if let Some(redirection) = self.redirection()? {
                cmd.args.push(redirection);
                continue;
            }
            if self.got(TokenType::Amp)? {
                cmd.background = true;
                break;
            }
            if self.got(TokenType::Semicolon)? || self.got(TokenType::Newline)? {
                break;
            }
            // The comment becomes a statement of its own
            if self.peek(TokenType::Comment) {
                break;
            }
            return Err(self.err_after("command"));
        }

        self.builder.append(StatementNode::Command(cmd));
        Ok(())
    }

    /// `name() body`, entered with `()` consumed.
    fn function_decl(&mut self, word: WordNode, pos: Position) -> ParseResult<()> {
        let name = match word.lit_text() {
            Some(text) if is_valid_name(text) => text.to_string(),
            Some(text) => {
                return Err(self.error_at(pos, ErrorKind::InvalidFunctionName(text.to_string())))
            }
            None => return Err(self.error_at(pos, ErrorKind::InvalidFunctionName(word.to_source()))),
        };
        let body = self.nested_command(&[])?;
        self.builder
            .append(StatementNode::FunctionDecl(FunctionDeclNode {
                name,
                body: Box::new(body),
            }));
        Ok(())
    }

    /// The rest of the line becomes the right operand; terminators and the
    /// background flag are handled by that nested command.
    fn binary(&mut self, op: BinaryOperator, left: CommandNode, stop: &[Expected]) -> ParseResult<()> {
        let right = self.nested_command(stop)?;
        self.builder
            .append(AST::binary(op, StatementNode::Command(left), right));
        Ok(())
    }

    /// `>`, `>>` or `<` followed by its target word
    fn redirection(&mut self) -> ParseResult<Option<CommandArg>> {
        let op = match redirection_operator(self.tok.token_type) {
            Some(op) => op,
            None => return Ok(None),
        };
        self.next()?;
        let target = self.word()?;
        Ok(Some(AST::redirection(op, target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parser::parse_str;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("foo"));
        assert!(is_valid_name("_x9"));
        assert!(!is_valid_name("9x"));
        assert!(!is_valid_name("a-b"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_parse_function() {
        let program = parse_str("foo() { echo hi; }", "test").unwrap();
        assert_eq!(program.statements.len(), 1);
        let StatementNode::FunctionDecl(func) = &program.statements[0] else {
            panic!("expected function");
        };
        assert_eq!(func.name, "foo");
        let StatementNode::Block(block) = func.body.as_ref() else {
            panic!("expected block body");
        };
        assert_eq!(block.body, vec![AST::simple(&["echo", "hi"])]);
    }

    #[test]
    fn test_function_spaced_parens_and_newline_body() {
        let program = parse_str("greet ( )\n{\n  echo hello\n}\ngreet", "test").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert!(matches!(program.statements[0], StatementNode::FunctionDecl(_)));
        assert_eq!(program.statements[1], AST::simple(&["greet"]));
    }

    #[test]
    fn test_function_with_subshell_body() {
        let program = parse_str("f() (cd /tmp; ls)", "test").unwrap();
        let StatementNode::FunctionDecl(func) = &program.statements[0] else {
            panic!("expected function");
        };
        assert!(matches!(func.body.as_ref(), StatementNode::Subshell(_)));
    }

    #[test]
    fn test_invalid_function_name_position() {
        let err = parse_str("echo ok\n  123abc() { :; }", "test").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidFunctionName(ref n) if n == "123abc"));
        assert_eq!(err.pos, Position::new(2, 3));
        assert_eq!(err.to_string(), "test:2:3: invalid func name \"123abc\"");
    }

    #[test]
    fn test_invalid_function_name_expansion() {
        let err = parse_str("${f}() { :; }", "test").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidFunctionName(ref n) if n == "${f}"));
        assert_eq!(err.pos, Position::new(1, 1));
    }

    #[test]
    fn test_function_missing_rparen() {
        let err = parse_str("foo(bar", "test").unwrap_err();
        assert_eq!(err.to_string(), "test:1:5: unexpected token bar - wanted )");
    }

    #[test]
    fn test_parse_pipeline() {
        let program = parse_str("cat file | grep pattern > out", "test").unwrap();
        let StatementNode::Binary(bin) = &program.statements[0] else {
            panic!("expected binary");
        };
        assert_eq!(bin.operator, BinaryOperator::Pipe);
        assert_eq!(*bin.left, AST::simple(&["cat", "file"]));
        let StatementNode::Command(right) = bin.right.as_ref() else {
            panic!("expected command");
        };
        assert_eq!(right.words().count(), 2);
        assert_eq!(right.redirections().count(), 1);
    }

    #[test]
    fn test_binary_with_compound_right() {
        let program = parse_str("test -f x && { echo yes; }", "test").unwrap();
        let StatementNode::Binary(bin) = &program.statements[0] else {
            panic!("expected binary");
        };
        assert!(matches!(bin.right.as_ref(), StatementNode::Block(_)));
    }

    #[test]
    fn test_unexpected_after_command() {
        let err = parse_str("echo a } b", "test").unwrap_err();
        assert_eq!(err.to_string(), "test:1:8: unexpected token } after command");
    }

    #[test]
    fn test_redirect_with_expansion_target() {
        let program = parse_str("echo hi >> ${LOG}", "test").unwrap();
        let StatementNode::Command(cmd) = &program.statements[0] else {
            panic!("expected command");
        };
        let redirection = cmd.redirections().next().unwrap();
        assert_eq!(redirection.target.parts, vec![AST::parameter_expansion("LOG")]);
    }
}
