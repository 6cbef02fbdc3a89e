//! Abstract Syntax Tree (AST) Types for shell programs
//!
//! Every node is an owned value; a node is created once, when the grammar
//! rule that produces it completes, and is never mutated afterwards.

use serde::Serialize;
use std::fmt;

// =============================================================================
// BASE TYPES
// =============================================================================

/// Position in the source text. Both fields are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Move past one code point.
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// =============================================================================
// PROGRAM & STATEMENTS
// =============================================================================

/// Root node: a complete program
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProgramNode {
    pub statements: Vec<StatementNode>,
}

/// Anything that can appear in a statement list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatementNode {
    Command(CommandNode),
    Binary(BinaryNode),
    If(IfNode),
    While(WhileNode),
    For(ForNode),
    FunctionDecl(FunctionDeclNode),
    Subshell(SubshellNode),
    Block(BlockNode),
    Comment(CommentNode),
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Simple command: words and redirections in source order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CommandNode {
    pub args: Vec<CommandArg>,
    /// Terminated by `&`
    pub background: bool,
}

impl CommandNode {
    pub fn words(&self) -> impl Iterator<Item = &WordNode> {
        self.args.iter().filter_map(|a| match a {
            CommandArg::Word(w) => Some(w),
            CommandArg::Redirection(_) => None,
        })
    }

    pub fn redirections(&self) -> impl Iterator<Item = &RedirectionNode> {
        self.args.iter().filter_map(|a| match a {
            CommandArg::Redirection(r) => Some(r),
            CommandArg::Word(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CommandArg {
    Word(WordNode),
    Redirection(RedirectionNode),
}

/// `left op right`. Right-associative: `a && b && c` is `a && (b && c)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryNode {
    pub operator: BinaryOperator,
    pub left: Box<StatementNode>,
    pub right: Box<StatementNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    And,  // &&
    Or,   // ||
    Pipe, // |
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Pipe => write!(f, "|"),
        }
    }
}

// =============================================================================
// CONTROL FLOW
// =============================================================================

/// if statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfNode {
    pub condition: Box<StatementNode>,
    pub then_body: Vec<StatementNode>,
    pub elifs: Vec<ElifClause>,
    pub else_body: Option<Vec<StatementNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElifClause {
    pub condition: Box<StatementNode>,
    pub then_body: Vec<StatementNode>,
}

/// while loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhileNode {
    pub condition: Box<StatementNode>,
    pub body: Vec<StatementNode>,
}

/// for loop: for VAR in WORDS; do ...; done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForNode {
    pub variable: String,
    pub words: Vec<WordNode>,
    pub body: Vec<StatementNode>,
}

/// Subshell: ( ... )
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubshellNode {
    pub body: Vec<StatementNode>,
}

/// Command group: { ...; }
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockNode {
    pub body: Vec<StatementNode>,
}

// =============================================================================
// FUNCTIONS & COMMENTS
// =============================================================================

/// Function declaration: name() body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDeclNode {
    pub name: String,
    pub body: Box<StatementNode>,
}

/// Text following `#`, up to the end of the line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    pub text: String,
}

// =============================================================================
// REDIRECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectionNode {
    pub operator: RedirectionOperator,
    pub target: WordNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectionOperator {
    Great,  // >
    DGreat, // >>
    Less,   // <
}

impl fmt::Display for RedirectionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Great => write!(f, ">"),
            Self::DGreat => write!(f, ">>"),
            Self::Less => write!(f, "<"),
        }
    }
}

// =============================================================================
// WORDS
// =============================================================================

/// A Word is a non-empty sequence of adjoining parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordNode {
    pub parts: Vec<WordPart>,
}

impl WordNode {
    /// The text of a word made of exactly one literal part.
    pub fn lit_text(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [WordPart::Literal(lit)] => Some(&lit.value),
            _ => None,
        }
    }

    /// Approximate source text, used in diagnostics.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                WordPart::Literal(lit) => out.push_str(&lit.value),
                WordPart::ParameterExpansion(p) => {
                    out.push_str("${");
                    out.push_str(&p.text);
                    out.push('}');
                }
                WordPart::CommandSubstitution(_) => out.push_str("$(...)"),
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WordPart {
    Literal(LiteralPart),
    ParameterExpansion(ParameterExpansionPart),
    CommandSubstitution(CommandSubstitutionPart),
}

/// Raw literal text; quotes and escapes are kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralPart {
    pub value: String,
}

/// `${...}`; the inner text is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterExpansionPart {
    pub text: String,
}

/// `$(...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSubstitutionPart {
    pub body: Vec<StatementNode>,
}

// =============================================================================
// AST FACTORY
// =============================================================================

pub struct AST;

impl AST {
    pub fn program(statements: Vec<StatementNode>) -> ProgramNode {
        ProgramNode { statements }
    }

    pub fn word(parts: Vec<WordPart>) -> WordNode {
        WordNode { parts }
    }

    pub fn literal(value: impl Into<String>) -> WordPart {
        WordPart::Literal(LiteralPart { value: value.into() })
    }

    pub fn lit_word(value: impl Into<String>) -> WordNode {
        WordNode {
            parts: vec![Self::literal(value)],
        }
    }

    pub fn parameter_expansion(text: impl Into<String>) -> WordPart {
        WordPart::ParameterExpansion(ParameterExpansionPart { text: text.into() })
    }

    pub fn command_substitution(body: Vec<StatementNode>) -> WordPart {
        WordPart::CommandSubstitution(CommandSubstitutionPart { body })
    }

    pub fn command(args: Vec<CommandArg>, background: bool) -> StatementNode {
        StatementNode::Command(CommandNode { args, background })
    }

    /// A foreground command of plain literal words.
    pub fn simple(words: &[&str]) -> StatementNode {
        let args = words
            .iter()
            .map(|w| CommandArg::Word(Self::lit_word(*w)))
            .collect();
        Self::command(args, false)
    }

    pub fn redirection(operator: RedirectionOperator, target: WordNode) -> CommandArg {
        CommandArg::Redirection(RedirectionNode { operator, target })
    }

    pub fn binary(
        operator: BinaryOperator,
        left: StatementNode,
        right: StatementNode,
    ) -> StatementNode {
        StatementNode::Binary(BinaryNode {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn comment(text: impl Into<String>) -> StatementNode {
        StatementNode::Comment(CommentNode { text: text.into() })
    }
}
