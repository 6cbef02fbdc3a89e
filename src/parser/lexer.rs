//! Lexer for shell scripts
//!
//! Pulls code points from a [`CharReader`] and produces one token per call.
//! It handles:
//! - Operators, including the two-character `&&`, `||` and `>>`
//! - Literal text with quoting and backslash escapes
//! - Comments
//! - Line continuations
//!
//! The lexer knows nothing about the grammar. Keywords are plain literal
//! tokens; the parser decides where a literal spelled `if` is a keyword.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use crate::ast::types::Position;
use crate::parser::reader::CharReader;
use crate::parser::types::{ErrorKind, LexerError};

/// Token types for the shell lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // End of input
    Eof,

    // Text
    Literal,
    Comment,

    // Separators
    Newline,
    Semicolon,
    Amp, // &

    // Operators
    AndAnd, // &&
    OrOr,   // ||
    Pipe,   // |

    // Grouping
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }

    // Redirections
    Great,  // >
    DGreat, // >>
    Less,   // <

    // Expansion introducer
    Dollar, // $
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Literal => "LITERAL",
            Self::Comment => "COMMENT",
            Self::Newline => "NEWLINE",
            Self::Semicolon => ";",
            Self::Amp => "&",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Pipe => "|",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Great => ">",
            Self::DGreat => ">>",
            Self::Less => "<",
            Self::Dollar => "$",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserved words. These are never produced by the lexer; a literal token
/// whose text equals the spelling is a keyword only where the grammar asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    For,
    In,
    Do,
    Done,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Then => "then",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Fi => "fi",
            Self::While => "while",
            Self::For => "for",
            Self::In => "in",
            Self::Do => "do",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    /// Collected text for literal and comment tokens
    pub value: String,
    /// Position of the first code point
    pub pos: Position,
    /// Whitespace came between this token and the previous one
    pub spaced: bool,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, pos: Position, spaced: bool) -> Self {
        Self {
            token_type,
            value: value.into(),
            pos,
            spaced,
        }
    }

    pub fn eof(pos: Position) -> Self {
        Self::new(TokenType::Eof, "", pos, false)
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.token_type == TokenType::Literal && self.value == kw.as_str()
    }

    /// How the token is named in diagnostics
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Literal => self.value.clone(),
            t => t.as_str().to_string(),
        }
    }
}

lazy_static::lazy_static! {
    /// Single-character operators
    static ref SINGLE_CHAR_OPS: HashMap<char, TokenType> = {
        let mut m = HashMap::new();
        m.insert('\n', TokenType::Newline);
        m.insert(';', TokenType::Semicolon);
        m.insert('&', TokenType::Amp);
        m.insert('|', TokenType::Pipe);
        m.insert('(', TokenType::LParen);
        m.insert(')', TokenType::RParen);
        m.insert('{', TokenType::LBrace);
        m.insert('}', TokenType::RBrace);
        m.insert('>', TokenType::Great);
        m.insert('<', TokenType::Less);
        m.insert('$', TokenType::Dollar);
        m
    };
}

/// Two-character operators: first char, second char
const TWO_CHAR_OPS: &[(char, char, TokenType)] = &[
    ('&', '&', TokenType::AndAnd),
    ('|', '|', TokenType::OrOr),
    ('>', '>', TokenType::DGreat),
];

/// Always ends a literal, unless escaped or quoted
pub fn is_reserved(c: char) -> bool {
    matches!(c, '\n' | '&' | '>' | '<' | '|' | ';' | '(' | ')' | '$')
}

/// Reserved only as the first character of a token
pub fn is_starter(c: char) -> bool {
    matches!(c, '{' | '}' | '#')
}

pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

pub fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Quoting context. A new frame is opened by `$(` and closed by its `)`.
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    /// Quote region left open when a literal was cut short by `$`
    quote: Option<char>,
    /// Unmatched plain `(` seen in this frame
    parens: usize,
}

/// Lexer over a code point source
pub struct Lexer<R> {
    reader: CharReader<R>,
    frames: Vec<Frame>,
    after_dollar: bool,
    /// Set by the first error; every later token is EOF
    failed: bool,
}

impl<R: Read> Lexer<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: CharReader::new(input),
            frames: vec![Frame::default()],
            after_dollar: false,
            failed: false,
        }
    }

    /// Position of the next unread code point
    pub fn position(&self) -> Position {
        self.reader.position()
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        if self.failed {
            return Ok(Token::eof(self.position()));
        }
        let result = self.scan();
        if let Ok(tok) = &result {
            tracing::trace!(kind = %tok.token_type, value = %tok.value, pos = %tok.pos, "token");
        }
        self.latch(result)
    }

    /// Read the raw body of `${...}` after its `{` token, consuming the
    /// matching `}`. Nested braces are balanced.
    pub fn read_param_body(&mut self) -> Result<String, LexerError> {
        let result = self.scan_param_body();
        self.latch(result)
    }

    fn latch<T>(&mut self, result: Result<T, LexerError>) -> Result<T, LexerError> {
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn frame(&self) -> Frame {
        self.frames.last().copied().unwrap_or_default()
    }

    fn frame_mut(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn read(&mut self) -> Result<Option<char>, LexerError> {
        let pos = self.reader.position();
        self.reader
            .read()
            .map_err(|e| LexerError::new(pos, ErrorKind::Io(e)))
    }

    /// Consume the next code point only if it is `wanted`.
    fn read_only(&mut self, wanted: char) -> Result<bool, LexerError> {
        match self.read()? {
            Some(c) if c == wanted => Ok(true),
            Some(c) => {
                self.reader.unread(c);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn scan(&mut self) -> Result<Token, LexerError> {
        let after_dollar = std::mem::take(&mut self.after_dollar);
        let quote = self.frame().quote;
        let mut spaced = false;

        loop {
            let pos = self.position();
            let c = match self.read()? {
                Some(c) => c,
                None => {
                    if let Some(q) = quote {
                        return Err(LexerError::new(pos, ErrorKind::UnterminatedQuote(q)));
                    }
                    return Ok(Token::new(TokenType::Eof, "", pos, spaced));
                }
            };

            if quote.is_none() && is_space(c) {
                spaced = true;
                continue;
            }
            // Line continuation
            if c == '\\' && self.read_only('\n')? {
                continue;
            }

            // Directly after `$`, starters are not special
            let expansion = after_dollar && !spaced;
            let token = match c {
                '$' => {
                    self.after_dollar = true;
                    Token::new(TokenType::Dollar, "", pos, spaced)
                }
                '(' if expansion => {
                    self.frames.push(Frame::default());
                    Token::new(TokenType::LParen, "", pos, spaced)
                }
                '{' if expansion => Token::new(TokenType::LBrace, "", pos, spaced),
                _ if quote.is_some() || (expansion && !is_reserved(c)) => {
                    let value = self.read_literal(c, quote)?;
                    Token::new(TokenType::Literal, value, pos, spaced)
                }
                '#' => {
                    let value = self.read_line()?;
                    Token::new(TokenType::Comment, value, pos, spaced)
                }
                _ if is_reserved(c) || is_starter(c) => self.read_operator(c, pos, spaced)?,
                _ => {
                    let value = self.read_literal(c, None)?;
                    Token::new(TokenType::Literal, value, pos, spaced)
                }
            };
            return Ok(token);
        }
    }

    fn read_operator(&mut self, c: char, pos: Position, spaced: bool) -> Result<Token, LexerError> {
        for &(first, second, token_type) in TWO_CHAR_OPS {
            if c == first {
                if self.read_only(second)? {
                    return Ok(Token::new(token_type, "", pos, spaced));
                }
                break;
            }
        }

        let token_type = SINGLE_CHAR_OPS.get(&c).copied().unwrap_or(TokenType::Literal);
        match token_type {
            TokenType::LParen => self.frame_mut().parens += 1,
            TokenType::RParen => {
                let frame = self.frame_mut();
                if frame.parens > 0 {
                    frame.parens -= 1;
                } else if self.frames.len() > 1 {
                    self.frames.pop();
                }
            }
            _ => {}
        }
        Ok(Token::new(token_type, "", pos, spaced))
    }

    /// Collect a literal starting with `first`. `quote` is the region still
    /// open from the previous literal, if any.
    fn read_literal(&mut self, first: char, quote: Option<char>) -> Result<String, LexerError> {
        let mut q = quote;
        let mut text = String::new();
        let mut c = first;
        let mut at_eof = false;

        loop {
            match c {
                '\\' if q != Some('\'') => match self.read()? {
                    Some('\n') => {}
                    Some(escaped) => {
                        text.push('\\');
                        text.push(escaped);
                    }
                    None => {
                        text.push('\\');
                        at_eof = true;
                        break;
                    }
                },
                '$' if q != Some('\'') => {
                    self.reader.unread(c);
                    break;
                }
                _ if q.is_some() => {
                    if Some(c) == q {
                        q = None;
                    }
                    text.push(c);
                }
                _ if is_quote(c) => {
                    q = Some(c);
                    text.push(c);
                }
                _ if is_reserved(c) || is_space(c) => {
                    self.reader.unread(c);
                    break;
                }
                _ => text.push(c),
            }
            match self.read()? {
                Some(next) => c = next,
                None => {
                    at_eof = true;
                    break;
                }
            }
        }

        if at_eof {
            if let Some(open) = q {
                return Err(LexerError::new(
                    self.position(),
                    ErrorKind::UnterminatedQuote(open),
                ));
            }
        }
        self.frame_mut().quote = q;
        Ok(text)
    }

    /// Text up to the end of the line; the line feed is consumed.
    fn read_line(&mut self) -> Result<String, LexerError> {
        let mut text = String::new();
        while let Some(c) = self.read()? {
            if c == '\n' {
                break;
            }
            text.push(c);
        }
        Ok(text)
    }

    fn scan_param_body(&mut self) -> Result<String, LexerError> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.read()? {
                None => {
                    return Err(LexerError::new(
                        self.position(),
                        ErrorKind::Unexpected {
                            found: TokenType::Eof.as_str().to_string(),
                            wanted: TokenType::RBrace.as_str().to_string(),
                        },
                    ))
                }
                Some('}') if depth == 0 => return Ok(text),
                Some(c) => {
                    match c {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    text.push(c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
        let mut lexer = Lexer::new(input.as_bytes());
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let done = tok.token_type == TokenType::Eof;
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn types(input: &str) -> Vec<TokenType> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_simple_command() {
        let tokens = tokenize("echo hello").unwrap();
        assert_eq!(tokens.len(), 3); // echo, hello, EOF
        assert_eq!(tokens[0].token_type, TokenType::Literal);
        assert_eq!(tokens[0].value, "echo");
        assert!(!tokens[0].spaced);
        assert_eq!(tokens[1].value, "hello");
        assert!(tokens[1].spaced);
        assert_eq!(tokens[1].pos, Position::new(1, 6));
    }

    #[test]
    fn test_operators() {
        use TokenType::*;
        assert_eq!(
            types("a && b || c | d & e ; f > g >> h < i"),
            vec![
                Literal, AndAnd, Literal, OrOr, Literal, Pipe, Literal, Amp, Literal, Semicolon,
                Literal, Great, Literal, DGreat, Literal, Less, Literal, Eof
            ]
        );
    }

    #[test]
    fn test_operators_without_spaces() {
        use TokenType::*;
        assert_eq!(types("a>b"), vec![Literal, Great, Literal, Eof]);
        assert_eq!(types("a&b"), vec![Literal, Amp, Literal, Eof]);
        assert_eq!(types("a;b\n"), vec![Literal, Semicolon, Literal, Newline, Eof]);
    }

    #[test]
    fn test_starters_only_at_token_start() {
        let tokens = tokenize("{ a{b}#c }").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::LBrace);
        assert_eq!(tokens[1].token_type, TokenType::Literal);
        assert_eq!(tokens[1].value, "a{b}#c");
        assert_eq!(tokens[2].token_type, TokenType::RBrace);
    }

    #[test]
    fn test_comment() {
        let tokens = tokenize("# hello world\necho").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Comment);
        assert_eq!(tokens[0].value, " hello world");
        assert_eq!(tokens[1].value, "echo");
        assert_eq!(tokens[1].pos, Position::new(2, 1));
    }

    #[test]
    fn test_single_quotes_keep_backslash() {
        let tokens = tokenize(r"'a\nb'").unwrap();
        assert_eq!(tokens[0].value, r"'a\nb'");
    }

    #[test]
    fn test_quoted_reserved_chars() {
        let tokens = tokenize("\"a | b; c\" d").unwrap();
        assert_eq!(tokens[0].value, "\"a | b; c\"");
        assert_eq!(tokens[1].value, "d");
    }

    #[test]
    fn test_escaped_newline_elided() {
        let tokens = tokenize("\"a\\\nb\"").unwrap();
        assert_eq!(tokens[0].value, "\"ab\"");
        let tokens = tokenize("ec\\\nho").unwrap();
        assert_eq!(tokens[0].value, "echo");
    }

    #[test]
    fn test_escape_kept_verbatim() {
        let tokens = tokenize(r"a\ b\;c").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, r"a\ b\;c");
    }

    #[test]
    fn test_line_continuation_between_tokens() {
        use TokenType::*;
        assert_eq!(types("a \\\n b"), vec![Literal, Literal, Eof]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize("echo 'abc").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnterminatedQuote('\'')));
        assert_eq!(err.pos, Position::new(1, 10));
    }

    #[test]
    fn test_dollar_ends_literal() {
        use TokenType::*;
        assert_eq!(types("a$b"), vec![Literal, Dollar, Literal, Eof]);
        assert_eq!(types("$(x)"), vec![Dollar, LParen, Literal, RParen, Eof]);
        // The parser reads a `${` body with read_param_body, never as tokens
        assert_eq!(types("${x}"), vec![Dollar, LBrace, Literal, Eof]);
        assert_eq!(types("'$x'"), vec![Literal, Eof]);
    }

    #[test]
    fn test_dollar_hash_is_literal() {
        let tokens = tokenize("$#").unwrap();
        assert_eq!(tokens[1].token_type, TokenType::Literal);
        assert_eq!(tokens[1].value, "#");
    }

    #[test]
    fn test_quote_resumes_after_expansion() {
        let tokens = tokenize("\"hello $USER and more\" x").unwrap();
        assert_eq!(tokens[0].value, "\"hello ");
        assert_eq!(tokens[1].token_type, TokenType::Dollar);
        assert_eq!(tokens[2].value, "USER and more\"");
        assert!(!tokens[2].spaced);
        assert_eq!(tokens[3].value, "x");
        assert!(tokens[3].spaced);
    }

    #[test]
    fn test_command_substitution_inside_quotes() {
        let tokens = tokenize("\"a $(b c) d\"").unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.describe()).collect();
        assert_eq!(values, vec!["\"a ", "$", "(", "b", "c", ")", " d\"", "EOF"]);
    }

    #[test]
    fn test_param_body() {
        let mut lexer = Lexer::new("${a:-${b}} rest".as_bytes());
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::Dollar);
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::LBrace);
        assert_eq!(lexer.read_param_body().unwrap(), "a:-${b}");
        let rest = lexer.next_token().unwrap();
        assert_eq!(rest.value, "rest");
        assert!(rest.spaced);
    }

    #[test]
    fn test_error_latches_eof() {
        let mut lexer = Lexer::new("'open".as_bytes());
        assert!(lexer.next_token().is_err());
        assert!(lexer.failed());
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::Eof);
    }

    #[test]
    fn test_keyword_probe() {
        let tok = Token::new(TokenType::Literal, "then", Position::default(), false);
        assert!(tok.is_keyword(Keyword::Then));
        assert!(!tok.is_keyword(Keyword::Fi));
        let quoted = Token::new(TokenType::Literal, "'then'", Position::default(), false);
        assert!(!quoted.is_keyword(Keyword::Then));
    }

    #[test]
    fn test_newline_position() {
        let tokens = tokenize("a\nb").unwrap();
        assert_eq!(tokens[1].token_type, TokenType::Newline);
        assert_eq!(tokens[1].pos, Position::new(1, 2));
        assert_eq!(tokens[2].pos, Position::new(2, 1));
    }
}
