//! Code point source for the lexer
//!
//! Decodes UTF-8 from any `Read` one code point at a time, tracks the
//! position of the next code point and allows a single code point of pushback.

use std::io::{self, BufRead, BufReader, Read};

use crate::ast::types::Position;

pub struct CharReader<R> {
    inner: BufReader<R>,
    pushed: Option<char>,
    /// Position of the next code point
    pos: Position,
    /// Position before the last code point read, restored by `unread`
    backup: Position,
}

impl<R: Read> CharReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            pushed: None,
            pos: Position::default(),
            backup: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Read the next code point. `Ok(None)` is end of input.
    pub fn read(&mut self) -> io::Result<Option<char>> {
        let c = match self.pushed.take() {
            Some(c) => c,
            None => match self.decode()? {
                Some(c) => c,
                None => return Ok(None),
            },
        };
        self.backup = self.pos;
        self.pos.advance(c);
        Ok(Some(c))
    }

    /// Push back the code point just read.
    ///
    /// # Panics
    ///
    /// Panics if a code point is already pushed back.
    pub fn unread(&mut self, c: char) {
        assert!(self.pushed.is_none(), "only one code point of pushback");
        self.pushed = Some(c);
        self.pos = self.backup;
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let byte = match self.inner.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if byte.is_some() {
                self.inner.consume(1);
            }
            return Ok(byte);
        }
    }

    fn decode(&mut self) -> io::Result<Option<char>> {
        let first = match self.next_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };
        let width = utf8_width(first);
        if width == 0 {
            return Err(invalid_utf8());
        }
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(invalid_utf8)?;
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(invalid_utf8)
    }
}

fn utf8_width(b: u8) -> usize {
    match b {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}
