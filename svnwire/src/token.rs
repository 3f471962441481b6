//! The lowest layer: bytes to lexical tokens.
//!
//! A combinator-parser-over-complete-buffers style doesn't fit this
//! protocol's model of a blocking byte stream with no natural "chunk"
//! boundary -- so this layer is a hand-rolled pull lexer with a single byte
//! of lookahead, reading one byte at a time from a buffered reader.

use std::io::{self, BufReader, Read};

use log::trace;

/// One lexical unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Number(u64),
    String(Vec<u8>),
    LeftParen,
    RightParen,
}

/// Everything that can go wrong lexing the byte stream.
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    /// The stream ended cleanly at a token boundary. This is the tokenizer's
    /// normal terminator, not a failure — callers that want "no more tokens"
    /// to mean something other than an error (see [`crate::Itemizer`]) match
    /// on this variant explicitly.
    #[error("end of stream")]
    Eof,
    #[error("i/o error reading from transport: {0}")]
    Io(#[from] io::Error),
    #[error("syntax error: {0}")]
    Syntax(String),
}

fn is_wire_space(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ')
}

/// Reads [`Token`]s from a byte stream.
///
/// An I/O error or a clean end-of-stream latches the tokenizer: once either
/// happens, every subsequent call to [`Tokenizer::next_token`] returns
/// `Err(TokenizeError::Eof)` without touching the underlying reader again.
pub struct Tokenizer<R> {
    reader: BufReader<R>,
    done: bool,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Tokenizer {
            reader: BufReader::new(reader),
            done: false,
        }
    }

    /// Reads one byte, or `None` on a clean end-of-stream. Latches `done` on
    /// both EOF and a genuine I/O error so the tokenizer never touches the
    /// reader again afterwards.
    fn next_byte(&mut self) -> Result<Option<u8>, TokenizeError> {
        if self.done {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(0) => {
                self.done = true;
                Ok(None)
            }
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => {
                self.done = true;
                Err(TokenizeError::Io(e))
            }
        }
    }

    /// Reads one byte, treating end-of-stream as a syntax error: used once a
    /// token is already underway, where the wire guarantees more bytes are
    /// coming (the token's own trailing whitespace, if nothing else).
    fn next_byte_mid_token(&mut self) -> Result<u8, TokenizeError> {
        self.next_byte()?.ok_or_else(|| {
            self.done = true;
            TokenizeError::Syntax("unexpected end of stream inside a token".into())
        })
    }

    /// Returns the next token, or `Err(TokenizeError::Eof)` once the stream
    /// ends cleanly between tokens.
    pub fn next_token(&mut self) -> Result<Token, TokenizeError> {
        let mut b = loop {
            match self.next_byte()? {
                None => return Err(TokenizeError::Eof),
                Some(b) if is_wire_space(b) => continue,
                Some(b) => break b,
            }
        };

        let token = if b.is_ascii_digit() {
            let mut n: u64 = 0;
            while b.is_ascii_digit() {
                n = n
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(b - b'0')))
                    .ok_or_else(|| TokenizeError::Syntax("number literal overflowed u64".into()))?;
                b = self.next_byte_mid_token()?;
            }
            if b == b':' {
                let mut octets = vec![0u8; n as usize];
                self.reader.read_exact(&mut octets)?;
                b = self.next_byte_mid_token()?;
                Token::String(octets)
            } else {
                Token::Number(n)
            }
        } else if b == b'(' {
            b = self.next_byte_mid_token()?;
            Token::LeftParen
        } else if b == b')' {
            b = self.next_byte_mid_token()?;
            Token::RightParen
        } else if b.is_ascii_alphabetic() {
            let mut word = String::new();
            while b.is_ascii_alphanumeric() || b == b'-' {
                word.push(b as char);
                b = self.next_byte_mid_token()?;
            }
            Token::Word(word)
        } else {
            return Err(TokenizeError::Syntax(format!(
                "unexpected byte {b:#04x}"
            )));
        };

        if !is_wire_space(b) {
            return Err(TokenizeError::Syntax(format!(
                "expected whitespace after token {token:?}, found {b:#04x}"
            )));
        }
        trace!("tokenizer: {token:?}");
        Ok(token)
    }
}
