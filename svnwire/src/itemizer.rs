//! Token stream to recursive [`Item`] tree.
//!
//! An `Itemizer` owns exactly one `Tokenizer` for its whole lifetime;
//! recursion for nested lists walks the item tree, not the token source.

use std::io::Read;

use svnwire_types::Item;

use crate::token::{Token, TokenizeError, Tokenizer};

/// Everything that can go wrong turning a token stream into an item tree.
#[derive(Debug, thiserror::Error)]
pub enum ItemizeError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    /// A `)` was read with no matching open `(` at this nesting level.
    #[error("unexpected ')' with no matching '('")]
    UnmatchedRightParen,
    /// The stream ended while a list was still open.
    #[error("unexpected end of stream inside an open list")]
    UnclosedList,
}

/// Turns a byte stream into a sequence of top-level [`Item`]s.
pub struct Itemizer<R> {
    tokenizer: Tokenizer<R>,
}

impl<R: Read> Itemizer<R> {
    pub fn new(reader: R) -> Self {
        Itemizer {
            tokenizer: Tokenizer::new(reader),
        }
    }

    /// Returns the next top-level item, or `Ok(None)` once the stream ends
    /// cleanly between items -- the protocol's normal terminator. An EOF
    /// while a list is still open is surfaced as `Err(ItemizeError::UnclosedList)`
    /// instead, since that's never a valid place to stop.
    pub fn next_item(&mut self) -> Result<Option<Item>, ItemizeError> {
        match self.tokenizer.next_token() {
            Err(TokenizeError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
            Ok(tok) => self.item_from_token(tok).map(Some),
        }
    }

    fn item_from_token(&mut self, tok: Token) -> Result<Item, ItemizeError> {
        match tok {
            Token::Word(w) => Ok(Item::Word(w)),
            Token::Number(n) => Ok(Item::Number(n)),
            Token::String(s) => Ok(Item::String(s)),
            Token::LeftParen => self.read_list(),
            Token::RightParen => Err(ItemizeError::UnmatchedRightParen),
        }
    }

    fn read_list(&mut self) -> Result<Item, ItemizeError> {
        let mut items = Vec::new();
        loop {
            let tok = self.tokenizer.next_token().map_err(|e| match e {
                TokenizeError::Eof => ItemizeError::UnclosedList,
                other => other.into(),
            })?;
            match tok {
                Token::RightParen => return Ok(Item::List(items)),
                other => items.push(self.item_from_token(other)?),
            }
        }
    }
}
