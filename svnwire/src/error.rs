//! The crate-level error type, grouping every failure mode (transport,
//! lexical, structural, marshalling, protocol, remote) behind one
//! `thiserror`-derived enum, with each layer keeping its own typed error
//! rather than flattening everything into one opaque string.

use svnwire_types::{MarshalError, RemoteError};

use crate::itemizer::ItemizeError;
use crate::token::TokenizeError;

/// Everything that can go wrong over the lifetime of a connection.
///
/// Transport and lexical errors are fatal: the byte stream itself is no
/// longer trustworthy, and callers should drop the connection. Marshalling
/// and protocol errors abort the current command for the same reason (the
/// item boundary the error occurred at may not be where the caller thinks it
/// is) and should conservatively be treated as connection-fatal too, except
/// on the server's dispatch loop, which can resynchronize at the next
/// command frame. Remote errors are the one kind that leaves the connection
/// usable -- they're just the other peer's answer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lexical error: {0}")]
    Lexical(#[from] TokenizeError),
    #[error("structural error: {0}")]
    Structural(ItemizeError),
    #[error("marshalling error: {0}")]
    Marshal(#[from] MarshalError),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),
}

impl Error {
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }
}

// `ItemizeError::Tokenize` just wraps whatever `TokenizeError` the tokenizer
// it drives produced; unwrap it back out to `Error::Lexical` here rather
// than letting it read as a structural (parenthesis-nesting) failure.
impl From<ItemizeError> for Error {
    fn from(err: ItemizeError) -> Self {
        match err {
            ItemizeError::Tokenize(inner) => Error::Lexical(inner),
            other => Error::Structural(other),
        }
    }
}
