//! The protocol's universal recursive value.

use std::io::{self, Write};

/// A syntactic element of the svnserve wire protocol.
///
/// Every value that crosses the wire — commands, responses, directory
/// entries, log messages — is, at the lowest level, one `Item`. Lists nest
/// arbitrarily; there is no separate "record" wire type, only `List`s whose
/// shape a [`crate::FromItem`] impl agrees to interpret.
///
/// `Item` does not implement `Display`: `String` payloads are opaque byte
/// blobs (they may contain arbitrary bytes, including NUL) and are not
/// guaranteed to be valid UTF-8, so formatting them as text would be lossy
/// or outright wrong. Use [`Item::encode`] to produce the exact wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// An ASCII identifier such as a command name or an enum-like tag
    /// (`dir`, `immediates`, `success`).
    Word(String),
    /// A non-negative integer, as decoded from a decimal digit run.
    Number(u64),
    /// A length-prefixed opaque byte blob.
    String(Vec<u8>),
    /// An ordered, arbitrarily nested sequence of items.
    List(Vec<Item>),
}

impl Item {
    /// Convenience constructor for a [`Item::Word`] from any stringlike value.
    pub fn word(w: impl Into<String>) -> Self {
        Item::Word(w.into())
    }

    /// Convenience constructor for a [`Item::String`] from any byte source.
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Item::String(bytes.into())
    }

    /// Convenience constructor for a [`Item::List`].
    pub fn list(items: impl Into<Vec<Item>>) -> Self {
        Item::List(items.into())
    }

    /// Encodes this item's wire text.
    ///
    /// A bare `Word`/`Number`/`String` encodes to just its own token text,
    /// with no trailing space: the space that must follow every token on
    /// the wire is the *connection's* job to add (see
    /// `svnwire::Connection::write`), except inside a `List`, where each
    /// element (including the last) is followed by a single space before
    /// the closing parenthesis — so nesting a list inside a list produces
    /// the expected `"( outer ( inner ) )"` with no special-casing.
    pub fn encode(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            Item::Word(w) => writer.write_all(w.as_bytes()),
            Item::Number(n) => write!(writer, "{n}"),
            Item::String(bytes) => {
                write!(writer, "{}:", bytes.len())?;
                writer.write_all(bytes)
            }
            Item::List(items) => {
                writer.write_all(b"( ")?;
                for item in items {
                    item.encode(writer)?;
                    writer.write_all(b" ")?;
                }
                writer.write_all(b")")
            }
        }
    }

    /// Encodes this item and returns the resulting bytes.
    ///
    /// Mostly useful for tests and for logging a short trace of what went
    /// over the wire; production code should prefer [`Item::encode`] writing
    /// straight into the connection's writer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out).expect("writing to a Vec is infallible");
        out
    }
}

/// A textual value that must be framed on the wire as a length-prefixed
/// `String` token rather than a `Word`.
///
/// Paths, URLs, commit messages and the like are free-form text that may
/// contain spaces, parentheses or non-ASCII bytes — none of which a `Word`
/// token can carry. [`crate::ToItem`]/[`crate::FromItem`] for `WireString`
/// always go through [`Item::String`], resolving the protocol's
/// dual-representation-of-text ambiguity in favor of the wire-correct
/// choice rather than the bare `String` impl's `Word` choice (see the
/// crate-level discussion in `svnwire`'s design notes).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireString(pub Vec<u8>);

impl WireString {
    /// Borrows the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Renders the bytes as UTF-8, replacing invalid sequences.
    ///
    /// svnserve does not guarantee paths or messages are valid UTF-8; this
    /// is a display convenience, not a protocol guarantee.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for WireString {
    fn from(s: &str) -> Self {
        WireString(s.as_bytes().to_vec())
    }
}

impl From<String> for WireString {
    fn from(s: String) -> Self {
        WireString(s.into_bytes())
    }
}

impl From<Vec<u8>> for WireString {
    fn from(bytes: Vec<u8>) -> Self {
        WireString(bytes)
    }
}
