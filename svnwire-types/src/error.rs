//! The wire representation of a failed command (`failure` frames).

use std::fmt;

use crate::item::Item;
use crate::marshal::{list_field, FromItem, MarshalError, ToItem};

/// Generic client error, used whenever a failure isn't a protocol-native
/// [`RemoteError`] (see `svnwire::Connection::write_failure`).
pub const APR_ERR_GENERIC: u32 = 21005;
/// The command name wasn't recognised, or a handler wasn't configured for it.
pub const APR_ERR_UNKNOWN_COMMAND: u32 = 210001;
/// A command's parameters didn't match the expected shape.
pub const APR_ERR_MALFORMED_NETWORK_DATA: u32 = 210004;

/// The four-element error record carried inside a `failure` response frame.
///
/// `RemoteError` is plain wire data, not a wrapper around some other Rust
/// error type — it has a hand-written [`fmt::Display`] rather than a
/// derived one, and marshals as an explicit four-field record rather than
/// an opaque error string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub apr_err: u32,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl RemoteError {
    /// Builds a generic, file-less error with the default APR code.
    pub fn generic(message: impl Into<String>) -> Self {
        RemoteError {
            apr_err: APR_ERR_GENERIC,
            message: message.into(),
            file: String::new(),
            line: 0,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.apr_err, self.message)?;
        if !self.file.is_empty() {
            write!(f, " ({} line {})", self.file, self.line)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

impl ToItem for RemoteError {
    fn to_item(&self) -> Item {
        Item::List(vec![
            self.apr_err.to_item(),
            crate::item::WireString::from(self.message.clone()).to_item(),
            crate::item::WireString::from(self.file.clone()).to_item(),
            self.line.to_item(),
        ])
    }
}

impl FromItem for RemoteError {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(RemoteError {
            apr_err: u32::from_item(list_field(item, 0)?)?,
            message: crate::item::WireString::from_item(list_field(item, 1)?)?.to_string_lossy(),
            file: crate::item::WireString::from_item(list_field(item, 2)?)?.to_string_lossy(),
            line: u32::from_item(list_field(item, 3)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_file_and_line() {
        let err = RemoteError {
            apr_err: 160013,
            message: "File not found".into(),
            file: "file".into(),
            line: 42,
        };
        assert_eq!(err.to_string(), "160013 File not found (file line 42)");
    }

    #[test]
    fn renders_without_file() {
        let err = RemoteError::generic("boom");
        assert_eq!(err.to_string(), "21005 boom");
    }

    #[test]
    fn roundtrips_through_item() {
        let err = RemoteError {
            apr_err: 160013,
            message: "File not found".into(),
            file: "file".into(),
            line: 42,
        };
        assert_eq!(RemoteError::from_item(&err.to_item()).unwrap(), err);
    }
}
