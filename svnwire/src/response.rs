//! Classifying a received [`Item`] as a `success` or `failure` response.
//!
//! Validates the outer `( word params:List )` shape here, then leaves
//! interpreting `params` to the caller (the per-command `FromItem` impl),
//! rather than this layer also validating command-specific payload shapes.

use svnwire_types::{list_field, FromItem, Item, RemoteError};

use crate::error::Error;

/// Parses one received item as a response frame.
///
/// On `success`, returns the `params` list verbatim for the caller to
/// unmarshal. On `failure`, returns `Err(Error::Remote(_))` with the
/// four-field error record. Any other shape is a protocol error.
pub fn parse_response(item: &Item) -> Result<Item, Error> {
    let word = list_field(item, 0).map_err(|_| {
        Error::protocol("response item must be a 2-element list ( word params )")
    })?;
    let params = list_field(item, 1).map_err(|_| {
        Error::protocol("response item must be a 2-element list ( word params )")
    })?;

    if !matches!(params, Item::List(_)) {
        return Err(Error::protocol("response params must themselves be a list"));
    }

    match word {
        Item::Word(w) if w == "success" => Ok(params.clone()),
        Item::Word(w) if w == "failure" => {
            let inner = list_field(params, 0)
                .map_err(|_| Error::protocol("failure params must wrap a single error record"))?;
            Err(Error::Remote(RemoteError::from_item(inner)?))
        }
        Item::Word(other) => Err(Error::protocol(format!(
            "response word must be 'success' or 'failure', found {other:?}"
        ))),
        other => Err(Error::protocol(format!(
            "response word must be a Word, found {other:?}"
        ))),
    }
}
