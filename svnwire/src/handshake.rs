//! Constants and small wire records shared by the client and server
//! handshake state machines.

use svnwire_types::{list_field, FromItem, Item, MarshalError, ToItem, WireString};

pub(crate) const PROTOCOL_VERSION: u32 = 2;

/// The capability this crate's client advertises. A full svnserve client
/// could add `svndiff1`/`depth`/etc., but nothing downstream of the
/// read-only command set needs them.
pub(crate) const CLIENT_CAPABILITIES: &[&str] = &["edit-pipeline"];

/// The capability set a server built on this crate advertises.
pub(crate) const SERVER_CAPABILITIES: &[&str] = &[
    "edit-pipeline",
    "svndiff1",
    "accepts-svndiff2",
    "absent-entries",
    "commit-revprops",
    "depth",
    "log-revprops",
    "atomic-revprops",
    "partial-replay",
    "inherited-props",
    "ephemeral-txnprops",
    "file-revs-reverse",
    "list",
];

pub(crate) const CLIENT_ID: &str = "svnwire/0.1.0";

/// The server's answer to `CLIENT_GREET`: `( (mechs…) realm:String )`.
/// An empty `mechanisms` list means the server requires no authentication.
pub(crate) struct AuthRequest {
    pub mechanisms: Vec<String>,
}

impl FromItem for AuthRequest {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(AuthRequest {
            mechanisms: Vec::<String>::from_item(list_field(item, 0)?)?,
        })
    }
}

/// The server's greeting: `( MinVer MaxVer (mechs…) (capabilities…) )`.
pub(crate) struct Greeting {
    pub min_ver: u32,
    pub max_ver: u32,
    pub capabilities: Vec<String>,
}

impl FromItem for Greeting {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(Greeting {
            min_ver: u32::from_item(list_field(item, 0)?)?,
            max_ver: u32::from_item(list_field(item, 1)?)?,
            capabilities: Vec::<String>::from_item(list_field(item, 3)?)?,
        })
    }
}

/// Builds the `AUTH_EXTERNAL` response: `( EXTERNAL ( empty-string ) )`.
pub(crate) fn auth_external_response() -> Item {
    Item::list(vec![
        Item::word("EXTERNAL"),
        Item::list(vec![WireString::from("").to_item()]),
    ])
}
