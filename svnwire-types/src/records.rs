//! Record types returned by the read-only commands.
//!
//! Each type here hand-implements [`ToItem`]/[`FromItem`] against its own
//! fixed field order, matching the wire shapes of the protocol's data
//! model (`Stat`, `Dirent`, `LogEntry`, `ReposInfo`, ...). None of these are
//! ever sent by the client in this crate's scope — they're all
//! server-to-client payloads — but `ToItem` is kept symmetric so a server
//! implementation (see `svnwire::server`) can hand one back out.

use crate::item::{Item, WireString};
use crate::marshal::{list_field, FromItem, MarshalError, ToItem};

/// The node kind reported by `stat`, `check-path`, and `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Dir,
    File,
    /// No node exists at the given path and revision.
    None,
    Unknown,
}

impl ToItem for NodeKind {
    fn to_item(&self) -> Item {
        let word = match self {
            NodeKind::Dir => "dir",
            NodeKind::File => "file",
            NodeKind::None => "none",
            NodeKind::Unknown => "unknown",
        };
        Item::word(word)
    }
}

impl FromItem for NodeKind {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        match item {
            Item::Word(w) => match w.as_str() {
                "dir" => Ok(NodeKind::Dir),
                "file" => Ok(NodeKind::File),
                "none" => Ok(NodeKind::None),
                "unknown" => Ok(NodeKind::Unknown),
                other => Err(MarshalError::Custom(format!(
                    "unrecognised node kind word {other:?}"
                ))),
            },
            other => Err(MarshalError::TypeMismatch {
                expected: "NodeKind (Word)",
                found: match other {
                    Item::Word(_) => "Word",
                    Item::Number(_) => "Number",
                    Item::String(_) => "String",
                    Item::List(_) => "List",
                },
            }),
        }
    }
}

/// Traversal depth for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Empty,
    Files,
    Immediates,
    Infinity,
}

impl ToItem for Depth {
    fn to_item(&self) -> Item {
        let word = match self {
            Depth::Empty => "empty",
            Depth::Files => "files",
            Depth::Immediates => "immediates",
            Depth::Infinity => "infinity",
        };
        Item::word(word)
    }
}

impl FromItem for Depth {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        match item {
            Item::Word(w) => match w.as_str() {
                "empty" => Ok(Depth::Empty),
                "files" => Ok(Depth::Files),
                "immediates" => Ok(Depth::Immediates),
                "infinity" => Ok(Depth::Infinity),
                other => Err(MarshalError::Custom(format!(
                    "unrecognised depth word {other:?}"
                ))),
            },
            other => Err(MarshalError::TypeMismatch {
                expected: "Depth (Word)",
                found: match other {
                    Item::Word(_) => "Word",
                    Item::Number(_) => "Number",
                    Item::String(_) => "String",
                    Item::List(_) => "List",
                },
            }),
        }
    }
}

/// `{ uuid, url, capabilities }`, read once during the handshake and
/// immutable for the rest of the connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReposInfo {
    pub uuid: WireString,
    pub url: WireString,
    pub capabilities: Vec<String>,
}

impl FromItem for ReposInfo {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(ReposInfo {
            uuid: WireString::from_item(list_field(item, 0)?)?,
            url: WireString::from_item(list_field(item, 1)?)?,
            capabilities: Vec::<String>::from_item(list_field(item, 2)?)?,
        })
    }
}

impl ToItem for ReposInfo {
    fn to_item(&self) -> Item {
        Item::List(vec![
            self.uuid.to_item(),
            self.url.to_item(),
            self.capabilities.to_item(),
        ])
    }
}

/// Response of the `stat` command: the status of a path in a revision.
///
/// `created_date` and `last_author` are themselves optional on the wire
/// (revision properties can be absent), hence `Option<WireString>` rather
/// than a bare `WireString`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub kind: NodeKind,
    pub size: u64,
    pub has_props: bool,
    pub created_rev: u32,
    pub created_date: Option<WireString>,
    pub last_author: Option<WireString>,
}

impl FromItem for Stat {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(Stat {
            kind: NodeKind::from_item(list_field(item, 0)?)?,
            size: u64::from_item(list_field(item, 1)?)?,
            has_props: bool::from_item(list_field(item, 2)?)?,
            created_rev: u32::from_item(list_field(item, 3)?)?,
            created_date: Option::<WireString>::from_item(list_field(item, 4)?)?,
            last_author: Option::<WireString>::from_item(list_field(item, 5)?)?,
        })
    }
}

impl ToItem for Stat {
    fn to_item(&self) -> Item {
        Item::List(vec![
            self.kind.to_item(),
            self.size.to_item(),
            self.has_props.to_item(),
            self.created_rev.to_item(),
            self.created_date.to_item(),
            self.last_author.to_item(),
        ])
    }
}

/// One entry streamed back by the `list` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirent {
    pub path: WireString,
    pub kind: NodeKind,
    pub size: u64,
    pub has_props: bool,
    pub created_rev: u32,
    pub created_date: Option<WireString>,
    pub last_author: Option<WireString>,
}

impl FromItem for Dirent {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(Dirent {
            path: WireString::from_item(list_field(item, 0)?)?,
            kind: NodeKind::from_item(list_field(item, 1)?)?,
            size: u64::from_item(list_field(item, 2)?)?,
            has_props: bool::from_item(list_field(item, 3)?)?,
            created_rev: u32::from_item(list_field(item, 4)?)?,
            created_date: Option::<WireString>::from_item(list_field(item, 5)?)?,
            last_author: Option::<WireString>::from_item(list_field(item, 6)?)?,
        })
    }
}

impl ToItem for Dirent {
    fn to_item(&self) -> Item {
        Item::List(vec![
            self.path.to_item(),
            self.kind.to_item(),
            self.size.to_item(),
            self.has_props.to_item(),
            self.created_rev.to_item(),
            self.created_date.to_item(),
            self.last_author.to_item(),
        ])
    }
}

/// One versioned property, as returned alongside `get-file`/`stat` content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropList {
    pub name: WireString,
    pub value: WireString,
}

impl FromItem for PropList {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(PropList {
            name: WireString::from_item(list_field(item, 0)?)?,
            value: WireString::from_item(list_field(item, 1)?)?,
        })
    }
}

impl ToItem for PropList {
    fn to_item(&self) -> Item {
        Item::List(vec![self.name.to_item(), self.value.to_item()])
    }
}

/// Header returned by `get-file` before any streamed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub checksum: Option<WireString>,
    pub rev: u32,
    pub props: Vec<PropList>,
}

impl FromItem for FileInfo {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(FileInfo {
            checksum: Option::<WireString>::from_item(list_field(item, 0)?)?,
            rev: u32::from_item(list_field(item, 1)?)?,
            props: Vec::<PropList>::from_item(list_field(item, 2)?)?,
        })
    }
}

impl ToItem for FileInfo {
    fn to_item(&self) -> Item {
        Item::List(vec![
            self.checksum.to_item(),
            self.rev.to_item(),
            self.props.to_item(),
        ])
    }
}

/// A single changed path entry inside a [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPathEntry {
    pub path: WireString,
    /// Single-letter change code (`A`dded, `M`odified, `D`eleted, `R`eplaced).
    pub mode: WireString,
}

impl FromItem for ChangedPathEntry {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(ChangedPathEntry {
            path: WireString::from_item(list_field(item, 0)?)?,
            mode: WireString::from_item(list_field(item, 1)?)?,
        })
    }
}

impl ToItem for ChangedPathEntry {
    fn to_item(&self) -> Item {
        Item::List(vec![self.path.to_item(), self.mode.to_item()])
    }
}

/// One entry streamed back by the `log` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub changed: Vec<ChangedPathEntry>,
    pub rev: u32,
    pub author: WireString,
    pub date: WireString,
    pub message: WireString,
}

impl FromItem for LogEntry {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(LogEntry {
            changed: Vec::<ChangedPathEntry>::from_item(list_field(item, 0)?)?,
            rev: u32::from_item(list_field(item, 1)?)?,
            author: WireString::from_item(list_field(item, 2)?)?,
            date: WireString::from_item(list_field(item, 3)?)?,
            message: WireString::from_item(list_field(item, 4)?)?,
        })
    }
}

impl ToItem for LogEntry {
    fn to_item(&self) -> Item {
        Item::List(vec![
            self.changed.to_item(),
            self.rev.to_item(),
            self.author.to_item(),
            self.date.to_item(),
            self.message.to_item(),
        ])
    }
}
