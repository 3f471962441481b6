//! Data structures shared by svnserve wire protocol clients and servers.
//!
//! This crate holds the protocol's universal value type ([`Item`]), the
//! hand-written marshal/unmarshal traits that map it to and from host
//! records ([`ToItem`]/[`FromItem`]), the record types returned by the
//! read-only commands ([`records`]), and the wire representation of a
//! remote failure ([`RemoteError`]).
//!
//! It carries no I/O: reading bytes off a socket or a child process pipe,
//! and the stateful tokenizer/itemizer that produce [`Item`]s from them,
//! live in the `svnwire` crate.

pub mod error;
pub mod item;
pub mod marshal;
pub mod records;

pub use error::RemoteError;
pub use item::{Item, WireString};
pub use marshal::{list_field, FromItem, MarshalError, ToItem};
pub use records::{
    ChangedPathEntry, Depth, Dirent, FileInfo, LogEntry, NodeKind, PropList, ReposInfo, Stat,
};
