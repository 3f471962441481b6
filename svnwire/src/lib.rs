//! Client and server for the svnserve wire protocol v2.
//!
//! The protocol layers bottom-up: [`token`] lexes bytes into tokens,
//! [`itemizer`] groups tokens into [`Item`] trees, [`connection`] frames
//! items as whole messages, and [`client`]/[`server`] drive the handshake
//! and command set over a [`connection::Connection`].

pub mod client;
pub mod connection;
pub mod error;
pub mod handshake;
pub mod itemizer;
pub mod response;
pub mod server;
pub mod token;
pub mod transport;

pub use client::Client;
pub use connection::Connection;
pub use error::Error;
pub use server::{ClientGreet, Handlers, Server, DEFAULT_SERVER_UUID};
pub use transport::Transport;

pub use svnwire_types::{
    ChangedPathEntry, Depth, Dirent, FileInfo, FromItem, Item, LogEntry, MarshalError, NodeKind,
    PropList, RemoteError, ReposInfo, Stat, ToItem, WireString,
};
