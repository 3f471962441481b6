//! The server half of the protocol: handshake and command dispatch.
//!
//! A server is configured with one optional handler per supported command;
//! an absent handler answers with `failure(210001, ...)` rather than
//! panicking, so a server built on this crate can support a subset of
//! commands (a read-only mirror, say, with no `log` handler) without extra
//! plumbing.

use std::io::{Read, Write};

use log::{debug, warn};
use svnwire_types::{
    list_field, Depth, Dirent, FileInfo, FromItem, Item, LogEntry, MarshalError, NodeKind,
    ReposInfo, Stat,
};
use svnwire_types::error::{APR_ERR_MALFORMED_NETWORK_DATA, APR_ERR_UNKNOWN_COMMAND};
use svnwire_types::{RemoteError, ToItem, WireString};

use crate::connection::Connection;
use crate::error::Error;
use crate::handshake::{PROTOCOL_VERSION, SERVER_CAPABILITIES};

/// The fabricated repository identity used when no [`Handlers::greet`] is
/// configured. A real server almost always wants to supply its own UUID.
pub const DEFAULT_SERVER_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// The client's `CLIENT_GREET` item, decoded down to what a handler needs:
/// `( version (caps…) url:String client-id:String ( ) )`.
pub struct ClientGreet {
    pub version: u32,
    pub url: String,
    pub client_id: String,
}

impl FromItem for ClientGreet {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        Ok(ClientGreet {
            version: u32::from_item(list_field(item, 0)?)?,
            url: WireString::from_item(list_field(item, 2)?)?.to_string_lossy(),
            client_id: WireString::from_item(list_field(item, 3)?)?.to_string_lossy(),
        })
    }
}

struct CommandFrame {
    name: String,
    params: Item,
}

impl FromItem for CommandFrame {
    fn from_item(item: &Item) -> Result<Self, MarshalError> {
        let params = list_field(item, 1)?;
        if !matches!(params, Item::List(_)) {
            return Err(MarshalError::Custom(
                "command params must be a list".into(),
            ));
        }
        Ok(CommandFrame {
            name: String::from_item(list_field(item, 0)?)?,
            params: params.clone(),
        })
    }
}

type GreetHandler = Box<dyn FnMut(&ClientGreet) -> Result<ReposInfo, RemoteError> + Send>;
type GetLatestRevHandler = Box<dyn FnMut() -> Result<u32, RemoteError> + Send>;
type StatHandler = Box<dyn FnMut(&str, Option<u32>) -> Result<Option<Stat>, RemoteError> + Send>;
type CheckPathHandler = Box<dyn FnMut(&str, Option<u32>) -> Result<NodeKind, RemoteError> + Send>;
type ListHandler =
    Box<dyn FnMut(&str, Option<u32>, Depth, &[String]) -> Result<Vec<Dirent>, RemoteError> + Send>;
type GetFileHandler = Box<
    dyn FnMut(&str, Option<u32>, bool, bool) -> Result<(FileInfo, Option<Vec<u8>>), RemoteError>
        + Send,
>;
type LogHandler = Box<
    dyn FnMut(&[String], Option<u32>, Option<u32>, bool, Option<u32>) -> Result<Vec<LogEntry>, RemoteError>
        + Send,
>;

/// One optional callback per supported command. Every field left `None`
/// answers its command with `failure(210001, "Command '<name>' unimplemented")`.
#[derive(Default)]
pub struct Handlers {
    pub greet: Option<GreetHandler>,
    pub get_latest_rev: Option<GetLatestRevHandler>,
    pub stat: Option<StatHandler>,
    pub check_path: Option<CheckPathHandler>,
    pub list: Option<ListHandler>,
    pub get_file: Option<GetFileHandler>,
    pub log: Option<LogHandler>,
}

/// A connected svnserve server: one handshake, then a dispatch loop that
/// reads commands until the client disconnects.
pub struct Server<R, W> {
    conn: Connection<R, W>,
    handlers: Handlers,
}

impl<R: Read, W: Write> Server<R, W> {
    pub fn new(reader: R, writer: W, handlers: Handlers) -> Self {
        Server {
            conn: Connection::new(reader, writer),
            handlers,
        }
    }

    /// Runs the handshake, then dispatches commands until the client closes
    /// the connection. Only transport/lexical errors are fatal; a malformed
    /// command or a handler error answers with a `failure` frame and the
    /// loop continues.
    pub fn serve(mut self) -> Result<(), Error> {
        self.handshake()?;
        loop {
            let item = match self.conn.try_read_item()? {
                Some(item) => item,
                None => return Ok(()),
            };
            let command = match CommandFrame::from_item(&item) {
                Ok(command) => command,
                Err(_) => {
                    self.conn.write_failure(&RemoteError {
                        apr_err: APR_ERR_MALFORMED_NETWORK_DATA,
                        message: "Malformed network data".into(),
                        file: String::new(),
                        line: 0,
                    })?;
                    continue;
                }
            };
            self.dispatch(&command)?;
        }
    }

    fn handshake(&mut self) -> Result<(), Error> {
        self.conn.write_success(Item::list(vec![
            PROTOCOL_VERSION.to_item(),
            PROTOCOL_VERSION.to_item(),
            Item::list(vec![]),
            Item::list(
                SERVER_CAPABILITIES
                    .iter()
                    .map(|c| Item::word(*c))
                    .collect::<Vec<_>>(),
            ),
        ]))?;

        let greet: ClientGreet = self.conn.read()?;
        debug!(
            "server: client greeted with url={:?} client-id={:?}",
            greet.url, greet.client_id
        );

        let repos_info = match &mut self.handlers.greet {
            Some(handler) => match handler(&greet) {
                Ok(info) => info,
                Err(err) => {
                    self.conn.write_failure(&err)?;
                    return Err(Error::Remote(err));
                }
            },
            None => ReposInfo {
                uuid: WireString::from(DEFAULT_SERVER_UUID),
                url: WireString::from(greet.url.clone()),
                capabilities: Vec::new(),
            },
        };

        self.conn.write_success(Item::list(vec![
            Item::list(vec![Item::word("ANONYMOUS"), Item::word("EXTERNAL")]),
            WireString::from(DEFAULT_SERVER_UUID).to_item(),
        ]))?;

        let _: Item = self.conn.read()?;
        self.conn.write_success(Item::list(vec![]))?;

        self.conn.write_success(repos_info.to_item())
    }

    fn dispatch(&mut self, command: &CommandFrame) -> Result<(), Error> {
        match command.name.as_str() {
            "get-latest-rev" => self.handle_get_latest_rev(),
            "stat" => self.handle_stat(&command.params),
            "check-path" => self.handle_check_path(&command.params),
            "list" => self.handle_list(&command.params),
            "get-file" => self.handle_get_file(&command.params),
            "log" => self.handle_log(&command.params),
            other => {
                warn!("server: unknown command {other:?}");
                self.conn.write_failure(&RemoteError {
                    apr_err: APR_ERR_UNKNOWN_COMMAND,
                    message: format!("Unknown command '{other}'"),
                    file: String::new(),
                    line: 0,
                })
            }
        }
    }

    fn unimplemented(&mut self, name: &str) -> Result<(), Error> {
        self.conn.write_failure(&RemoteError {
            apr_err: APR_ERR_UNKNOWN_COMMAND,
            message: format!("Command '{name}' unimplemented"),
            file: String::new(),
            line: 0,
        })
    }

    fn malformed_params(&mut self) -> Result<(), Error> {
        self.conn.write_failure(&RemoteError {
            apr_err: APR_ERR_MALFORMED_NETWORK_DATA,
            message: "Malformed network data".into(),
            file: String::new(),
            line: 0,
        })
    }

    /// Sends the per-command empty `AUTH_REQUEST`, as every successful
    /// command response is preceded by one (an artifact of svnserve's
    /// per-command auth round, which this crate's read-only commands never
    /// actually need a mechanism for).
    fn emit_auth_prelude(&mut self) -> Result<(), Error> {
        self.conn.write_success(Item::list(vec![
            Item::list(vec![]),
            WireString::from("").to_item(),
        ]))
    }

    fn handle_get_latest_rev(&mut self) -> Result<(), Error> {
        let result = match &mut self.handlers.get_latest_rev {
            Some(handler) => handler(),
            None => return self.unimplemented("get-latest-rev"),
        };
        match result {
            Ok(rev) => {
                self.emit_auth_prelude()?;
                self.conn.write_success(Item::list(vec![rev.to_item()]))
            }
            Err(err) => self.conn.write_failure(&err),
        }
    }

    fn handle_stat(&mut self, params: &Item) -> Result<(), Error> {
        let (path, rev) = match decode_path_rev(params) {
            Ok(v) => v,
            Err(_) => return self.malformed_params(),
        };
        let result = match &mut self.handlers.stat {
            Some(handler) => handler(&path, rev),
            None => return self.unimplemented("stat"),
        };
        match result {
            Ok(stat) => {
                self.emit_auth_prelude()?;
                self.conn.write_success(stat.to_item())
            }
            Err(err) => self.conn.write_failure(&err),
        }
    }

    fn handle_check_path(&mut self, params: &Item) -> Result<(), Error> {
        let (path, rev) = match decode_path_rev(params) {
            Ok(v) => v,
            Err(_) => return self.malformed_params(),
        };
        let result = match &mut self.handlers.check_path {
            Some(handler) => handler(&path, rev),
            None => return self.unimplemented("check-path"),
        };
        match result {
            Ok(kind) => {
                self.emit_auth_prelude()?;
                self.conn.write_success(Item::list(vec![kind.to_item()]))
            }
            Err(err) => self.conn.write_failure(&err),
        }
    }

    fn handle_list(&mut self, params: &Item) -> Result<(), Error> {
        let decoded = decode_list_params(params);
        let (path, rev, depth, fields) = match decoded {
            Ok(v) => v,
            Err(_) => return self.malformed_params(),
        };
        let result = match &mut self.handlers.list {
            Some(handler) => handler(&path, rev, depth, &fields),
            None => return self.unimplemented("list"),
        };
        match result {
            Ok(dirents) => {
                self.emit_auth_prelude()?;
                self.conn.write_success(Item::list(vec![]))?;
                for dirent in &dirents {
                    self.conn.write_item(&dirent.to_item())?;
                }
                self.conn.write_item(&Item::word("done"))?;
                self.conn.write_success(Item::list(vec![]))
            }
            Err(err) => self.conn.write_failure(&err),
        }
    }

    fn handle_get_file(&mut self, params: &Item) -> Result<(), Error> {
        let decoded = decode_get_file_params(params);
        let (path, rev, want_props, want_contents) = match decoded {
            Ok(v) => v,
            Err(_) => return self.malformed_params(),
        };
        let result = match &mut self.handlers.get_file {
            Some(handler) => handler(&path, rev, want_props, want_contents),
            None => return self.unimplemented("get-file"),
        };
        match result {
            Ok((info, content)) => {
                self.emit_auth_prelude()?;
                self.conn.write_success(info.to_item())?;
                if let Some(bytes) = content {
                    self.conn.write_item(&Item::String(bytes))?;
                    self.conn.write_item(&Item::String(Vec::new()))?;
                    self.conn.write_success(Item::list(vec![]))?;
                }
                Ok(())
            }
            Err(err) => self.conn.write_failure(&err),
        }
    }

    fn handle_log(&mut self, params: &Item) -> Result<(), Error> {
        let decoded = decode_log_params(params);
        let (paths, start_rev, end_rev, changed_paths, limit) = match decoded {
            Ok(v) => v,
            Err(_) => return self.malformed_params(),
        };
        let result = match &mut self.handlers.log {
            Some(handler) => handler(&paths, start_rev, end_rev, changed_paths, limit),
            None => return self.unimplemented("log"),
        };
        match result {
            Ok(entries) => {
                self.emit_auth_prelude()?;
                self.conn.write_success(Item::list(vec![]))?;
                for entry in &entries {
                    self.conn.write_item(&entry.to_item())?;
                }
                self.conn.write_item(&Item::word("done"))?;
                self.conn.write_success(Item::list(vec![]))
            }
            Err(err) => self.conn.write_failure(&err),
        }
    }
}

fn decode_path_rev(params: &Item) -> Result<(String, Option<u32>), MarshalError> {
    let path = WireString::from_item(list_field(params, 0)?)?.to_string_lossy();
    let rev = Option::<u32>::from_item(list_field(params, 1)?)?;
    Ok((path, rev))
}

fn decode_list_params(params: &Item) -> Result<(String, Option<u32>, Depth, Vec<String>), MarshalError> {
    let path = WireString::from_item(list_field(params, 0)?)?.to_string_lossy();
    let rev = Option::<u32>::from_item(list_field(params, 1)?)?;
    let depth = Depth::from_item(list_field(params, 2)?)?;
    let fields = Vec::<String>::from_item(list_field(params, 3)?)?;
    Ok((path, rev, depth, fields))
}

fn decode_get_file_params(params: &Item) -> Result<(String, Option<u32>, bool, bool), MarshalError> {
    let path = WireString::from_item(list_field(params, 0)?)?.to_string_lossy();
    let rev = Option::<u32>::from_item(list_field(params, 1)?)?;
    let want_props = bool::from_item(list_field(params, 2)?)?;
    let want_contents = bool::from_item(list_field(params, 3)?)?;
    Ok((path, rev, want_props, want_contents))
}

fn decode_log_params(
    params: &Item,
) -> Result<(Vec<String>, Option<u32>, Option<u32>, bool, Option<u32>), MarshalError> {
    let paths = Vec::<String>::from_item(list_field(params, 0)?)?;
    let start_rev = Option::<u32>::from_item(list_field(params, 1)?)?;
    let end_rev = Option::<u32>::from_item(list_field(params, 2)?)?;
    let changed_paths = bool::from_item(list_field(params, 3)?)?;
    let limit = Option::<u32>::from_item(list_field(params, 5)?)?;
    Ok((paths, start_rev, end_rev, changed_paths, limit))
}
