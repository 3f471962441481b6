//! The client half of the protocol: handshake, per-command auth, and the
//! read-only command set.
//!
//! Commands are split across three explicit helpers
//! ([`Client::send_command_scalar`], [`Client::send_command_record`],
//! [`Client::send_command_optional`]) so each command states which framing
//! convention its response uses, rather than relying on one reflective
//! unwrap rule to guess it at runtime (see `marshal.rs` for why this crate
//! hand-writes marshalling instead of reflecting over it).

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, ChildStdout};

use log::{debug, info, warn};
use svnwire_types::{
    list_field, Depth, Dirent, FileInfo, FromItem, Item, LogEntry, NodeKind, PropList, ReposInfo,
    Stat, ToItem, WireString,
};

use crate::connection::Connection;
use crate::error::Error;
use crate::handshake::{
    auth_external_response, AuthRequest, Greeting, CLIENT_CAPABILITIES, CLIENT_ID,
    PROTOCOL_VERSION,
};
use crate::response::parse_response;
use crate::transport;

/// A connected svnserve client: one handshake, then any number of
/// read-only commands over the same connection.
///
/// `R`/`W` are generic so the same command logic runs over a spawned child
/// process's pipes ([`Client::connect`]) or, in tests, an in-memory duplex
/// pipe -- adapted here to two distinct type parameters since a child
/// process's stdin/stdout aren't one shared stream type.
pub struct Client<R, W> {
    conn: Connection<R, W>,
    child: Option<Child>,
    pub info: ReposInfo,
}

impl Client<ChildStdout, ChildStdin> {
    /// Parses `address`, spawns the matching transport (`svnserve -t`
    /// locally for `file://`, or over `ssh` for `svn+ssh://`), and performs
    /// the handshake.
    pub fn connect(address: &str) -> Result<Self, Error> {
        let transport = transport::spawn(address)?;
        let mut conn = Connection::new(transport.reader, transport.writer);
        let info = perform_handshake(&mut conn, &transport.url)?;
        Ok(Client {
            conn,
            child: Some(transport.child),
            info,
        })
    }
}

impl<R: Read, W: Write> Client<R, W> {
    /// Performs the handshake over an already-connected reader/writer pair.
    /// Used directly by tests against an in-memory transport; production
    /// code normally goes through [`Client::connect`].
    pub fn from_io(reader: R, writer: W, url: &str) -> Result<Self, Error> {
        let mut conn = Connection::new(reader, writer);
        let info = perform_handshake(&mut conn, url)?;
        Ok(Client {
            conn,
            child: None,
            info,
        })
    }

    /// Closes the connection and, if this client owns a spawned child
    /// process, waits for it to exit.
    pub fn close(mut self) -> Result<(), Error> {
        drop(self.conn);
        if let Some(mut child) = self.child.take() {
            child.wait()?;
        }
        Ok(())
    }

    /// Sends a `get-latest-rev` command; returns the latest revision number.
    pub fn get_latest_rev(&mut self) -> Result<u32, Error> {
        self.send_command_scalar("get-latest-rev", Item::list(vec![]))
    }

    /// Sends a `stat` command; returns `None` if `path` doesn't exist at
    /// `rev` (or at HEAD, if `rev` is `None`).
    pub fn stat(&mut self, path: &str, rev: Option<u32>) -> Result<Option<Stat>, Error> {
        let params = Item::list(vec![WireString::from(path).to_item(), rev.to_item()]);
        self.send_command_optional("stat", params)
    }

    /// Sends a `check-path` command; returns the node kind at `path`
    /// (`NodeKind::None` if nothing exists there).
    pub fn check_path(&mut self, path: &str, rev: Option<u32>) -> Result<NodeKind, Error> {
        let params = Item::list(vec![WireString::from(path).to_item(), rev.to_item()]);
        self.send_command_scalar("check-path", params)
    }

    /// Sends a `list` command; returns every directory entry under `path`.
    pub fn list(
        &mut self,
        path: &str,
        rev: Option<u32>,
        depth: Depth,
        fields: &[&str],
    ) -> Result<Vec<Dirent>, Error> {
        let fields_item = Item::list(fields.iter().map(|f| Item::word(*f)).collect::<Vec<_>>());
        let params = Item::list(vec![
            WireString::from(path).to_item(),
            rev.to_item(),
            depth.to_item(),
            fields_item,
        ]);
        self.start_streaming_command("list", params)?;

        let mut dirents = Vec::new();
        loop {
            match self.conn.read_item()? {
                Item::Word(w) if w == "done" => break,
                other => dirents.push(Dirent::from_item(&other)?),
            }
        }
        self.finish_streaming_command()?;
        Ok(dirents)
    }

    /// Sends a `get-file` command; returns the file's versioned properties
    /// and, if `want_contents` is set, its content.
    pub fn get_file(
        &mut self,
        path: &str,
        rev: Option<u32>,
        want_props: bool,
        want_contents: bool,
    ) -> Result<(Vec<PropList>, Option<Vec<u8>>), Error> {
        let params = Item::list(vec![
            WireString::from(path).to_item(),
            rev.to_item(),
            want_props.to_item(),
            want_contents.to_item(),
            false.to_item(),
        ]);
        let info: FileInfo = self.send_command_record("get-file", params)?;
        if !want_contents {
            return Ok((info.props, None));
        }

        let mut content = Vec::new();
        loop {
            let chunk: Vec<u8> = self.conn.read()?;
            if chunk.is_empty() {
                break;
            }
            content.extend(chunk);
        }
        // Some servers send one trailing frame after the empty terminator
        // string, others two (an extra empty AUTH_REQUEST-shaped ack before
        // the real terminator). Rather than guess which, read items until
        // one parses as a success/failure response, bounded so a server
        // that never sends one doesn't hang the client forever.
        const MAX_TERMINATOR_PROBES: u32 = 4;
        let mut last_err = None;
        for _ in 0..MAX_TERMINATOR_PROBES {
            match parse_response(&self.conn.read_item()?) {
                Ok(_) => {
                    last_err = None;
                    break;
                }
                Err(err @ Error::Remote(_)) => {
                    last_err = Some(err);
                    break;
                }
                Err(err) => last_err = Some(err),
            }
        }
        if let Some(err) = last_err {
            return Err(err);
        }
        Ok((info.props, Some(content)))
    }

    /// Sends a `log` command; returns every log entry for `paths` between
    /// `start_rev` and `end_rev` (server-defined ordering and defaults
    /// apply when either bound is `None`).
    pub fn log(
        &mut self,
        paths: &[&str],
        start_rev: Option<u32>,
        end_rev: Option<u32>,
        changed_paths: bool,
        limit: Option<u32>,
    ) -> Result<Vec<LogEntry>, Error> {
        let paths_item = Item::list(
            paths
                .iter()
                .map(|p| WireString::from(*p).to_item())
                .collect::<Vec<_>>(),
        );
        let params = Item::list(vec![
            paths_item,
            start_rev.to_item(),
            end_rev.to_item(),
            changed_paths.to_item(),
            false.to_item(),
            limit.to_item(),
            false.to_item(),
            Item::word("all-revprops"),
            Item::list(vec![]),
        ]);
        self.start_streaming_command("log", params)?;

        let mut entries = Vec::new();
        loop {
            match self.conn.read_item()? {
                Item::Word(w) if w == "done" => break,
                other => entries.push(LogEntry::from_item(&other)?),
            }
        }
        self.finish_streaming_command()?;
        Ok(entries)
    }

    /// Issues a command whose success response is a single-element list
    /// wrapping a scalar value (`get-latest-rev`, `check-path`).
    fn send_command_scalar<T: FromItem>(&mut self, name: &str, params: Item) -> Result<T, Error> {
        self.conn.write_command(name, params)?;
        handle_auth(&mut self.conn)?;
        let response_params = parse_response(&self.conn.read_item()?)?;
        let element = list_field(&response_params, 0)
            .map_err(|_| Error::protocol(format!("{name}: expected a one-element response")))?;
        Ok(T::from_item(element)?)
    }

    /// Issues a command whose success response is the destination record's
    /// field list directly, with no extra wrapping (`get-file`'s header).
    fn send_command_record<T: FromItem>(&mut self, name: &str, params: Item) -> Result<T, Error> {
        self.conn.write_command(name, params)?;
        handle_auth(&mut self.conn)?;
        let response_params = parse_response(&self.conn.read_item()?)?;
        Ok(T::from_item(&response_params)?)
    }

    /// Issues a command whose success response is a 0-or-1-element list
    /// wrapping the destination record (`stat`).
    fn send_command_optional<T: FromItem>(
        &mut self,
        name: &str,
        params: Item,
    ) -> Result<Option<T>, Error> {
        self.conn.write_command(name, params)?;
        handle_auth(&mut self.conn)?;
        let response_params = parse_response(&self.conn.read_item()?)?;
        Ok(Option::<T>::from_item(&response_params)?)
    }

    /// Sends a streaming command and consumes its primary success frame,
    /// leaving the connection positioned to read raw record items.
    fn start_streaming_command(&mut self, name: &str, params: Item) -> Result<(), Error> {
        self.conn.write_command(name, params)?;
        handle_auth(&mut self.conn)?;
        parse_response(&self.conn.read_item()?)?;
        Ok(())
    }

    /// Consumes the final success terminator after a streaming command's
    /// records (and its trailing `done`) have all been read.
    fn finish_streaming_command(&mut self) -> Result<(), Error> {
        parse_response(&self.conn.read_item()?)?;
        Ok(())
    }
}

fn perform_handshake<R: Read, W: Write>(
    conn: &mut Connection<R, W>,
    url: &str,
) -> Result<ReposInfo, Error> {
    let greeting: Greeting = conn.read_response()?;
    debug!(
        "client: greeted with versions {}..{}",
        greeting.min_ver, greeting.max_ver
    );
    if greeting.min_ver > PROTOCOL_VERSION || greeting.max_ver < PROTOCOL_VERSION {
        return Err(Error::protocol(format!(
            "server supports versions {}..{}, this client only speaks version {PROTOCOL_VERSION}",
            greeting.min_ver, greeting.max_ver
        )));
    }

    conn.write_item(&Item::list(vec![
        PROTOCOL_VERSION.to_item(),
        Item::list(
            CLIENT_CAPABILITIES
                .iter()
                .map(|c| Item::word(*c))
                .collect::<Vec<_>>(),
        ),
        WireString::from(url).to_item(),
        WireString::from(CLIENT_ID).to_item(),
        Item::list(vec![]),
    ]))?;

    handle_auth(conn)?;

    let info: ReposInfo = conn.read_response()?;
    info!("client: connected to {}", info.uuid.to_string_lossy());
    Ok(info)
}

fn handle_auth<R: Read, W: Write>(conn: &mut Connection<R, W>) -> Result<(), Error> {
    let auth: AuthRequest = conn.read_response()?;
    if auth.mechanisms.is_empty() {
        return Ok(());
    }
    warn!("server requested authentication mechanisms: {:?}", auth.mechanisms);
    conn.write_item(&auth_external_response())?;
    let _: Item = conn.read_response()?;
    Ok(())
}
