//! Read/write framing over a reader/writer pair.
//!
//! `Connection` builds its `Itemizer` eagerly in `new` rather than lazily on
//! first read -- a `BufReader` doesn't touch the underlying stream until
//! something is actually read from it, so there's no behavioural
//! difference, and it avoids threading an `Option` through every read path.

use std::io::Write;

use log::debug;
use svnwire_types::{FromItem, Item, RemoteError, ToItem};

use crate::error::Error;
use crate::itemizer::Itemizer;
use crate::response::parse_response;

/// Owns one reader and one writer and speaks the wire protocol's framing
/// over them: one space-terminated `Item` per logical message.
pub struct Connection<R, W> {
    itemizer: Itemizer<R>,
    writer: W,
}

impl<R: std::io::Read, W: Write> Connection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Connection {
            itemizer: Itemizer::new(reader),
            writer,
        }
    }

    /// Serializes `item` and writes it followed by a single trailing space.
    pub fn write_item(&mut self, item: &Item) -> Result<(), Error> {
        item.encode(&mut self.writer)?;
        self.writer.write_all(b" ")?;
        self.writer.flush()?;
        debug!("connection: wrote {item:?}");
        Ok(())
    }

    /// Marshals `value` to an `Item` and writes it.
    pub fn write<T: ToItem>(&mut self, value: &T) -> Result<(), Error> {
        self.write_item(&value.to_item())
    }

    /// Sends `( success params )`.
    pub fn write_success(&mut self, params: Item) -> Result<(), Error> {
        self.write_item(&Item::list(vec![Item::word("success"), params]))
    }

    /// Sends `( name ( params... ) )`, the command-frame shape used by both
    /// client commands and the server's per-command auth preludes.
    pub fn write_command(&mut self, name: &str, params: Item) -> Result<(), Error> {
        self.write_item(&Item::list(vec![Item::word(name), params]))
    }

    /// Sends `( failure ( ( apr_err message file line ) ) )`.
    pub fn write_failure(&mut self, err: &RemoteError) -> Result<(), Error> {
        self.write_item(&Item::list(vec![
            Item::word("failure"),
            Item::list(vec![err.to_item()]),
        ]))
    }

    /// Reads the next item, returning a protocol error if the stream ends
    /// before one arrives (callers that expect a clean end-of-stream, e.g.
    /// the server's dispatch loop, should call [`Connection::try_read_item`]
    /// instead).
    pub fn read_item(&mut self) -> Result<Item, Error> {
        self.try_read_item()?
            .ok_or_else(|| Error::protocol("connection closed before an item arrived"))
    }

    /// Reads the next item, or `Ok(None)` on a clean end-of-stream between
    /// items.
    pub fn try_read_item(&mut self) -> Result<Option<Item>, Error> {
        Ok(self.itemizer.next_item()?)
    }

    /// Reads one item and unmarshals it into `T`.
    pub fn read<T: FromItem>(&mut self) -> Result<T, Error> {
        Ok(T::from_item(&self.read_item()?)?)
    }

    /// Reads one item, parses it as a response, and unmarshals the success
    /// payload into `T`. A `failure` response surfaces as `Err(Error::Remote(_))`.
    pub fn read_response<T: FromItem>(&mut self) -> Result<T, Error> {
        let params = parse_response(&self.read_item()?)?;
        Ok(T::from_item(&params)?)
    }
}
