//! Drives a raw `Connection` instead of a `Client` so the tests can send
//! frames no `Client` method would ever construct on purpose (an unknown
//! command name, a structurally malformed params list).

mod common;

use std::thread;

use svnwire::{response, Connection, Error, FromItem, Handlers, Item, Server};

use common::{PipeReader, PipeWriter};

fn drive_handshake(conn: &mut Connection<PipeReader, PipeWriter>) {
    let _greeting: Item = conn.read_response().unwrap();
    conn.write_item(&Item::list(vec![
        Item::Number(2),
        Item::list(vec![Item::word("edit-pipeline")]),
        Item::string(*b"svn://repo/"),
        Item::string(*b"svnwire-tests/0.0.0"),
        Item::list(vec![]),
    ]))
    .unwrap();

    let auth: Item = conn.read_response().unwrap();
    let mechs = svnwire_types::list_field(&auth, 0).unwrap();
    let mechs_nonempty = matches!(mechs, Item::List(items) if !items.is_empty());
    if mechs_nonempty {
        conn.write_item(&Item::list(vec![
            Item::word("EXTERNAL"),
            Item::list(vec![Item::string(Vec::new())]),
        ]))
        .unwrap();
        let _ack: Item = conn.read_response().unwrap();
    }

    let _repos_info: Item = conn.read_response().unwrap();
}

#[test]
fn unknown_command_surfaces_210001() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        Server::new(server_end.0, server_end.1, Handlers::default())
            .serve()
            .unwrap();
    });

    let mut conn = Connection::new(client_end.0, client_end.1);
    drive_handshake(&mut conn);

    conn.write_item(&Item::list(vec![Item::word("xyz"), Item::list(vec![])]))
        .unwrap();
    let response_item = conn.read_item().unwrap();
    let err = response::parse_response(&response_item).unwrap_err();
    match err {
        Error::Remote(e) => {
            assert_eq!(e.apr_err, 210001);
            assert!(e.message.contains("xyz"));
        }
        other => panic!("expected Error::Remote, got {other:?}"),
    }

    drop(conn);
    server_thread.join().unwrap();
}

#[test]
fn malformed_command_surfaces_210004_and_connection_continues() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.get_latest_rev = Some(Box::new(|| Ok(1000)));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut conn = Connection::new(client_end.0, client_end.1);
    drive_handshake(&mut conn);

    // "get-latest-rev" with a Number where a params list belongs.
    conn.write_item(&Item::list(vec![Item::word("get-latest-rev"), Item::Number(42)]))
        .unwrap();
    let response_item = conn.read_item().unwrap();
    let err = response::parse_response(&response_item).unwrap_err();
    match err {
        Error::Remote(e) => assert_eq!(e.apr_err, 210004),
        other => panic!("expected Error::Remote, got {other:?}"),
    }

    // the dispatch loop kept running: the next, well-formed command succeeds.
    conn.write_item(&Item::list(vec![
        Item::word("get-latest-rev"),
        Item::list(vec![]),
    ]))
    .unwrap();
    let _auth_prelude: Item = conn.read_response().unwrap();
    let result: Item = conn.read_response().unwrap();
    let rev = u32::from_item(svnwire_types::list_field(&result, 0).unwrap()).unwrap();
    assert_eq!(rev, 1000);

    drop(conn);
    server_thread.join().unwrap();
}
