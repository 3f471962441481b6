mod common;

use std::thread;

use svnwire::{
    ChangedPathEntry, Client, Connection, Depth, Dirent, FileInfo, Handlers, Item, LogEntry,
    NodeKind, PropList, RemoteError, Server, Stat, ToItem, WireString,
};

#[test]
fn get_latest_rev_round_trips() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.get_latest_rev = Some(Box::new(|| Ok(1000)));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    assert_eq!(client.get_latest_rev().unwrap(), 1000);
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn stat_round_trips_full_record_fields() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.stat = Some(Box::new(|path, rev| {
            assert_eq!(path, "");
            assert_eq!(rev, None);
            Ok(Some(Stat {
                kind: NodeKind::Dir,
                size: u64::MAX,
                has_props: false,
                created_rev: 1000,
                created_date: Some("2024-02-23T14:56:05.241020Z".into()),
                last_author: Some("cespedes".into()),
            }))
        }));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    let stat = client.stat("", None).unwrap().unwrap();
    assert_eq!(stat.kind, NodeKind::Dir);
    assert_eq!(stat.size, u64::MAX);
    assert!(!stat.has_props);
    assert_eq!(stat.created_rev, 1000);
    assert_eq!(stat.last_author.unwrap().to_string_lossy(), "cespedes");
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn stat_of_a_missing_path_is_none() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.stat = Some(Box::new(|_path, _rev| Ok(None)));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    assert_eq!(client.stat("does-not-exist", None).unwrap(), None);
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn list_streams_three_dirents_in_order() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.list = Some(Box::new(|path, rev, depth, _fields| {
            assert_eq!(path, "");
            assert_eq!(rev, None);
            assert_eq!(depth, Depth::Immediates);
            Ok(vec![
                Dirent {
                    path: "trunk".into(),
                    kind: NodeKind::Dir,
                    size: 0,
                    has_props: false,
                    created_rev: 1,
                    created_date: None,
                    last_author: None,
                },
                Dirent {
                    path: "branches".into(),
                    kind: NodeKind::Dir,
                    size: 0,
                    has_props: false,
                    created_rev: 1,
                    created_date: None,
                    last_author: None,
                },
                Dirent {
                    path: "tags".into(),
                    kind: NodeKind::Dir,
                    size: 0,
                    has_props: false,
                    created_rev: 1,
                    created_date: None,
                    last_author: None,
                },
            ])
        }));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    let entries = client
        .list(
            "",
            None,
            Depth::Immediates,
            &["kind", "size", "created-rev", "time", "last-author"],
        )
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].path.to_string_lossy(), "trunk");
    assert_eq!(entries[1].path.to_string_lossy(), "branches");
    assert_eq!(entries[2].path.to_string_lossy(), "tags");
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn check_path_distinguishes_dir_and_none() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.check_path = Some(Box::new(|path, _rev| {
            if path == "trunk" {
                Ok(NodeKind::Dir)
            } else {
                Ok(NodeKind::None)
            }
        }));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    assert_eq!(client.check_path("trunk", None).unwrap(), NodeKind::Dir);
    assert_eq!(client.check_path("missing", None).unwrap(), NodeKind::None);
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn handler_error_is_surfaced_and_connection_stays_usable() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.get_latest_rev =
            Some(Box::new(|| Err(RemoteError::generic("backend unavailable"))));
        handlers.stat = Some(Box::new(|_path, _rev| Ok(None)));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    let err = client.get_latest_rev().unwrap_err();
    match err {
        svnwire::Error::Remote(e) => assert_eq!(e.message, "backend unavailable"),
        other => panic!("expected Error::Remote, got {other:?}"),
    }
    // the handler error answered with a failure frame; the connection
    // itself is still good for the next command.
    assert_eq!(client.stat("trunk", None).unwrap(), None);
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn log_round_trips_entries() {
    let (client_end, server_end) = common::duplex_pair();

    let server_thread = thread::spawn(move || {
        let mut handlers = Handlers::default();
        handlers.log = Some(Box::new(|paths, start_rev, end_rev, changed_paths, limit| {
            assert_eq!(paths.to_vec(), vec!["/trunk".to_string()]);
            assert_eq!(start_rev, Some(1));
            assert_eq!(end_rev, Some(1000));
            assert!(changed_paths);
            assert_eq!(limit, None);
            Ok(vec![
                LogEntry {
                    changed: vec![ChangedPathEntry {
                        path: "/trunk/README".into(),
                        mode: "M".into(),
                    }],
                    rev: 1000,
                    author: "cespedes".into(),
                    date: "2024-02-23T14:56:05.241020Z".into(),
                    message: "Update README".into(),
                },
                LogEntry {
                    changed: vec![],
                    rev: 999,
                    author: "cespedes".into(),
                    date: "2024-02-22T09:12:00.000000Z".into(),
                    message: "Initial import".into(),
                },
            ])
        }));
        Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
    });

    let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
    let entries = client
        .log(&["/trunk"], Some(1), Some(1000), true, None)
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].rev, 1000);
    assert_eq!(entries[0].message.to_string_lossy(), "Update README");
    assert_eq!(entries[0].changed.len(), 1);
    assert_eq!(entries[0].changed[0].path.to_string_lossy(), "/trunk/README");
    assert_eq!(entries[0].changed[0].mode.to_string_lossy(), "M");
    assert_eq!(entries[1].rev, 999);
    assert!(entries[1].changed.is_empty());
    client.close().unwrap();
    server_thread.join().unwrap();
}

#[test]
fn get_file_reads_single_and_double_terminator() {
    // Case 1: a real `Server`, which always sends exactly one terminator
    // frame after a file's content.
    {
        let (client_end, server_end) = common::duplex_pair();
        let server_thread = thread::spawn(move || {
            let mut handlers = Handlers::default();
            handlers.get_file = Some(Box::new(|path, rev, want_props, want_contents| {
                assert_eq!(path, "trunk/README");
                assert_eq!(rev, None);
                assert!(want_props);
                assert!(want_contents);
                Ok((
                    FileInfo {
                        checksum: Some("abc123".into()),
                        rev: 1000,
                        props: vec![PropList {
                            name: "svn:mime-type".into(),
                            value: "text/plain".into(),
                        }],
                    },
                    Some(b"hello world".to_vec()),
                ))
            }));
            Server::new(server_end.0, server_end.1, handlers).serve().unwrap();
        });

        let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
        let (props, content) = client.get_file("trunk/README", None, true, true).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name.to_string_lossy(), "svn:mime-type");
        assert_eq!(content.unwrap(), b"hello world");
        client.close().unwrap();
        server_thread.join().unwrap();
    }

    // Case 2: a peer that interleaves one extra, non-response frame before
    // the real terminator -- the bounded retry loop in `Client::get_file`
    // must skip over it instead of either hanging or misreading it as the
    // file's terminator.
    {
        let (client_end, server_end) = common::duplex_pair();
        let server_thread = thread::spawn(move || {
            let mut conn = Connection::new(server_end.0, server_end.1);

            conn.write_success(Item::list(vec![
                2u32.to_item(),
                2u32.to_item(),
                Item::list(vec![]),
                Item::list(vec![]),
            ]))
            .unwrap();
            let _client_greet: Item = conn.read_item().unwrap();
            conn.write_success(Item::list(vec![Item::list(vec![]), WireString::from("").to_item()]))
                .unwrap();
            conn.write_success(
                svnwire::ReposInfo {
                    uuid: "double-terminator-test".into(),
                    url: "svn://repo/".into(),
                    capabilities: vec![],
                }
                .to_item(),
            )
            .unwrap();

            let _get_file_command: Item = conn.read_item().unwrap();
            conn.write_success(Item::list(vec![Item::list(vec![]), WireString::from("").to_item()]))
                .unwrap();
            conn.write_success(
                FileInfo {
                    checksum: None,
                    rev: 7,
                    props: vec![],
                }
                .to_item(),
            )
            .unwrap();
            conn.write_item(&Item::String(b"partial content".to_vec())).unwrap();
            conn.write_item(&Item::String(Vec::new())).unwrap();
            // An extra, non-response frame a stricter peer might send before
            // its real terminator.
            conn.write_item(&Item::word("ping")).unwrap();
            conn.write_success(Item::list(vec![])).unwrap();
        });

        let mut client = Client::from_io(client_end.0, client_end.1, "svn://repo/").unwrap();
        let (_props, content) = client.get_file("trunk/README", None, false, true).unwrap();
        assert_eq!(content.unwrap(), b"partial content");
        client.close().unwrap();
        server_thread.join().unwrap();
    }
}
