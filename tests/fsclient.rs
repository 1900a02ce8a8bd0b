mod common;

use common::TestServer;
use kmon::error::Error;
use kmon::fs::proto::{OpenMode, RequestTag, ServerErrno, MAXPATHLEN, PGSIZE, WRITE_PAYLOAD_MAX};
use kmon::fs::FileClient;

#[test]
fn test_open_write_read_stat_sync_end_to_end() {
    let server = TestServer::new();
    let mut client = FileClient::new(server.clone());

    let fd = client
        .open("/foo.txt", OpenMode::RDWR.or(OpenMode::CREATE))
        .unwrap();
    assert_eq!(fd, 0);
    assert_eq!(client.write(fd, b"hi").unwrap(), 2);
    client.close(fd).unwrap();

    let fd = client.open("/foo.txt", OpenMode::RDONLY).unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(client.read(fd, &mut buf).unwrap(), 2);
    assert_eq!(&buf[..2], b"hi");

    let stat = client.stat(fd).unwrap();
    assert_eq!(stat.name, "foo.txt");
    assert_eq!(stat.size, 2);
    assert!(!stat.is_dir);

    client.sync().unwrap();
    assert_eq!(server.sync_count(), 1);
}

#[test]
fn test_oversized_write_sends_one_capacity_request() {
    let server = TestServer::new();
    let mut client = FileClient::new(server.clone());

    let fd = client
        .open("/big", OpenMode::RDWR.or(OpenMode::CREATE))
        .unwrap();
    let requests_before = server.request_count();

    let n = WRITE_PAYLOAD_MAX + 100;
    let written = client.write(fd, &vec![0x5a; n]).unwrap();

    assert_eq!(written, WRITE_PAYLOAD_MAX);
    assert!(written <= n && written <= PGSIZE);
    assert_eq!(server.request_count(), requests_before + 1);
    assert_eq!(server.requests().last(), Some(&RequestTag::Write));
    assert_eq!(server.file("/big").unwrap().len(), WRITE_PAYLOAD_MAX);
}

#[test]
fn test_zero_byte_read_returns_zero() {
    let server = TestServer::new().with_file("/motd", b"hello");
    let mut client = FileClient::new(server);

    let fd = client.open("/motd", OpenMode::RDONLY).unwrap();
    let mut buf = [];
    assert_eq!(client.read(fd, &mut buf).unwrap(), 0);
}

#[test]
fn test_read_is_bounded_by_one_page() {
    let server = TestServer::new().with_file("/blob", &vec![7u8; 3 * PGSIZE]);
    let mut client = FileClient::new(server);

    let fd = client.open("/blob", OpenMode::RDONLY).unwrap();
    let mut buf = vec![0u8; 3 * PGSIZE];
    let n = client.read(fd, &mut buf).unwrap();
    assert_eq!(n, PGSIZE);
    assert!(buf[..n].iter().all(|&b| b == 7));
}

#[test]
fn test_sequential_reads_advance_the_file_position() {
    let server = TestServer::new().with_file("/seq", b"abcdef");
    let mut client = FileClient::new(server);

    let fd = client.open("/seq", OpenMode::RDONLY).unwrap();
    let mut buf = [0u8; 3];
    assert_eq!(client.read(fd, &mut buf).unwrap(), 3);
    assert_eq!(&buf, b"abc");
    assert_eq!(client.read(fd, &mut buf).unwrap(), 3);
    assert_eq!(&buf, b"def");
    assert_eq!(client.read(fd, &mut buf).unwrap(), 0);
}

#[test]
fn test_long_path_is_rejected_before_any_request() {
    let server = TestServer::new();
    let mut client = FileClient::new(server.clone());

    let path = format!("/{}", "a".repeat(MAXPATHLEN));
    let err = client.open(&path, OpenMode::RDONLY).unwrap_err();
    assert!(matches!(err, Error::BadPath));
    assert_eq!(server.request_count(), 0);

    // the descriptor table was never touched either
    let fd = client
        .open("/ok", OpenMode::RDWR.or(OpenMode::CREATE))
        .unwrap();
    assert_eq!(fd, 0);
}

#[test]
fn test_server_error_releases_the_descriptor() {
    let server = TestServer::new();
    let mut client = FileClient::new(server.clone());

    let err = client.open("/missing", OpenMode::RDONLY).unwrap_err();
    assert!(matches!(err, Error::Server(ServerErrno::NotFound)));
    assert_eq!(server.requests(), vec![RequestTag::Open]);

    // the slot freed on failure is handed out again
    let fd = client
        .open("/fresh", OpenMode::RDWR.or(OpenMode::CREATE))
        .unwrap();
    assert_eq!(fd, 0);
}

#[test]
fn test_close_flushes_and_invalidates() {
    let server = TestServer::new();
    let mut client = FileClient::new(server.clone());

    let fd = client
        .open("/f", OpenMode::RDWR.or(OpenMode::CREATE))
        .unwrap();
    client.close(fd).unwrap();
    assert!(server.requests().contains(&RequestTag::Flush));

    let mut buf = [0u8; 4];
    assert!(matches!(
        client.read(fd, &mut buf).unwrap_err(),
        Error::BadDescriptor(0)
    ));
}

#[test]
fn test_truncate_changes_the_reported_size() {
    let server = TestServer::new().with_file("/t", b"0123456789");
    let mut client = FileClient::new(server);

    let fd = client.open("/t", OpenMode::RDWR).unwrap();
    client.truncate(fd, 4).unwrap();
    assert_eq!(client.stat(fd).unwrap().size, 4);

    client.truncate(fd, 16).unwrap();
    assert_eq!(client.stat(fd).unwrap().size, 16);
}

#[test]
fn test_descriptor_exhaustion_reports_max_open() {
    let server = TestServer::new();
    let mut client = FileClient::new(server.clone());

    for i in 0..kmon::fs::fd::MAXFD {
        let fd = client
            .open(&format!("/file{i}"), OpenMode::RDWR.or(OpenMode::CREATE))
            .unwrap();
        assert_eq!(fd, i);
    }

    let requests_before = server.request_count();
    let err = client
        .open("/one-too-many", OpenMode::RDWR.or(OpenMode::CREATE))
        .unwrap_err();
    assert!(matches!(err, Error::MaxOpen));
    // exhaustion is detected before the server hears anything
    assert_eq!(server.request_count(), requests_before);
}
