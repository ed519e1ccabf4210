//! End-to-end tests of one connection over an in-memory stream.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use filegate::config::Config;
use filegate::http::connection::{Connection, Outcome};
use filegate::http::error::ServeError;
use filegate::http::response::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

fn config_for(root: &Path) -> Arc<Config> {
    let mut cfg = Config::default();
    cfg.static_files.root = root.to_path_buf();
    Arc::new(cfg)
}

fn spawn_connection(cfg: Arc<Config>) -> (DuplexStream, JoinHandle<Result<Outcome, ServeError>>) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(async move {
        let mut conn = Connection::new(server, cfg);
        conn.run().await
    });
    (client, handle)
}

async fn exchange(root: &Path, request: &[u8]) -> (Outcome, Vec<u8>) {
    let (mut client, handle) = spawn_connection(config_for(root));

    client.write_all(request).await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    let outcome = handle.await.unwrap().unwrap();
    (outcome, response)
}

fn split_head(response: &[u8]) -> (&[u8], &[u8]) {
    let end = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    (&response[..end + 4], &response[end + 4..])
}

#[tokio::test]
async fn test_serves_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let body = b"<h1>Hello!</h1>\r\n";
    std::fs::write(dir.path().join("index.html"), body).unwrap();

    let (outcome, response) = exchange(dir.path(), b"GET /index.html HTTP/1.1\r\n\r\n").await;

    let mut expected =
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 17\r\n\r\n".to_vec();
    expected.extend_from_slice(body);
    assert_eq!(response, expected);
    assert_eq!(outcome, Outcome::Served { bytes: 17 });
}

#[tokio::test]
async fn test_serves_every_supported_type() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("a.jpg", "image/jpeg"),
        ("b.jpeg", "image/jpeg"),
        ("c.gif", "image/gif"),
        ("d.html", "text/html"),
    ];

    for (i, (name, mime)) in cases.iter().enumerate() {
        let content: Vec<u8> = (0..(100 + i * 5000)).map(|b| (b % 256) as u8).collect();
        std::fs::write(dir.path().join(name), &content).unwrap();

        let request = format!("GET /{} HTTP/1.1\r\nHost: localhost\r\n\r\n", name);
        let (outcome, response) = exchange(dir.path(), request.as_bytes()).await;
        let (head, body) = split_head(&response);

        let expected_head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            mime,
            content.len()
        );
        assert_eq!(head, expected_head.as_bytes());
        assert_eq!(body, &content[..]);
        assert_eq!(
            outcome,
            Outcome::Served {
                bytes: content.len() as u64
            }
        );
    }
}

#[tokio::test]
async fn test_malformed_version_is_still_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), b"ok").unwrap();

    let (outcome, response) = exchange(dir.path(), b"GET /index.html HTTP/1.\xff\r\n\r\n").await;

    assert_eq!(
        response,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 2\r\n\r\nok"
    );
    assert_eq!(outcome, Outcome::Served { bytes: 2 });
}

#[tokio::test]
async fn test_non_breaking_space_stays_in_target() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a\u{a0}b.html"), b"nbsp").unwrap();

    let (outcome, response) =
        exchange(dir.path(), "GET /a\u{a0}b.html HTTP/1.1\r\n\r\n".as_bytes()).await;

    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with(b"\r\n\r\nnbsp"));
    assert_eq!(outcome, Outcome::Served { bytes: 4 });
}

// Linux filesystems accept arbitrary bytes in names
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_serves_non_utf8_filename() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.html")), b"latin1").unwrap();

    let (outcome, response) = exchange(dir.path(), b"GET /caf\xe9.html HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"));
    assert!(response.ends_with(b"\r\n\r\nlatin1"));
    assert_eq!(outcome, Outcome::Served { bytes: 6 });
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let dir = tempfile::tempdir().unwrap();

    let (outcome, response) = exchange(dir.path(), b"GET /missing.gif HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 404 Not Found\r\n");
    assert_eq!(outcome, Outcome::Rejected(StatusCode::NotFound));
}

#[tokio::test]
async fn test_no_extension_is_400_even_if_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme"), b"plain").unwrap();

    let (outcome, response) = exchange(dir.path(), b"GET /readme HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");
    assert_eq!(outcome, Outcome::Rejected(StatusCode::BadRequest));
}

#[tokio::test]
async fn test_unsupported_extension_is_400_even_if_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("archive.tar.gz"), b"gz").unwrap();
    std::fs::write(dir.path().join("a.html.bak"), b"bak").unwrap();

    let (_, response) = exchange(dir.path(), b"GET /archive.tar.gz HTTP/1.1\r\n\r\n").await;
    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");

    let (_, response) = exchange(dir.path(), b"GET /a.html.bak HTTP/1.1\r\n\r\n").await;
    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");
}

#[tokio::test]
async fn test_directory_is_404() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("album.gif")).unwrap();

    let (_, response) = exchange(dir.path(), b"GET /album.gif HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 404 Not Found\r\n");
}

#[tokio::test]
async fn test_dot_dot_target_is_400() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("www");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(outer.path().join("secret.html"), b"secret").unwrap();

    // The extension starts at the first dot, so ".." never reaches the filesystem
    let (outcome, response) = exchange(&root, b"GET /../secret.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");
    assert_eq!(outcome, Outcome::Rejected(StatusCode::BadRequest));
}

/// A directory whose absolute path has no dots in it, so that an absolute
/// target still resolves to a supported extension.
fn dotless_tempdir() -> tempfile::TempDir {
    tempfile::Builder::new().prefix("filegate").tempdir().unwrap()
}

#[tokio::test]
async fn test_absolute_target_is_400_when_confined() {
    let outer = dotless_tempdir();
    let root = outer.path().join("www");
    std::fs::create_dir(&root).unwrap();
    let secret = outer.path().join("secret.html");
    std::fs::write(&secret, b"secret").unwrap();

    let request = format!("GET /{} HTTP/1.1\r\n\r\n", secret.display());
    let (outcome, response) = exchange(&root, request.as_bytes()).await;

    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");
    assert_eq!(outcome, Outcome::Rejected(StatusCode::BadRequest));
}

#[tokio::test]
async fn test_absolute_target_served_when_unconfined() {
    let outer = dotless_tempdir();
    let root = outer.path().join("www");
    std::fs::create_dir(&root).unwrap();
    let shared = outer.path().join("shared.html");
    std::fs::write(&shared, b"shared").unwrap();

    let mut cfg = Config::default();
    cfg.static_files.root = root;
    cfg.static_files.confine_to_root = false;
    let (mut client, handle) = spawn_connection(Arc::new(cfg));

    let request = format!("GET /{} HTTP/1.1\r\n\r\n", shared.display());
    client.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    assert!(response.ends_with(b"\r\n\r\nshared"));
    assert_eq!(handle.await.unwrap().unwrap(), Outcome::Served { bytes: 6 });
}

#[tokio::test]
async fn test_empty_request_line_is_400() {
    let dir = tempfile::tempdir().unwrap();

    let (_, response) = exchange(dir.path(), b"GET\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");
}

#[tokio::test]
async fn test_peer_closing_without_data_gets_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut client, handle) = spawn_connection(config_for(dir.path()));

    client.shutdown().await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    assert!(response.is_empty());
    assert_eq!(handle.await.unwrap().unwrap(), Outcome::Closed);
}

#[tokio::test]
async fn test_request_without_terminator_then_eof() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("x.gif"), b"GIF89a").unwrap();
    let (mut client, handle) = spawn_connection(config_for(dir.path()));

    client.write_all(b"GET /x.gif HTTP/1.1").await.unwrap();
    client.shutdown().await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\nContent-Type: image/gif\r\n"));
    assert!(response.ends_with(b"GIF89a"));
    assert_eq!(handle.await.unwrap().unwrap(), Outcome::Served { bytes: 6 });
}

#[tokio::test]
async fn test_request_line_split_across_reads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), b"split ok").unwrap();
    let (mut client, handle) = spawn_connection(config_for(dir.path()));

    client.write_all(b"GET /ind").await.unwrap();
    client.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.write_all(b"ex.html HTTP/1.1\r\n\r\n").await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    assert_eq!(
        response,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 8\r\n\r\nsplit ok"
    );
    assert_eq!(handle.await.unwrap().unwrap(), Outcome::Served { bytes: 8 });
}

#[tokio::test]
async fn test_full_buffer_without_terminator_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.static_files.root = dir.path().to_path_buf();
    cfg.server.request_buffer_size = 16;
    let (mut client, handle) = spawn_connection(Arc::new(cfg));

    // The buffer fills with "GET /long-name.h" before any line terminator
    client
        .write_all(b"GET /long-name.html HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    assert_eq!(response, b"HTTP/1.1 400 Bad Request\r\n");
    assert_eq!(
        handle.await.unwrap().unwrap(),
        Outcome::Rejected(StatusCode::BadRequest)
    );
}

#[tokio::test]
async fn test_read_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.static_files.root = dir.path().to_path_buf();
    cfg.server.read_timeout_ms = Some(50);
    let (mut client, handle) = spawn_connection(Arc::new(cfg));

    client.write_all(b"GET /slow").await.unwrap();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(ServeError::ReadTimeout)));

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_write_failure_aborts_connection() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), vec![b'x'; 100_000]).unwrap();
    let (mut client, handle) = spawn_connection(config_for(dir.path()));

    client
        .write_all(b"GET /index.html HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    drop(client);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(ServeError::Io(_))));
}
