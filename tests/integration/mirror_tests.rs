//! End-to-end mirror runs against mock HTTP servers

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use sumi_mirror::config::Config;
use sumi_mirror::crawler::mirror;
use sumi_mirror::Session;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Mounts an HTML page that must be requested exactly `times` times
async fn mount_page(server: &MockServer, page_path: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Directory the server's pages are mirrored into, e.g. `dest/127.0.0.1:4000`
fn host_dir(dest: &Path, server: &MockServer) -> PathBuf {
    let address = server.address();
    dest.join(format!("{}:{}", address.ip(), address.port()))
}

/// Every file under `dir` with its modification time and contents
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, (SystemTime, Vec<u8>)> {
    let mut files = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).expect("Failed to read dir") {
            let entry = entry.expect("Failed to read entry");
            let entry_path = entry.path();
            if entry_path.is_dir() {
                pending.push(entry_path);
            } else {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .expect("Failed to read mtime");
                let contents = std::fs::read(&entry_path).expect("Failed to read file");
                files.insert(entry_path, (modified, contents));
            }
        }
    }

    files
}

#[tokio::test]
async fn test_full_mirror_single_site() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/page1.html">Page 1</a>
        <a href="/posts/">Posts</a>
        <a href="http://other.com/elsewhere.html">Elsewhere</a>
        <a>No link</a>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/page1.html",
        r#"<html><body><a href="/">Home</a><a href="/posts/">Posts</a></body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/posts/",
        &format!(
            r#"<html><body><a href="{}/posts/first.html">First</a></body></html>"#,
            base_url
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/posts/first.html",
        "<html><body>First post</body></html>",
        1,
    )
    .await;

    let dest = TempDir::new().unwrap();
    let session = Session::new(format!("{}/", base_url), dest.path(), TIMEOUT).unwrap();
    let summary = session.run().await.expect("Mirror failed");

    assert_eq!(summary.pages_written, 4);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.levels, 3);

    let host = host_dir(dest.path(), &server);
    assert!(host.join("index.html").is_file());
    assert!(host.join("page1.html").is_file());
    assert!(host.join("posts/index.html").is_file());

    let first = std::fs::read_to_string(host.join("posts/first.html")).unwrap();
    assert!(first.contains("First post"));
    assert_eq!(snapshot(dest.path()).len(), 4);
}

#[tokio::test]
async fn test_second_session_resumes_without_rewriting() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    // Each page may be fetched by the first session only
    mount_page(&server, "/", r#"<a href="/a.html">A</a>"#, 1).await;
    mount_page(&server, "/a.html", r#"<a href="/b.html">B</a>"#, 1).await;
    mount_page(&server, "/b.html", "<p>B</p>", 1).await;

    let dest = TempDir::new().unwrap();
    let start_url = format!("{}/", base_url);

    let first = Session::new(start_url.as_str(), dest.path(), TIMEOUT).unwrap();
    let summary = first.run().await.expect("First run failed");
    assert_eq!(summary.pages_written, 3);
    let before = snapshot(dest.path());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let second = Session::new(start_url.as_str(), dest.path(), TIMEOUT).unwrap();
    let summary = second.run().await.expect("Second run failed");
    assert_eq!(summary.pages_written, 0);
    assert_eq!(summary.pages_skipped, 3);

    assert_eq!(before, snapshot(dest.path()));
}

#[tokio::test]
async fn test_same_session_run_twice() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a.html">A</a>"#, 1).await;
    mount_page(&server, "/a.html", "<p>A</p>", 1).await;

    let dest = TempDir::new().unwrap();
    let session = Session::new(format!("{}/", server.uri()), dest.path(), TIMEOUT).unwrap();

    session.run().await.expect("First run failed");
    let before = snapshot(dest.path());

    let summary = session.run().await.expect("Second run failed");
    assert_eq!(summary.pages_written, 0);
    assert_eq!(before, snapshot(dest.path()));
}

#[tokio::test]
async fn test_partial_mirror_is_completed() {
    let server = MockServer::start().await;

    // The start page is already on disk, only the missing child is fetched
    mount_page(&server, "/", "unused", 0).await;
    mount_page(&server, "/missing.html", "<p>Now saved</p>", 1).await;

    let dest = TempDir::new().unwrap();
    let host = host_dir(dest.path(), &server);
    std::fs::create_dir_all(&host).unwrap();
    std::fs::write(
        host.join("index.html"),
        r#"<html><body><a href="/missing.html">Missing</a></body></html>"#,
    )
    .unwrap();

    let session = Session::new(format!("{}/", server.uri()), dest.path(), TIMEOUT).unwrap();
    let summary = session.run().await.expect("Mirror failed");

    assert_eq!(summary.pages_skipped, 1);
    assert_eq!(summary.pages_written, 1);
    assert!(host.join("missing.html").is_file());
}

#[tokio::test]
async fn test_links_outside_start_prefix_not_followed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/docs/",
        &format!(
            r#"<a href="/docs/a.html">A</a>
            <a href="{}/docs/b.html">B</a>
            <a href="/about.html">About</a>
            <a href="{}/blog/">Blog</a>"#,
            base_url, base_url
        ),
        1,
    )
    .await;
    mount_page(&server, "/docs/a.html", "<p>A</p>", 1).await;
    mount_page(&server, "/docs/b.html", "<p>B</p>", 1).await;
    mount_page(&server, "/about.html", "<p>About</p>", 0).await;
    mount_page(&server, "/blog/", "<p>Blog</p>", 0).await;

    let dest = TempDir::new().unwrap();
    let session = Session::new(format!("{}/docs/", base_url), dest.path(), TIMEOUT).unwrap();
    let summary = session.run().await.expect("Mirror failed");

    assert_eq!(summary.pages_written, 3);
    let host = host_dir(dest.path(), &server);
    assert!(host.join("docs/index.html").is_file());
    assert!(host.join("docs/a.html").is_file());
    assert!(host.join("docs/b.html").is_file());
    assert!(!host.join("about.html").exists());
}

#[tokio::test]
async fn test_error_pages_saved_by_default() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/gone.html">Gone</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let session = Session::new(format!("{}/", server.uri()), dest.path(), TIMEOUT).unwrap();
    let summary = session.run().await.expect("Mirror failed");

    assert_eq!(summary.pages_written, 2);
    let saved = std::fs::read_to_string(host_dir(dest.path(), &server).join("gone.html")).unwrap();
    assert!(saved.contains("Not Found"));
}

#[tokio::test]
async fn test_error_pages_skipped_when_disabled() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/gone.html">Gone</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut config = Config::new(
        format!("{}/", server.uri()),
        dest.path().to_string_lossy().into_owned(),
    );
    config.http.save_error_pages = false;
    config.crawler.max_concurrent_fetches = Some(2);

    let summary = mirror(&config).await.expect("Mirror failed");

    assert_eq!(summary.pages_written, 1);
    assert_eq!(summary.pages_failed, 1);
    assert!(!host_dir(dest.path(), &server).join("gone.html").exists());
}

#[tokio::test]
async fn test_failed_page_does_not_stop_siblings() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/corrupt.html">Corrupt</a><a href="/ok.html">Ok</a>"#,
        1,
    )
    .await;
    // Declared gzip but not gzip: the body cannot be read
    Mock::given(method("GET"))
        .and(path("/corrupt.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(b"not gzip".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok.html", r#"<a href="/deeper.html">Deeper</a>"#, 1).await;
    mount_page(&server, "/deeper.html", "<p>Deeper</p>", 1).await;

    let dest = TempDir::new().unwrap();
    let session = Session::new(format!("{}/", server.uri()), dest.path(), TIMEOUT).unwrap();
    let summary = session.run().await.expect("Mirror failed");

    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.pages_written, 3);
    let host = host_dir(dest.path(), &server);
    assert!(!host.join("corrupt.html").exists());
    assert!(host.join("deeper.html").is_file());
}

#[tokio::test]
async fn test_non_utf8_site_is_mirrored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"<p>caf\xe9</p><a href=\"/x.html\">X</a>".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=iso-8859-1")
                .set_body_bytes(b"<p>na\xefve</p>".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let session = Session::new(format!("{}/", server.uri()), dest.path(), TIMEOUT).unwrap();
    let summary = session.run().await.expect("Mirror failed");

    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.pages_written, 2);
    let host = host_dir(dest.path(), &server);
    assert!(host.join("index.html").is_file());
    let saved = std::fs::read_to_string(host.join("x.html")).unwrap();
    assert!(saved.contains("na\u{ef}ve"));
}

#[tokio::test]
async fn test_unreachable_start_url_still_succeeds() {
    let dest = TempDir::new().unwrap();
    let session = Session::new("http://127.0.0.1:1/", dest.path(), TIMEOUT).unwrap();

    let summary = session.run().await.expect("Run should not fail");
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.levels, 1);
    assert!(snapshot(dest.path()).is_empty());
}
