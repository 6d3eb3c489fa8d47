// tests/live_reload.rs

mod common;
use crate::common::{init_tracing, with_timeout, write_file, TestResult};

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use assetpipe::server::assets::{inject_script, CLIENT_SCRIPT_TAG};
use assetpipe::server::{LiveReload, ReloadEvent};

async fn get(addr: SocketAddr, path: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

/// Read from `stream` until `needle` shows up.
async fn read_until(stream: &mut TcpStream, needle: &str) -> std::io::Result<String> {
    let mut seen = String::new();
    let mut buf = [0u8; 1024];
    while !seen.contains(needle) {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        seen.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
    Ok(seen)
}

#[tokio::test]
async fn serves_files_with_injected_client_script() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "index.html", "<html><body><h1>Hi</h1></body></html>");
    write_file(dir.path(), "css/app.css", "body{margin:0}");

    let live = LiveReload::new();
    let addr = live.serve(dir.path(), 0).await?;
    assert!(live.is_serving());

    let index = with_timeout(get(addr, "/")).await?;
    assert!(index.starts_with("HTTP/1.1 200"), "{index}");
    assert!(index.contains("text/html"), "{index}");
    assert!(
        index.contains(&format!("<h1>Hi</h1>{CLIENT_SCRIPT_TAG}</body>")),
        "{index}"
    );

    let css = with_timeout(get(addr, "/css/app.css")).await?;
    assert!(css.starts_with("HTTP/1.1 200"), "{css}");
    assert!(css.contains("text/css"), "{css}");
    assert!(!css.contains(CLIENT_SCRIPT_TAG), "{css}");

    let script = with_timeout(get(addr, "/__livereload.js")).await?;
    assert!(script.contains("EventSource"), "{script}");

    let missing = with_timeout(get(addr, "/nope.html")).await?;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    let escape = with_timeout(get(addr, "/../Cargo.toml")).await?;
    assert!(escape.starts_with("HTTP/1.1 404"), "{escape}");
    Ok(())
}

#[tokio::test]
async fn serving_twice_reuses_the_running_server() -> TestResult {
    let dir = tempfile::tempdir()?;
    let live = LiveReload::new();

    let first = live.serve(dir.path(), 0).await?;
    let second = live.clone().serve(dir.path(), 0).await?;

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn reload_without_server_is_a_no_op() {
    let live = LiveReload::new();
    let mut rx = live.subscribe();

    live.reload(vec!["index.html".to_string()]);

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn reload_reaches_subscribers() -> TestResult {
    let dir = tempfile::tempdir()?;
    let live = LiveReload::new();
    live.serve(dir.path(), 0).await?;
    let mut rx = live.subscribe();

    live.reload(vec!["index.html".to_string(), "about.html".to_string()]);

    let event = with_timeout(rx.recv()).await?;
    assert_eq!(
        event,
        ReloadEvent {
            paths: vec!["index.html".to_string(), "about.html".to_string()],
        }
    );
    Ok(())
}

#[tokio::test]
async fn browsers_receive_reload_events_over_sse() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let live = LiveReload::new();
    let addr = live.serve(dir.path(), 0).await?;

    let mut stream = TcpStream::connect(addr).await?;
    stream
        .write_all(b"GET /__livereload HTTP/1.1\r\nHost: localhost\r\nAccept: text/event-stream\r\n\r\n")
        .await?;

    // Headers arrive once the handler has subscribed.
    let head = with_timeout(read_until(&mut stream, "\r\n\r\n")).await?;
    assert!(head.contains("text/event-stream"), "{head}");

    live.reload(vec!["index.html".to_string()]);

    let body = with_timeout(read_until(&mut stream, "index.html")).await?;
    assert!(body.contains("event:"), "{body}");
    assert!(body.contains("reload"), "{body}");
    assert!(body.contains(r#"{"paths":["index.html"]}"#), "{body}");
    Ok(())
}

#[test]
fn script_goes_before_the_last_closing_body_tag() {
    let html = "<html><BODY><p>a</p></BODY></html>";
    assert_eq!(
        inject_script(html),
        format!("<html><BODY><p>a</p>{CLIENT_SCRIPT_TAG}</BODY></html>")
    );
}

#[test]
fn script_is_appended_without_body_tag() {
    assert_eq!(inject_script("<p>x</p>"), format!("<p>x</p>{CLIENT_SCRIPT_TAG}"));
}
