//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of paths. Each route can send a full body, a body
//! shorter than its `Content-Length`, a body without `Content-Length`, a 404,
//! or a body that stalls part-way.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with accurate Content-Length.
    Full(Vec<u8>),
    /// 200 announcing `declared` bytes but sending only `body`, then closing.
    Truncated { body: Vec<u8>, declared: u64 },
    /// 200 without Content-Length; end of body is connection close.
    NoLength(Vec<u8>),
    /// 200 announcing `declared` bytes, sending `body`, then holding the connection open.
    Stall { body: Vec<u8>, declared: u64 },
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Unknown paths get 404.
pub fn start(routes: HashMap<String, Route>) -> String {
    start_with(|_| routes)
}

/// Like `start`, but builds the route table from the server's own base URL
/// (for documents that link back to the server).
pub fn start_with<F>(build: F) -> String
where
    F: FnOnce(&str) -> HashMap<String, Route>,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base = format!("http://127.0.0.1:{}", port);
    let routes = Arc::new(build(&base));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    base
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    match routes.get(&path) {
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
        Some(Route::Full(body)) => {
            send_head(&mut stream, Some(body.len() as u64));
            let _ = stream.write_all(body);
        }
        Some(Route::Truncated { body, declared }) => {
            send_head(&mut stream, Some(*declared));
            let _ = stream.write_all(body);
        }
        Some(Route::NoLength(body)) => {
            send_head(&mut stream, None);
            let _ = stream.write_all(body);
        }
        Some(Route::Stall { body, declared }) => {
            send_head(&mut stream, Some(*declared));
            let _ = stream.write_all(body);
            let _ = stream.flush();
            thread::sleep(Duration::from_secs(30));
        }
    }
}

fn send_head(stream: &mut TcpStream, content_length: Option<u64>) {
    let length = content_length
        .map(|n| format!("Content-Length: {}\r\n", n))
        .unwrap_or_default();
    let head = format!("HTTP/1.1 200 OK\r\n{}Connection: close\r\n\r\n", length);
    let _ = stream.write_all(head.as_bytes());
}
