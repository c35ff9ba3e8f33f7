//! Minimal HTTP/1.1 server that honours `If-None-Match` for integration tests.
//!
//! Serves a single static body with a fixed ETag and optional
//! Content-Disposition. A GET whose `If-None-Match` equals the ETag gets
//! `304 Not Modified`. Every request's `If-None-Match` value is recorded.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct EtagServerOptions {
    pub body: Vec<u8>,
    /// Sent as-is in the `ETag` header; empty means no header.
    pub etag: String,
    /// Raw header value bytes, so tests can send values that are not UTF-8.
    pub content_disposition: Option<Vec<u8>>,
    /// Status used for non-304 answers.
    pub status: &'static str,
}

impl Default for EtagServerOptions {
    fn default() -> Self {
        Self {
            body: b"%PDF-1.4\nhello printer\n".to_vec(),
            etag: "\"abc123\"".to_string(),
            content_disposition: Some(b"attachment; filename=\"report.pdf\"".to_vec()),
            status: "200 OK",
        }
    }
}

pub struct EtagServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Option<String>>>>,
}

impl EtagServer {
    /// `If-None-Match` values seen so far, one entry per request.
    pub fn conditions(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(opts: EtagServerOptions) -> EtagServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = Arc::clone(&opts);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &opts, &seen));
        }
    });
    EtagServer {
        url: format!("http://127.0.0.1:{}/document", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    opts: &EtagServerOptions,
    seen: &Mutex<Vec<Option<String>>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, if_none_match) = parse_request(request);
    seen.lock().unwrap().push(if_none_match.clone());

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let etag_header = if opts.etag.is_empty() {
        String::new()
    } else {
        format!("ETag: {}\r\n", opts.etag)
    };

    if !opts.etag.is_empty() && if_none_match.as_deref() == Some(opts.etag.as_str()) {
        let response = format!(
            "HTTP/1.1 304 Not Modified\r\n{}Connection: close\r\n\r\n",
            etag_header
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}",
        opts.status,
        opts.body.len(),
        etag_header
    )
    .into_bytes();
    if let Some(disposition) = &opts.content_disposition {
        response.extend_from_slice(b"Content-Disposition: ");
        response.extend_from_slice(disposition);
        response.extend_from_slice(b"\r\n");
    }
    response.extend_from_slice(b"Connection: close\r\n\r\n");
    response.extend_from_slice(&opts.body);
    let _ = stream.write_all(&response);
}

/// Returns (method, `If-None-Match` value if present).
fn parse_request(request: &str) -> (&str, Option<String>) {
    let mut method = "";
    let mut if_none_match = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("if-none-match") {
                if_none_match = Some(value.trim().to_string());
            }
        }
    }
    (method, if_none_match)
}
