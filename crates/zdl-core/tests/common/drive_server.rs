//! Minimal HTTP/1.1 server imitating the Drive v3 `files` endpoint for integration tests.
//!
//! Serves one object. `GET /drive/v3/files/{id}` answers with JSON metadata;
//! adding `alt=media` serves the body, honouring `Range: bytes=X-Y` with 206.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DriveObject {
    pub id: String,
    pub name: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct DriveServerOptions {
    /// If set, requests without `Authorization: Bearer <token>` get 401.
    pub bearer: Option<String>,
}

/// Starts a server in a background thread. Returns (base URL, host:port).
/// The server runs until the process exits.
pub fn start(object: DriveObject) -> (String, String) {
    start_with_options(object, DriveServerOptions::default())
}

pub fn start_with_options(object: DriveObject, opts: DriveServerOptions) -> (String, String) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().unwrap();
    let object = Arc::new(object);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let object = Arc::clone(&object);
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &object, &opts));
        }
    });
    (format!("http://{}/", addr), addr.to_string())
}

struct Request {
    path: String,
    query: String,
    range: Option<(u64, u64)>,
    authorization: Option<String>,
}

fn handle(mut stream: TcpStream, object: &DriveObject, opts: &DriveServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Some(req) = std::str::from_utf8(&buf[..n]).ok().and_then(parse_request) else {
        respond(&mut stream, "400 Bad Request", &[], b"");
        return;
    };

    if let Some(token) = &opts.bearer {
        let expected = format!("Bearer {}", token);
        if req.authorization.as_deref() != Some(expected.as_str()) {
            let body = error_json(401, "Request had invalid authentication credentials.");
            respond(&mut stream, "401 Unauthorized", &[], body.as_bytes());
            return;
        }
    }

    let Some(id) = req.path.strip_prefix("/drive/v3/files/") else {
        respond(&mut stream, "404 Not Found", &[], b"");
        return;
    };
    if id != object.id {
        let body = error_json(404, &format!("File not found: {}.", id));
        respond(&mut stream, "404 Not Found", &[], body.as_bytes());
        return;
    }

    let media = req.query.split('&').any(|kv| kv == "alt=media");
    if !media {
        let body = format!(
            r#"{{"name":"{}","size":"{}"}}"#,
            object.name,
            object.body.len()
        );
        respond(&mut stream, "200 OK", &[], body.as_bytes());
        return;
    }

    let total = object.body.len() as u64;
    match req.range {
        None => respond(&mut stream, "200 OK", &[], &object.body),
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start >= total || start > end_incl {
                let header = format!("Content-Range: bytes */{}", total);
                let body = error_json(416, "Request range not satisfiable");
                respond(&mut stream, "416 Range Not Satisfiable", &[&header], body.as_bytes());
            } else {
                let slice = &object.body[start as usize..=end_incl as usize];
                let header = format!("Content-Range: bytes {}-{}/{}", start, end_incl, total);
                respond(&mut stream, "206 Partial Content", &[&header], slice);
            }
        }
    }
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[&str], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for h in headers {
        head.push_str(h);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn error_json(code: u32, message: &str) -> String {
    format!(
        r#"{{"error":{{"code":{},"message":"{}"}}}}"#,
        code, message
    )
}

fn parse_request(request: &str) -> Option<Request> {
    let mut lines = request.lines();
    let target = lines.next()?.split_whitespace().nth(1)?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let mut req = Request {
        path: path.to_string(),
        query: query.to_string(),
        range: None,
        authorization: None,
    };
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("authorization") {
            req.authorization = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("range") {
            if let Some((a, b)) = value.strip_prefix("bytes=").and_then(|p| p.split_once('-')) {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                req.range = Some((start, end));
            }
        }
    }
    Some(req)
}
