//! shared helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// serves files below `root` at `http://127.0.0.1:<port>/tree/`
///
/// requests for names in `broken` get a 500. the server thread lives until the
/// test process exits.
pub struct StaticServer {
    pub base: String,
    requests: Arc<AtomicUsize>,
}

impl StaticServer {
    pub fn start(root: &Path, broken: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/tree", listener.local_addr().unwrap());
        let root = root.to_path_buf();
        let broken: Vec<String> = broken.iter().map(|s| s.to_string()).collect();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = handle(stream, &root, &broken);
            }
        });

        Self { base, requests }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn handle(mut stream: TcpStream, root: &Path, broken: &[String]) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // drain headers
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let name = percent_decode(target.strip_prefix("/tree/").unwrap_or(""));

    let (status, body) = if broken.iter().any(|b| *b == name) {
        ("500 Internal Server Error", b"boom".to_vec())
    } else {
        match resolve(root, &name).and_then(|p| fs::read(p).ok()) {
            Some(body) => ("200 OK", body),
            None => ("404 Not Found", b"not found".to_vec()),
        }
    };

    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    )?;
    stream.write_all(&body)?;
    stream.flush()
}

fn resolve(root: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.split('/').any(|p| p == "..") {
        return None;
    }
    Some(root.join(name))
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(v) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// write `files` (name, content) below `root`
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
