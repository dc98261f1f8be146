//! Shared fixtures: a small in-process document server and real adapters

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use cspress_core::application::{CommandContext, ToolSettings};
use cspress_core::domain::{compute_checksum, insert_header, strip_header};
use cspress_infra_rest::RestDocumentServer;
use cspress_infra_system::{Console, LocalWorkspaceFs, ProcessSupervisor};

pub const SPEC_BODY: &str =
    "ID = 7\nTitle = Admin Guide\nProduct = Docs\nVersion = 1\n\nChapter: Intro\n";

/// Server text for `content`, stamped the way the server stamps it
pub fn stamped(content: &str) -> String {
    insert_header(content, &compute_checksum(content))
}

#[derive(Default)]
struct Store {
    docs: BTreeMap<u64, (String, i64)>,
    next_id: u64,
    requests: Vec<String>,
}

/// Document server speaking the REST routes over a real socket
#[derive(Clone)]
pub struct FakeServer {
    pub url: String,
    store: Arc<Mutex<Store>>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/TopicIndex", listener.local_addr().unwrap());
        let store = Arc::new(Mutex::new(Store {
            next_id: 100,
            ..Store::default()
        }));

        let shared = store.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let store = shared.clone();
                tokio::spawn(handle(socket, store));
            }
        });

        Self { url, store }
    }

    /// Replace the server copy of `id` with `content` (stamped)
    pub fn put(&self, id: u64, content: &str) {
        let mut store = self.store.lock().unwrap();
        let revision = store.docs.get(&id).map(|(_, r)| r + 1).unwrap_or(1);
        store.docs.insert(id, (stamped(content), revision));
    }

    pub fn text(&self, id: u64) -> Option<String> {
        self.store.lock().unwrap().docs.get(&id).map(|(t, _)| t.clone())
    }

    /// Request lines received so far, e.g. `PUT /TopicIndex/rest/1/...`
    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }
}

async fn handle(mut socket: TcpStream, store: Arc<Mutex<Store>>) {
    let Some((request_line, body)) = read_request(&mut socket).await else {
        return;
    };
    let (status, response) = route(&store, &request_line, body);
    let reply = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        response.len(),
        response
    );
    let _ = socket.write_all(reply.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&raw).into_owned();
        let Some(head_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..head_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if raw.len() < head_end + 4 + content_length {
            continue;
        }

        let request_line = text.lines().next().unwrap_or_default().to_string();
        let body = String::from_utf8_lossy(&raw[head_end + 4..head_end + 4 + content_length]).into_owned();
        return Some((request_line, body));
    }
}

fn route(store: &Mutex<Store>, request_line: &str, body: String) -> (&'static str, String) {
    let mut store = store.lock().unwrap();
    store.requests.push(request_line.to_string());

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();
    let Some(route) = path.strip_prefix("/TopicIndex/rest/1/contentspec/") else {
        return ("404 Not Found", String::new());
    };
    let segments: Vec<&str> = route.split('/').collect();
    let id = segments.last().and_then(|s| s.parse::<u64>().ok());

    match (method, segments.as_slice(), id) {
        ("GET", ["get", "text", _], Some(id)) => match store.docs.get(&id) {
            Some((text, _)) => ("200 OK", text.clone()),
            None => ("404 Not Found", String::new()),
        },
        ("GET", ["get", "json", _], Some(id)) => match store.docs.get(&id) {
            Some((text, revision)) => {
                let title = text
                    .lines()
                    .find_map(|l| l.strip_prefix("Title = "))
                    .unwrap_or_default()
                    .to_string();
                let json = serde_json::json!({ "id": id, "revision": revision, "title": title });
                ("200 OK", json.to_string())
            }
            None => ("404 Not Found", String::new()),
        },
        ("PUT", ["update", "text", _], Some(id)) => {
            if !body.contains("Title") {
                return ("400 Bad Request", "Invalid Content Specification".to_string());
            }
            let Some((_, revision)) = store.docs.get(&id).cloned() else {
                return ("404 Not Found", String::new());
            };
            let text = stamped(&strip_header(&body));
            store.docs.insert(id, (text.clone(), revision + 1));
            ("200 OK", text)
        }
        ("POST", ["create", "text"], _) => {
            let id = store.next_id;
            store.next_id += 1;
            let text = stamped(&format!("ID = {}\n{}", id, strip_header(&body)));
            store.docs.insert(id, (text.clone(), 1));
            ("200 OK", text)
        }
        _ => ("404 Not Found", String::new()),
    }
}

/// Real adapters wired the way the binary wires them, with a captured console
pub fn context(server_url: &str, console: &Console, settings: ToolSettings) -> CommandContext {
    CommandContext {
        server: Arc::new(RestDocumentServer::new(server_url, Duration::from_secs(5)).unwrap()),
        fs: Arc::new(LocalWorkspaceFs::new()),
        runner: Arc::new(
            ProcessSupervisor::new(console.clone())
                .with_input(|| Box::new(tokio::io::empty()))
                .with_graceful_timeout(Duration::from_millis(500)),
        ),
        settings,
    }
}

pub fn write_spec(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
