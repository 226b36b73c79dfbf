//! Minimal HTTP stub server for probe and login tests

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::Config;

/// Nothing listens on port 1; connections are refused
pub const UNREACHABLE: &str = "http://127.0.0.1:1/";

pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Request targets (path + query) in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Answer every request with `status` and `body`
pub async fn serve(status: u16, body: &str) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let response = if status == 204 || status == 304 {
        format!("HTTP/1.1 {} Stub\r\nConnection: close\r\n\r\n", status)
    } else {
        format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    };

    let log = Arc::clone(&requests);
    let task = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let log = Arc::clone(&log);
            let response = response.clone();
            tokio::spawn(async move {
                let _ = handle(stream, &log, &response).await;
            });
        }
    });

    StubServer {
        addr,
        requests,
        task,
    }
}

async fn handle(
    mut stream: TcpStream,
    log: &Mutex<Vec<String>>,
    response: &str,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    log.lock().unwrap().push(target);

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Config with test credentials, the given probe target and login URL
pub fn config_for(check_target: &str, auth_url: &str) -> Config {
    Config {
        username: "20230001".to_string(),
        password: "hunter2".to_string(),
        auth_mode: "TEST".to_string(),
        auth_url: auth_url.to_string(),
        check_interval: Duration::from_millis(50),
        check_target: check_target.to_string(),
    }
}
