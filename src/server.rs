//! Command Transport
//!
//! Accepts line-oriented TCP requests, splits the header block from the
//! body at the first blank line, parses the body as JSON regardless of the
//! declared headers, and answers with a bare status line. One task per
//! connection; directory access is serialized behind a single lock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, warn};

use crate::command::Command;
use crate::config::Config;
use crate::error::CommandError;
use crate::wm::directory::Directory;
use crate::wm::dispatch;

/// Largest request we are willing to buffer.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Bind the listening socket with SO_REUSEADDR.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = format!("{}:{}", config.bind, config.port)
        .parse()
        .context("Invalid bind address")?;
    let socket = TcpSocket::new_v4().context("Failed to create socket")?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr).context("Failed to bind listening socket")?;
    socket.listen(64).context("Failed to listen")
}

/// Accept loop: one worker task per inbound connection.
pub async fn serve(
    listener: TcpListener,
    dir: Arc<Mutex<dyn Directory>>,
    home_dir: String,
    deadline: Duration,
) -> Result<()> {
    let home_dir: Arc<str> = home_dir.into();
    loop {
        let (stream, addr) = listener.accept().await.context("accept failed")?;
        debug!("Accepted connection from {}", addr);

        let dir = dir.clone();
        let home_dir = home_dir.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, dir, home_dir, deadline).await {
                warn!("Error handling client: {:#}", e);
            }
        });
    }
}

/// Handle one request/response exchange, then close the connection.
async fn handle_client(
    mut stream: TcpStream,
    dir: Arc<Mutex<dyn Directory>>,
    home_dir: Arc<str>,
    deadline: Duration,
) -> Result<()> {
    let code = match read_request(&mut stream).await {
        Ok(body) => match Command::parse(&body) {
            Ok(command) => run_command(dir, home_dir, command, deadline).await,
            Err(e) => {
                warn!("Error parsing request: {}", e);
                e.status_code()
            }
        },
        Err(e) => {
            warn!("Malformed request: {:#}", e);
            400
        }
    };

    write_response(&mut stream, code).await
}

/// Dispatch on the blocking pool under the directory lock, bounded by the
/// per-command deadline. A stalled directory call past the deadline is
/// reported as a failure; the command itself is not cancelled.
async fn run_command(
    dir: Arc<Mutex<dyn Directory>>,
    home_dir: Arc<str>,
    command: Command,
    deadline: Duration,
) -> u16 {
    let task = tokio::task::spawn_blocking(move || {
        let dir = dir.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        dispatch::dispatch(&*dir, &home_dir, &command)
    });

    let outcome: Result<(), CommandError> = match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(CommandError::Internal(anyhow!(
            "command worker panicked: {join_error}"
        ))),
        Err(_) => Err(CommandError::Internal(anyhow!(
            "command deadline of {deadline:?} exceeded"
        ))),
    };

    match outcome {
        Ok(()) => 200,
        Err(e) => {
            warn!("Command failed: {}", e);
            e.status_code()
        }
    }
}

/// Read one request and return the raw body bytes.
///
/// Reads until the blank line ending the header block, then honors
/// Content-Length when the client sent one; otherwise the body is whatever
/// arrived with the headers.
async fn read_request<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = find_blank_line(&buf) {
            break pos;
        }
        anyhow::ensure!(buf.len() < MAX_REQUEST_BYTES, "request too large");
        let n = stream.read(&mut chunk).await.context("read failed")?;
        anyhow::ensure!(n > 0, "connection closed before the header block ended");
        buf.extend_from_slice(&chunk[..n]);
    };

    let (head, rest) = buf.split_at(header_end);
    let mut body = rest[4..].to_vec();

    if let Some(length) = content_length(head) {
        anyhow::ensure!(length <= MAX_REQUEST_BYTES, "declared body too large");
        while body.len() < length {
            let n = stream.read(&mut chunk).await.context("read failed")?;
            anyhow::ensure!(n > 0, "connection closed mid-body");
            body.extend_from_slice(&chunk[..n]);
        }
        body.truncate(length);
    }

    Ok(body)
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

fn content_length(head: &[u8]) -> Option<usize> {
    let head = String::from_utf8_lossy(head);
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Write the status line and close the write side.
async fn write_response(stream: &mut TcpStream, code: u16) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\n\r\n",
        code,
        status_text(code)
    );
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write response")?;
    let _ = stream.shutdown().await;
    Ok(())
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
