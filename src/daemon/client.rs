use anyhow::{Context, Result};
use std::os::unix::net::UnixStream;
use std::path::Path;

use super::protocol::{read_message, write_message, Request, Response};
use super::server::socket_path;

/// Send one request to a running daemon and return its response.
pub fn request(runtime_dir: &Path, request: &Request) -> Result<Response> {
    let sock = socket_path(runtime_dir);
    let mut stream = UnixStream::connect(&sock).with_context(|| {
        format!(
            "Failed to connect to daemon socket: {} (is the daemon running?)",
            sock.display()
        )
    })?;

    write_message(&mut stream, request).context("Failed to send request")?;
    read_message(&mut stream).context("Failed to read response")
}

/// Like [`request`], but fail on an error response and unexpected shapes.
pub fn expect_ok(runtime_dir: &Path, req: &Request) -> Result<()> {
    match request(runtime_dir, req)? {
        Response::Ok => Ok(()),
        Response::Error { message } => anyhow::bail!("Daemon returned error: {message}"),
        other => anyhow::bail!("Unexpected response from daemon: {other:?}"),
    }
}
