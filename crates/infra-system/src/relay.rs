// Stream Relay - copies one stream into a sink on its own task
//
// I/O errors end the relay and are logged here; they never propagate. The
// child's exit code is the authoritative success signal.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::console::{Console, ConsoleStream};

const CHUNK_SIZE: usize = 8 * 1024;

/// Shared in-memory byte buffer sink
pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Destination for relayed bytes
pub enum RelaySink {
    /// Whole lines written under the console lock
    Console { console: Console, stream: ConsoleStream },
    /// Arbitrary writer (e.g. a child's stdin); `interactive` flushes every chunk
    Writer {
        writer: Box<dyn AsyncWrite + Send + Unpin>,
        interactive: bool,
    },
    Buffer(SharedBuffer),
    /// Each line becomes a debug event
    Log { label: String },
}

impl RelaySink {
    pub fn console(console: Console, stream: ConsoleStream) -> Self {
        RelaySink::Console { console, stream }
    }

    pub fn writer(writer: impl AsyncWrite + Send + Unpin + 'static, interactive: bool) -> Self {
        RelaySink::Writer {
            writer: Box::new(writer),
            interactive,
        }
    }

    pub fn log(label: impl Into<String>) -> Self {
        RelaySink::Log {
            label: label.into(),
        }
    }

    /// Line-oriented sinks read up to each newline; others read raw chunks
    fn line_oriented(&self) -> bool {
        matches!(self, RelaySink::Console { .. } | RelaySink::Log { .. })
    }

    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            RelaySink::Console { console, stream } => {
                console.write(*stream, bytes);
                Ok(())
            }
            RelaySink::Writer {
                writer,
                interactive,
            } => {
                writer.write_all(bytes).await?;
                if *interactive {
                    writer.flush().await?;
                }
                Ok(())
            }
            RelaySink::Buffer(buffer) => {
                let mut buffer = match buffer.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                buffer.extend_from_slice(bytes);
                Ok(())
            }
            RelaySink::Log { label } => {
                let line = String::from_utf8_lossy(bytes);
                debug!(stream = %label, "{}", line.trim_end_matches(['\r', '\n']));
                Ok(())
            }
        }
    }

    async fn finish(&mut self) {
        if let RelaySink::Writer { writer, .. } = self {
            // Closing the writer delivers EOF to the reader on the other side.
            if let Err(e) = writer.shutdown().await {
                debug!(error = %e, "Relay writer shutdown failed");
            }
        }
    }
}

/// Handle to a running relay task
pub struct StreamRelay {
    name: String,
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<u64>>,
    transferred: u64,
}

impl StreamRelay {
    /// Start relaying `source` into `sink` on a new task
    pub fn spawn<R>(name: impl Into<String>, source: R, sink: RelaySink) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let name = name.into();
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(pump(name.clone(), source, sink, stop_rx));

        Self {
            name,
            stop_tx,
            handle: Some(handle),
            transferred: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the relay to end at its next read boundary. Idempotent, never blocks.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Wait for the relay to finish; returns the number of bytes transferred
    ///
    /// Safe to call again after completion or after being cancelled mid-wait.
    pub async fn join(&mut self) -> u64 {
        if let Some(handle) = self.handle.as_mut() {
            match handle.await {
                Ok(transferred) => self.transferred = transferred,
                Err(e) => warn!(relay = %self.name, error = %e, "Relay task failed"),
            }
            self.handle = None;
        }
        self.transferred
    }
}

impl Drop for StreamRelay {
    fn drop(&mut self) {
        // An abandoned relay must not outlive its owner.
        self.stop();
    }
}

async fn pump<R>(name: String, source: R, mut sink: RelaySink, mut stop_rx: watch::Receiver<bool>) -> u64
where
    R: AsyncRead + Send + Unpin,
{
    let line_mode = sink.line_oriented();
    let mut reader = BufReader::new(source);
    let mut buf = Vec::with_capacity(CHUNK_SIZE);
    let mut transferred = 0u64;

    loop {
        if *stop_rx.borrow() {
            debug!(relay = %name, "Relay stopped");
            break;
        }
        buf.clear();

        let read = tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    debug!(relay = %name, "Relay owner dropped");
                    break;
                }
                continue;
            }
            read = read_unit(&mut reader, &mut buf, line_mode) => read,
        };

        match read {
            Ok(0) => break,
            Ok(n) => {
                if let Err(e) = sink.write(&buf[..n]).await {
                    warn!(relay = %name, error = %e, "Relay write failed");
                    break;
                }
                transferred += n as u64;
            }
            Err(e) => {
                warn!(relay = %name, error = %e, "Relay read failed");
                break;
            }
        }
    }

    sink.finish().await;
    debug!(relay = %name, transferred, "Relay finished");
    transferred
}

async fn read_unit<R>(
    reader: &mut BufReader<R>,
    buf: &mut Vec<u8>,
    line_mode: bool,
) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    if line_mode {
        reader.read_until(b'\n', buf).await
    } else {
        buf.resize(CHUNK_SIZE, 0);
        let n = reader.read(buf).await?;
        buf.truncate(n);
        Ok(n)
    }
}
