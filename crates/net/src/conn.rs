//! Per-connection I/O: a reader task feeding the session's inbound queue
//! and a writer task draining its outbound queue. Neither task ever runs
//! command logic; that happens on the simulation tick thread.

use std::time::Duration;

use session::{Session, SessionChannels, SessionId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

use crate::line::LineBuffer;

/// How long a closing connection waits for the writer task to flush
/// remaining replies before it is abandoned.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Wire up a freshly accepted socket: create the session queues, spawn the
/// connection supervisor, and return the [`Session`] for registration.
pub fn spawn_session(stream: TcpStream, id: SessionId) -> std::io::Result<Session> {
    let peer = stream.peer_addr()?;
    // Small interactive commands; don't let Nagle batch them.
    stream.set_nodelay(true)?;

    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);

    tokio::spawn(run_connection(stream, id, in_tx, out_rx, stop_rx));

    Ok(Session::new(
        id,
        peer,
        SessionChannels {
            inbound: in_rx,
            outbound: out_tx,
            stop: stop_tx,
        },
    ))
}

async fn run_connection(
    stream: TcpStream,
    id: SessionId,
    in_tx: mpsc::UnboundedSender<String>,
    out_rx: mpsc::UnboundedReceiver<String>,
    stop_rx: watch::Receiver<bool>,
) {
    let (read_half, write_half) = stream.into_split();

    let mut writer = tokio::spawn(run_writer(write_half, out_rx));

    run_reader(read_half, id, &in_tx, stop_rx).await;

    // Dropping the inbound sender is the reader's end-of-stream signal to
    // the tick thread; buffered lines are still drained there first.
    drop(in_tx);

    // The writer exits once the session is dropped from the registry and
    // its queue runs dry. Bound the wait so a stuck peer cannot hold the
    // socket open forever; aborting drops the write half, which closes it.
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        tracing::warn!(session = %id, "writer did not drain in time, aborting");
        writer.abort();
    }

    tracing::debug!(session = %id, "connection tasks finished");
}

async fn run_reader(
    mut read_half: OwnedReadHalf,
    id: SessionId,
    in_tx: &mpsc::UnboundedSender<String>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut lines = LineBuffer::new();
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            read = read_half.read(&mut buf) => match read {
                Ok(0) => break, // end of stream
                Ok(n) => {
                    for line in lines.feed(&buf[..n]) {
                        if in_tx.send(line).is_err() {
                            return; // session already dropped
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(session = %id, error = %e, "socket read failed");
                    break;
                }
            }
        }
    }
}

async fn run_writer(mut write_half: OwnedWriteHalf, mut out_rx: mpsc::UnboundedReceiver<String>) {
    // Block until a reply arrives (or the queue closes), then drain
    // everything currently buffered and flush once.
    while let Some(first) = out_rx.recv().await {
        if write_line(&mut write_half, &first).await.is_err() {
            break;
        }
        while let Ok(next) = out_rx.try_recv() {
            if write_line(&mut write_half, &next).await.is_err() {
                return;
            }
        }
        if write_half.flush().await.is_err() {
            break;
        }
    }
    let _ = write_half.shutdown().await;
}

async fn write_line(write_half: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    write_half.write_all(protocol::frame(line).as_bytes()).await
}
