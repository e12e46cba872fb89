use std::sync::{Arc, Mutex};

use session::SessionRegistry;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::ban::BanList;
use crate::conn;

/// Accept connections until shutdown is signalled, registering a session
/// for each peer that passes the ban check.
///
/// The listener is bound by the caller so the effective address (port 0 in
/// tests) is known before the accept loop starts.
pub async fn run_listener(
    listener: TcpListener,
    registry: Arc<Mutex<SessionRegistry>>,
    bans: BanList,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!("listener shutting down");
                    return;
                }
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };

                if bans.is_banned(&peer.ip()) {
                    tracing::info!(%peer, "rejected banned peer");
                    tokio::spawn(reject_banned(stream));
                    continue;
                }

                let id = registry.lock().unwrap().allocate_id();
                match conn::spawn_session(stream, id) {
                    Ok(session) => {
                        tracing::info!(session = %id, %peer, "new connection");
                        registry.lock().unwrap().insert(session);
                    }
                    Err(e) => {
                        tracing::warn!(%peer, error = %e, "failed to set up connection");
                    }
                }
            }
        }
    }
}

async fn reject_banned(mut stream: tokio::net::TcpStream) {
    let _ = stream
        .write_all(b"Error: you are banned from this server.\n")
        .await;
    let _ = stream.shutdown().await;
}
