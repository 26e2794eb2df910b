//! The inbound side: a TCP listener that takes one MLLP-framed order per
//! connection, acknowledges it, and queues it for review.
//!
//! Per connection: `read -> unframe -> ack -> extract -> store -> close`.
//! The ACK goes out before extraction is attempted — it confirms receipt of
//! the frame, not that the order was usable. Orders that fail extraction are
//! logged and dropped; the connection is closed on every path. Reads are a
//! single bounded read with no timeout, so oversized messages and silent
//! clients are trusted not to happen on the lab intranet.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::ack::compose_ack;
use crate::codec;
use crate::extract::extract_order;
use crate::ids::IdGenerator;
use crate::store::OrderStore;

/// Largest inbound frame handled in one read.
const READ_BUFFER_SIZE: usize = 4096;

/// The order-ingest listener. Holds the shared store and the id source for
/// generated fallback identifiers; both are injected rather than ambient.
pub struct Listener {
    store: Arc<OrderStore>,
    ids: Arc<dyn IdGenerator>,
}

impl Listener {
    pub fn new(store: Arc<OrderStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Listener { store, ids }
    }

    /// Accepts connections forever, handling each in its own task. Only a
    /// failing `accept` ends the loop; per-connection failures are logged
    /// and the next connection is served regardless.
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let store = Arc::clone(&self.store);
            let ids = Arc::clone(&self.ids);

            tokio::spawn(async move {
                debug!("connection opened from {}", peer);
                if let Err(e) = handle_connection(stream, peer, store, ids.as_ref()).await {
                    error!("error handling connection from {}: {}", peer, e);
                }
                debug!("connection closed from {}", peer);
            });
        }
    }
}

/// Handles one inbound connection end to end. The stream is dropped (and the
/// socket released) when this returns, success or failure.
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    store: Arc<OrderStore>,
    ids: &dyn IdGenerator,
) -> io::Result<()> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        debug!("no data received from {}", peer);
        return Ok(());
    }
    info!("received {} bytes from {}", n, peer);

    let payload = codec::unwrap(&buf[..n]);
    let text = String::from_utf8_lossy(payload).into_owned();

    // Receipt is acknowledged unconditionally, before extraction can fail.
    let ack = compose_ack(&text, ids);
    stream.write_all(&codec::wrap(ack.as_bytes())).await?;
    stream.flush().await?;
    debug!("ack sent to {}", peer);

    match extract_order(&text, ids) {
        Ok(fields) => {
            let id = store.add(text, fields);
            info!("order stored as pending with id {}", id);
        }
        Err(e) => warn!("dropping order from {}: {}", peer, e),
    }

    Ok(())
}
