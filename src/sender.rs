//! Outbound delivery of composed results to the downstream MLLP receiver.
//!
//! One connection, one send, one ACK wait. There is no retry or redelivery
//! queue: a `false` here leaves the order `Pending` so the reviewer can try
//! again.

use std::time::Duration;

use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use log::{error, info};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use crate::codec::MllpCodec;

/// How long to wait for the downstream acknowledgment.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends `message` MLLP-framed to `addr` and waits for an acknowledgment.
///
/// Returns `true` only when a response frame arrived within [`ACK_TIMEOUT`];
/// the response content is not inspected. Connect errors, write errors, a
/// closed connection and a timeout all report `false`.
pub async fn send_result(addr: &str, message: &str) -> bool {
    send_with_timeout(addr, message, ACK_TIMEOUT).await
}

async fn send_with_timeout(addr: &str, message: &str, wait: Duration) -> bool {
    info!("connecting to downstream MLLP receiver at {}", addr);
    let stream = match TcpStream::connect(addr).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("could not connect to {}: {}", addr, e);
            return false;
        }
    };

    let mut transport = Framed::new(stream, MllpCodec::new());
    if let Err(e) = transport.send(BytesMut::from(message)).await {
        error!("failed to send result to {}: {}", addr, e);
        return false;
    }
    info!("result sent ({} bytes), awaiting ack", message.len());

    match timeout(wait, transport.next()).await {
        Ok(Some(Ok(ack))) => {
            info!("received ack ({} bytes)", ack.len());
            true
        }
        Ok(Some(Err(e))) => {
            error!("transport error while awaiting ack: {}", e);
            false
        }
        Ok(None) => {
            error!("downstream closed the connection before acking");
            false
        }
        Err(_) => {
            error!("timed out waiting for ack from {}", addr);
            false
        }
    }
}
