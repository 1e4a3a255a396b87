//! Connection handling for admin WebSocket clients.

use crate::{error::GatewayError, messaging::MessageRouter};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, trace};

/// Handles a single admin connection from handshake to close.
///
/// Every text frame is dispatched on its own task so a slow collaborator call
/// does not hold up other requests on the same connection. Replies are
/// funneled through a channel to a single writer task and may therefore
/// arrive out of request order; clients pair them by `id`.
///
/// When the read side ends, the writer drains the replies still in flight and
/// then completes the close handshake. Replies that finish after the client
/// has sent Close cannot be delivered and are dropped.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    router: Arc<MessageRouter>,
) -> Result<(), GatewayError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| GatewayError::Network(format!("WebSocket handshake failed: {e}")))?;
    info!("🔌 Admin client connected from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Message>();

    let writer = tokio::spawn(async move {
        while let Some(message) = reply_rx.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                debug!("Admin reply to {} not delivered: {}", addr, e);
                break;
            }
        }
        // Also flushes the close reply queued when the client closed first.
        let _ = ws_sender.close().await;
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let router = router.clone();
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let reply = router.route(&text).await;
                    trace!("📤 Admin reply: {}", reply);
                    let _ = reply_tx.send(Message::Text(reply.into()));
                });
            }
            Ok(Message::Ping(data)) => {
                let _ = reply_tx.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => {
                debug!("🔌 Admin client {} requested close", addr);
                break;
            }
            Err(e) => {
                error!("WebSocket error for admin client {}: {}", addr, e);
                break;
            }
            _ => {}
        }
    }

    drop(reply_tx);
    if let Err(e) = writer.await {
        error!("Admin reply writer for {} failed: {}", addr, e);
    }

    info!("👋 Admin client {} disconnected", addr);
    Ok(())
}
