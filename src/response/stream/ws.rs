use super::super::broadcast::{Broadcaster, Client};

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};

/// The relay side of one downstream WebSocket session.
pub struct Ws {
    broadcaster: Arc<Broadcaster>,
}

impl Ws {
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Register the socket with the broadcaster and serve it until the viewer goes away.
    pub async fn send_to(self, ws: WebSocket) {
        let (mut transmit_to_ws, mut receive_from_ws) = ws.split();
        // Create a pipe; the broadcaster writes into one end and a separate task forwards
        // whatever arrives on the other end to the WebSocket client
        let (ws_tx, mut ws_rx) = mpsc::unbounded_channel::<Message>();
        let client = Client::new(ws_tx);
        let id = client.id();
        self.broadcaster.register(client);

        let writer = tokio::spawn(async move {
            while let Some(msg) = ws_rx.recv().await {
                if let Err(e) = transmit_to_ws.send(msg).await {
                    log::warn!("WebSocket send error for client {}: {}", id, e);
                    break;
                }
            }
            let _ = transmit_to_ws.close().await;
        });

        while let Some(incoming) = receive_from_ws.next().await {
            match incoming {
                Ok(msg) if msg.is_close() => break,
                Ok(msg) if msg.to_str() == Ok("ping") => log::trace!("Heartbeat from {}", id),
                Ok(_other) => (), // viewers have nothing else to say
                Err(e) => {
                    log::warn!("WebSocket receive error for client {}: {}", id, e);
                    break;
                }
            }
        }

        // Dropping the client's sender ends the writer task once it drains
        self.broadcaster.unregister(id);
        if let Err(e) = writer.await {
            log::error!("WebSocket writer for client {} failed: {}", id, e);
        }
    }
}
