//! Owns the single subscription to Jetstream and feeds every payload to the broadcaster.
//!
//! The connector never parses what it relays and never gives up: after any closure it
//! waits a fixed delay and subscribes again.  A keepalive ping goes out on a fixed
//! interval, and a socket that stays silent past the stale timeout counts as closed.
mod err;
mod subscription;

pub use err::UpstreamErr;
pub use subscription::{Phase, Subscription};

use super::broadcast::Broadcaster;
use crate::config;

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

type Result<T> = std::result::Result<T, UpstreamErr>;

pub struct Connector {
    url: Url,
    subscription: Subscription,
    ping_interval: Duration,
    stale_timeout: Duration,
    broadcaster: Arc<Broadcaster>,
    status: watch::Sender<Phase>,
}

impl Connector {
    pub fn new(
        upstream_cfg: &config::Upstream,
        broadcaster: Arc<Broadcaster>,
        status: watch::Sender<Phase>,
    ) -> Self {
        Self {
            url: upstream_cfg.endpoint(),
            subscription: Subscription::new(*upstream_cfg.reconnect_delay),
            ping_interval: *upstream_cfg.ping_interval,
            stale_timeout: *upstream_cfg.stale_timeout,
            broadcaster,
            status,
        }
    }

    /// Subscribe, relay, and resubscribe after every closure.  Never returns.
    pub async fn run(mut self) {
        loop {
            self.subscription.connecting();
            self.publish();
            log::info!("Connecting to Jetstream at {}", self.url);

            match self.relay_once().await {
                Ok(()) => log::warn!("Jetstream closed the connection"),
                Err(e) => log::error!("{}", e),
            }

            if let Some(delay) = self.subscription.closed() {
                self.publish();
                log::warn!("Reconnecting to Jetstream in {:?}", delay);
                time::sleep(delay).await;
            }
        }
    }

    /// One connection, from handshake to close.  The socket is dropped before returning.
    async fn relay_once(&mut self) -> Result<()> {
        let (mut jetstream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| UpstreamErr::with_url(&self.url, e))?;

        self.subscription.opened(Instant::now());
        self.publish();
        log::warn!(
            "Connected to Jetstream; relaying to {} client(s)",
            self.broadcaster.client_count()
        );

        let mut last_heard = Instant::now();
        let mut keepalive =
            time::interval_at(last_heard + self.ping_interval, self.ping_interval);
        loop {
            let incoming = tokio::select! {
                incoming = jetstream.next() => incoming,
                _ = keepalive.tick() => {
                    let silent_for = last_heard.elapsed();
                    if silent_for > self.stale_timeout {
                        return Err(UpstreamErr::Stale(silent_for));
                    }
                    jetstream.send(Message::Ping(Vec::new())).await?;
                    continue;
                }
            };
            let incoming = match incoming {
                Some(incoming) => incoming,
                None => break,
            };
            last_heard = Instant::now();
            match incoming {
                Ok(Message::Text(txt)) => {
                    self.broadcaster.broadcast(&warp::ws::Message::text(txt));
                }
                Ok(Message::Binary(bytes)) => {
                    self.broadcaster.broadcast(&warp::ws::Message::binary(bytes));
                }
                Ok(Message::Close(frame)) => {
                    log::info!("Jetstream sent close frame: {:?}", frame);
                    break;
                }
                Ok(_ping_pong_or_raw_frame) => (), // tungstenite answers pings itself
                // A single bad frame is dropped; the stream continues
                Err(e) if is_frame_error(&e) => {
                    log::warn!("Dropping malformed Jetstream frame: {}", e)
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn publish(&self) {
        self.status.send_replace(self.subscription.phase());
    }
}

fn is_frame_error(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Utf8 | tungstenite::Error::Capacity(_))
}
