//! Drives a [`Lifecycle`] over a real WebSocket.
//!
//! The task owns the socket and both timers.  Timers live only as long as one session,
//! so a torn-down connection cannot leave one running.
use super::{Action, ClientErr, Config, Lifecycle, Phase};
use crate::event::{self, DecodedEvent};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_tungstenite::tungstenite::protocol::{frame::coding::CloseCode, CloseFrame};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a managed connection to the relay.
///
/// Decoded events arrive on the returned receiver.  Dropping the receiver, or the handle,
/// tears the connection down the same way [`Handle::dispose`] does.
pub fn spawn(cfg: Config) -> Result<(Handle, mpsc::UnboundedReceiver<DecodedEvent>), ClientErr> {
    cfg.validate().map_err(ClientErr::Config)?;
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (phase_tx, phase_rx) = watch::channel(Phase::Closed);

    let driver = Driver {
        lifecycle: Lifecycle::new(cfg.clone()),
        cfg,
        events: events_tx,
        shutdown: shutdown_rx,
        phase: phase_tx,
    };
    let handle = Handle {
        shutdown: shutdown_tx,
        phase: phase_rx,
        task: tokio::spawn(driver.run()),
    };
    Ok((handle, events_rx))
}

#[derive(Debug)]
pub struct Handle {
    shutdown: watch::Sender<bool>,
    phase: watch::Receiver<Phase>,
    task: JoinHandle<Lifecycle>,
}

impl Handle {
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Follow phase changes, e.g. to show a "connecting" indicator.
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.clone()
    }

    /// Close the connection for good and return the final state.
    pub async fn dispose(self) -> Result<Lifecycle, ClientErr> {
        self.shutdown.send_replace(true);
        Ok(self.task.await?)
    }

    /// Wait until the connection gives up on its own.
    pub async fn join(self) -> Result<Lifecycle, ClientErr> {
        let Self { shutdown, task, .. } = self;
        let lifecycle = task.await?;
        drop(shutdown);
        Ok(lifecycle)
    }
}

struct Driver {
    cfg: Config,
    lifecycle: Lifecycle,
    events: mpsc::UnboundedSender<DecodedEvent>,
    shutdown: watch::Receiver<bool>,
    phase: watch::Sender<Phase>,
}

impl Driver {
    async fn run(mut self) -> Lifecycle {
        while self.lifecycle.connecting() {
            self.publish();
            log::info!("Connecting to relay at {}", self.cfg.url);

            let connected = tokio::select! {
                res = connect(&self.cfg) => res,
                _ = shutdown_requested(&mut self.shutdown) => {
                    self.dispose();
                    break;
                }
                _ = self.events.closed() => {
                    self.consumer_gone();
                    break;
                }
            };
            match connected {
                Ok(socket) => self.session(socket).await,
                Err(e) => self.lifecycle.errored(&e),
            }

            let next = self.close();
            let (attempt, after) = match next {
                Some(reconnect) => reconnect,
                None => break,
            };
            log::warn!("Reconnecting to relay in {:?} (attempt {})", after, attempt);
            tokio::select! {
                _ = time::sleep(after) => (),
                _ = shutdown_requested(&mut self.shutdown) => self.dispose(),
                _ = self.events.closed() => self.consumer_gone(),
            }
        }
        self.close();
        self.lifecycle
    }

    async fn session(&mut self, socket: Socket) {
        self.lifecycle.opened(Instant::now());
        self.publish();
        log::warn!("Connected to relay at {}", self.cfg.url);

        let (mut sink, mut stream) = socket.split();
        let start = Instant::now();
        let mut heartbeat = time::interval_at(
            start + self.cfg.heartbeat_interval,
            self.cfg.heartbeat_interval,
        );
        let mut staleness = time::interval_at(
            start + self.cfg.stale_check_interval,
            self.cfg.stale_check_interval,
        );

        loop {
            tokio::select! {
                _ = shutdown_requested(&mut self.shutdown) => {
                    self.dispose();
                    break;
                }
                _ = self.events.closed() => {
                    self.consumer_gone();
                    break;
                }
                _ = heartbeat.tick() => {
                    if self.lifecycle.heartbeat_due().is_some() {
                        if let Err(e) = sink.send(Message::Text("ping".to_string())).await {
                            self.lifecycle.errored(&ClientErr::Send(e));
                            self.lifecycle.heartbeat_failed();
                            break;
                        }
                    }
                }
                _ = staleness.tick() => {
                    if self.lifecycle.staleness_check(Instant::now()).contains(&Action::ForceClose) {
                        break;
                    }
                }
                incoming = stream.next() => match incoming {
                    Some(Ok(msg)) => {
                        self.lifecycle.received(Instant::now());
                        if !self.handle(msg) {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        self.lifecycle.errored(&ClientErr::from(e));
                        break;
                    }
                    None => break,
                }
            }
        }

        if !self.lifecycle.should_reconnect() {
            let goodbye = CloseFrame {
                code: CloseCode::Normal,
                reason: "viewer closed".into(),
            };
            if let Err(e) = sink.send(Message::Close(Some(goodbye))).await {
                log::debug!("Could not send close frame: {}", e);
            }
        }
        if let Err(e) = sink.close().await {
            log::debug!("Relay socket was already closed: {}", e);
        }
    }

    /// Returns `false` once the session should end.
    fn handle(&mut self, msg: Message) -> bool {
        let decoded = match msg {
            Message::Text(txt) => event::decode(&txt),
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(txt) => event::decode(txt),
                Err(_) => {
                    log::trace!("Discarding non-UTF-8 binary message");
                    None
                }
            },
            Message::Close(frame) => {
                log::info!("Relay sent close frame: {:?}", frame);
                return false;
            }
            _ping_pong_or_raw_frame => None,
        };
        if let Some(event) = decoded {
            if self.events.send(event).is_err() {
                self.consumer_gone();
                return false;
            }
        }
        true
    }

    fn consumer_gone(&mut self) {
        log::info!("Event receiver dropped; closing relay connection");
        self.dispose();
    }

    fn dispose(&mut self) {
        if self.lifecycle.dispose().contains(&Action::CloseIntentionally) {
            log::info!("Closing relay connection");
        }
        self.publish();
    }

    /// Settle into `Closed` and return the reconnect to perform, if any.
    fn close(&mut self) -> Option<(u32, std::time::Duration)> {
        let mut next = None;
        for action in self.lifecycle.closed() {
            match action {
                Action::Reconnect { attempt, after } => next = Some((attempt, after)),
                Action::GiveUp { attempts } => {
                    log::error!("Giving up on the relay after {} reconnect attempts", attempts)
                }
                _ => (),
            }
        }
        self.publish();
        next
    }

    fn publish(&self) {
        self.phase.send_replace(self.lifecycle.phase());
    }
}

async fn connect(cfg: &Config) -> Result<Socket, ClientErr> {
    let attempt = tokio_tungstenite::connect_async(cfg.url.as_str());
    match time::timeout(cfg.connect_timeout, attempt).await {
        Ok(Ok((socket, _response))) => Ok(socket),
        Ok(Err(e)) => Err(ClientErr::Connect(e)),
        Err(_elapsed) => Err(ClientErr::ConnectTimeout(cfg.connect_timeout)),
    }
}

/// Resolves once shutdown is requested or every [`Handle`] is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
