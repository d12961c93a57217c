//! Fans every upstream payload out to the downstream WebSocket sessions.
//!
//! The set of live sessions is owned here, behind a single mutex that `register`,
//! `unregister` and `broadcast` all take.  Once `unregister` has returned, no later
//! `broadcast` can reach that session.
use hashbrown::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::Message;

/// The relay's end of one downstream session.
#[derive(Debug)]
pub struct Client {
    id: Uuid,
    tx: mpsc::UnboundedSender<Message>,
}

impl Client {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// A session is open until its writer task stops reading the channel.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

type Clients = HashMap<Uuid, Client>;

#[derive(Debug, Default)]
pub struct Broadcaster {
    clients: Mutex<Clients>,
    count: AtomicUsize,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn register(&self, client: Client) -> usize {
        let mut clients = self.lock();
        let id = client.id;
        clients.insert(id, client);
        let count = clients.len();
        self.count.store(count, Ordering::Release);
        log::info!("Client {} connected; {} client(s) now connected", id, count);
        count
    }

    pub fn unregister(&self, id: Uuid) -> usize {
        let mut clients = self.lock();
        if clients.remove(&id).is_none() {
            log::warn!("Attempted to remove client {}, which was not connected", id);
        }
        let count = clients.len();
        self.count.store(count, Ordering::Release);
        log::info!("Client {} disconnected; {} client(s) still connected", id, count);
        count
    }

    /// Send `msg` to every open client and return how many it reached.
    ///
    /// Clients that are no longer open are skipped, not removed: removal belongs to the
    /// session that owns the client.
    pub fn broadcast(&self, msg: &Message) -> usize {
        let clients = self.lock();
        let mut sent = 0;
        for client in clients.values().filter(|client| client.is_open()) {
            match client.tx.send(msg.clone()) {
                Ok(()) => sent += 1,
                Err(_) => log::debug!("Client {} closed mid-broadcast; skipping", client.id),
            }
        }
        sent
    }

    /// Read without locking; used by the health endpoint.
    pub fn client_count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<Clients> {
        self.clients.lock().unwrap_or_else(Self::recover)
    }

    fn recover(poisoned: PoisonError<MutexGuard<Clients>>) -> MutexGuard<Clients> {
        log::error!("{}", &poisoned);
        poisoned.into_inner()
    }
}

#[cfg(test)]
mod test;
