//! Filter incoming requests: the viewer WebSocket at `/` and the health check.
use crate::config;
use crate::response::{stream, upstream, Broadcaster};

use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::watch;
use warp::{filters::BoxedFilter, http::StatusCode, path, Filter, Rejection, Reply};

#[cfg(test)]
mod test;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: &'static str,
    pub clients: usize,
    pub jetstream: bool,
}

impl Health {
    /// Built from in-memory state only; never touches the network.
    pub fn snapshot(
        broadcaster: &Broadcaster,
        upstream_status: &watch::Receiver<upstream::Phase>,
    ) -> Self {
        Self {
            status: "ok",
            clients: broadcaster.client_count(),
            jetstream: *upstream_status.borrow() == upstream::Phase::Open,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Handler {
    broadcaster: Arc<Broadcaster>,
    upstream: watch::Receiver<upstream::Phase>,
}

impl Handler {
    pub fn new(broadcaster: Arc<Broadcaster>, upstream: watch::Receiver<upstream::Phase>) -> Self {
        Self {
            broadcaster,
            upstream,
        }
    }

    pub fn ws(&self) -> BoxedFilter<(warp::ws::Ws,)> {
        path::end().and(warp::ws()).boxed()
    }

    pub fn health(&self) -> BoxedFilter<()> {
        path!("health").and(warp::get()).boxed()
    }

    /// Every route the relay serves, with CORS and rejection handling applied.
    pub fn routes(
        self,
        cors: &config::deployment_cfg_types::Cors,
    ) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let ws_broadcaster = self.broadcaster.clone();
        let ws = self.ws().map(move |ws: warp::ws::Ws| {
            log::info!("Incoming websocket request");
            let ws_stream = stream::Ws::new(ws_broadcaster.clone());
            ws.on_upgrade(move |socket| ws_stream.send_to(socket))
        });

        let (broadcaster, upstream) = (self.broadcaster.clone(), self.upstream.clone());
        let health = self
            .health()
            .map(move || warp::reply::json(&Health::snapshot(&broadcaster, &upstream)));

        let cors = warp::cors()
            .allow_any_origin()
            .allow_methods(cors.allowed_methods.clone())
            .allow_headers(cors.allowed_headers.clone());

        ws.or(health).with(cors).recover(Self::err)
    }

    pub async fn err(r: Rejection) -> Result<impl Reply, Infallible> {
        let (msg, status) = if r.is_not_found() {
            ("Error: Nothing to see here", StatusCode::NOT_FOUND)
        } else if r.find::<warp::reject::MethodNotAllowed>().is_some() {
            ("Error: Method not allowed", StatusCode::METHOD_NOT_ALLOWED)
        } else {
            log::warn!("Rejected request: {:?}", r);
            ("Error: Bad request", StatusCode::BAD_REQUEST)
        };
        Ok(warp::reply::with_status(msg, status))
    }
}
