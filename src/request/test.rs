use super::*;
use crate::config::deployment_cfg_types::Cors;
use crate::response::Client;
use tokio::sync::mpsc;

type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn handler(phase: upstream::Phase) -> (Handler, Arc<Broadcaster>, watch::Sender<upstream::Phase>) {
    let broadcaster = Broadcaster::new().into_arc();
    let (status_tx, status_rx) = watch::channel(phase);
    (Handler::new(broadcaster.clone(), status_rx), broadcaster, status_tx)
}

#[tokio::test]
async fn health_reports_clients_and_upstream_state() -> TestResult {
    let (handler, broadcaster, status_tx) = handler(upstream::Phase::Connecting);
    let routes = handler.routes(&Cors::default());

    let res = warp::test::request().path("/health").reply(&routes).await;
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(res.body())?;
    assert_eq!(
        body,
        serde_json::json!({"status": "ok", "clients": 0, "jetstream": false})
    );

    let (tx, _rx) = mpsc::unbounded_channel();
    broadcaster.register(Client::new(tx));
    status_tx.send_replace(upstream::Phase::Open);

    let res = warp::test::request().path("/health").reply(&routes).await;
    let body: serde_json::Value = serde_json::from_slice(res.body())?;
    assert_eq!(
        body,
        serde_json::json!({"status": "ok", "clients": 1, "jetstream": true})
    );
    Ok(())
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let (handler, _broadcaster, _status_tx) = handler(upstream::Phase::Open);
    let routes = handler.routes(&Cors::default());

    let res = warp::test::request().path("/api/v1/streaming").reply(&routes).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn root_accepts_websocket_upgrades() {
    let (handler, _broadcaster, _status_tx) = handler(upstream::Phase::Open);
    let routes = handler.routes(&Cors::default());

    let upgraded = warp::test::ws().path("/").handshake(routes.clone()).await;
    assert!(upgraded.is_ok());

    let rejected = warp::test::ws().path("/health").handshake(routes).await;
    assert!(rejected.is_err());
}

#[tokio::test]
async fn broadcasts_reach_an_upgraded_socket() -> TestResult {
    let (handler, broadcaster, _status_tx) = handler(upstream::Phase::Open);
    let routes = handler.routes(&Cors::default());
    let mut viewer = warp::test::ws()
        .path("/")
        .handshake(routes)
        .await
        .map_err(|e| format!("handshake failed: {}", e))?;

    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while broadcaster.client_count() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await?;

    broadcaster.broadcast(&warp::ws::Message::text("{\"kind\":\"commit\"}"));
    let msg = viewer.recv().await.map_err(|e| format!("recv failed: {}", e))?;
    assert_eq!(msg.to_str(), Ok("{\"kind\":\"commit\"}"));
    Ok(())
}
