use jetrelay::config;
use jetrelay::err::FatalErr;
use jetrelay::request::Handler;
use jetrelay::response::{upstream, Broadcaster, Connector};

use std::net::SocketAddr;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), FatalErr> {
    config::merge_dotenv()?;
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .try_init()?;
    let (upstream_cfg, cfg) = config::from_env(dotenv::vars().collect())?;
    log::set_max_level(cfg.log_level.as_filter());

    let broadcaster = Broadcaster::new().into_arc();
    let (status_tx, status_rx) = watch::channel(upstream::Phase::Closed);
    tokio::spawn(Connector::new(&upstream_cfg, broadcaster.clone(), status_tx).run());

    let routes = Handler::new(broadcaster, status_rx).routes(&cfg.cors);
    let server_addr = SocketAddr::new(*cfg.address, *cfg.port);
    let (addr, server) = warp::serve(routes).try_bind_with_graceful_shutdown(server_addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Could not listen for Ctrl-C: {}", e);
            futures::future::pending::<()>().await;
        }
        log::warn!("Server shutdown requested");
    })?;

    log::warn!("Relay listening on {}", addr);
    server.await;
    Ok(())
}
