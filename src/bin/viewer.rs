//! Terminal viewer: connects to the relay and prints the posts that make it on screen.
use jetrelay::client::{self, Phase};
use jetrelay::config;
use jetrelay::err::FatalErr;
use jetrelay::presentation::{Params, Spawn, Spawner};

#[tokio::main]
async fn main() -> Result<(), FatalErr> {
    config::merge_dotenv()?;
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .try_init()?;
    let cfg = config::viewer_from_env(dotenv::vars().collect())?;

    let mut spawner = Spawner::new(Params::from(&cfg)).map_err(FatalErr::ConfigErr)?;
    let client_cfg = client::Config::new((*cfg.relay_url).clone())
        .max_reconnect_attempts(*cfg.max_reconnect_attempts);
    let (handle, mut events) = client::spawn(client_cfg)?;
    let mut phase = handle.watch_phase();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if let Some(spawn) = spawner.admit(event) {
                        render(&spawn);
                    }
                }
                None => {
                    disconnected();
                    break;
                }
            },
            changed = phase.changed() => {
                if changed.is_err() {
                    disconnected();
                    break;
                }
                let current = *phase.borrow_and_update();
                indicate(current);
            }
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Viewer shutdown requested");
                break;
            }
        }
    }

    let lifecycle = handle.dispose().await?;
    log::info!(
        "Viewer stopped after showing {} post(s) and discarding {}; connection {:?}",
        spawner.admitted(),
        spawner.discarded(),
        lifecycle.phase()
    );
    Ok(())
}

fn render(spawn: &Spawn) {
    let marker = if spawn.special { '*' } else { '-' };
    match &spawn.permalink {
        Some(link) => println!("{} [{:.2}x] {}\n    {}", marker, spawn.speed, spawn.text, link),
        None => println!("{} [{:.2}x] {}", marker, spawn.speed, spawn.text),
    }
}

/// The "connecting" line follows the real connection phase.
fn indicate(phase: Phase) {
    match phase {
        Phase::Connecting => eprintln!("… connecting to relay"),
        Phase::Open => eprintln!("● connected"),
        Phase::Closing => (),
        Phase::Closed => eprintln!("○ connection lost"),
    }
}

/// Shown once the connection has ended for good.
fn disconnected() {
    eprintln!("○ disconnected");
}
