use jetrelay::client::{self, Phase};

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time;
use url::Url;
use warp::Filter;

type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

const POST: &str = include_str!("../test_data/jetstream_post_001.json");
const DELETE: &str = include_str!("../test_data/jetstream_delete_001.json");
const IDENTITY: &str = include_str!("../test_data/jetstream_identity_001.json");

/// A stand-in relay.  It only speaks when the test feeds it and never answers `ping`.
struct FakeRelay {
    addr: SocketAddr,
    feed: broadcast::Sender<String>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    close_codes: Arc<Mutex<Vec<u16>>>,
}

impl FakeRelay {
    fn start() -> Self {
        let (feed, _) = broadcast::channel(64);
        let (opened, closed) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));

        let close_codes = Arc::new(Mutex::new(Vec::new()));

        let (route_feed, route_opened, route_closed) = (feed.clone(), opened.clone(), closed.clone());
        let route_close_codes = close_codes.clone();
        let route = warp::path::end().and(warp::ws()).map(move |ws: warp::ws::Ws| {
            let mut feed = route_feed.subscribe();
            let (opened, closed) = (route_opened.clone(), route_closed.clone());
            let close_codes = route_close_codes.clone();
            ws.on_upgrade(move |socket| async move {
                opened.fetch_add(1, Ordering::SeqCst);
                let (mut tx, mut rx) = socket.split();
                loop {
                    tokio::select! {
                        msg = feed.recv() => match msg {
                            Ok(msg) => {
                                if tx.send(warp::ws::Message::text(msg)).await.is_err() {
                                    break;
                                }
                            }
                            Err(_) => break,
                        },
                        incoming = rx.next() => match incoming {
                            Some(Ok(msg)) if msg.is_close() => {
                                if let Some((code, _reason)) = msg.close_frame() {
                                    if let Ok(mut codes) = close_codes.lock() {
                                        codes.push(code);
                                    }
                                }
                                break;
                            }
                            Some(Ok(_ping)) => (),
                            _ => break,
                        },
                    }
                }
                closed.fetch_add(1, Ordering::SeqCst);
            })
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        Self {
            addr,
            feed,
            opened,
            closed,
            close_codes,
        }
    }

    fn url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("ws://{}/", self.addr))
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn close_codes(&self) -> Vec<u16> {
        self.close_codes.lock().map(|codes| codes.clone()).unwrap_or_default()
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Short timings so a silent relay is noticed quickly.
fn quick(url: Url) -> client::Config {
    client::Config::new(url)
        .heartbeat_interval(ms(20))
        .stale_check(ms(20), ms(100))
        .reconnect_delays(ms(10), ms(10), ms(50))
        .connect_timeout(ms(1000))
}

async fn wait_for(mut ready: impl FnMut() -> bool) -> Result<(), time::error::Elapsed> {
    time::timeout(Duration::from_secs(5), async {
        while !ready() {
            time::sleep(ms(10)).await;
        }
    })
    .await
}

async fn wait_for_phase(phase: &mut watch::Receiver<Phase>, wanted: Phase) -> TestResult {
    time::timeout(Duration::from_secs(5), async {
        while *phase.borrow_and_update() != wanted {
            if phase.changed().await.is_err() {
                break;
            }
        }
    })
    .await?;
    assert_eq!(*phase.borrow(), wanted);
    Ok(())
}

#[tokio::test]
async fn posts_are_decoded_and_everything_else_is_dropped() -> TestResult {
    let relay = FakeRelay::start();
    let cfg = client::Config::new(relay.url()?);
    let (handle, mut events) = client::spawn(cfg)?;
    wait_for_phase(&mut handle.watch_phase(), Phase::Open).await?;

    for raw in [DELETE, "not json", "{}", IDENTITY, POST].iter() {
        relay.feed.send(raw.to_string())?;
    }
    let event = time::timeout(Duration::from_secs(5), events.recv())
        .await?
        .ok_or("event channel closed")?;
    assert_eq!(event.text, "first light over the harbour this morning");
    assert_eq!(
        event.permalink.as_deref(),
        Some("https://bsky.app/profile/did:plc:eygmaihciaxprqvxpfvl6flk/post/3lbhtytnn2k2f")
    );

    handle.dispose().await?;
    Ok(())
}

#[tokio::test]
async fn a_silent_relay_is_abandoned_and_redialled() -> TestResult {
    let relay = FakeRelay::start();
    let (handle, _events) = client::spawn(quick(relay.url()?))?;

    wait_for(|| relay.opened() >= 3).await?;
    // Each abandoned connection was closed from the client's side
    wait_for(|| relay.closed() >= 2).await?;

    let lifecycle = handle.dispose().await?;
    assert_eq!(lifecycle.phase(), Phase::Closed);
    assert!(!lifecycle.timers_armed());
    Ok(())
}

#[tokio::test]
async fn traffic_keeps_a_connection_alive() -> TestResult {
    let relay = FakeRelay::start();
    let (handle, mut events) = client::spawn(quick(relay.url()?))?;
    wait_for_phase(&mut handle.watch_phase(), Phase::Open).await?;

    for _ in 0..20 {
        relay.feed.send(POST.to_string())?;
        time::sleep(ms(25)).await;
    }
    assert_eq!(relay.opened(), 1);
    assert!(events.recv().await.is_some());

    handle.dispose().await?;
    Ok(())
}

#[tokio::test]
async fn dispose_closes_for_good() -> TestResult {
    let relay = FakeRelay::start();
    let (handle, _events) = client::spawn(quick(relay.url()?))?;
    wait_for_phase(&mut handle.watch_phase(), Phase::Open).await?;

    let lifecycle = handle.dispose().await?;
    assert_eq!(lifecycle.phase(), Phase::Closed);
    assert!(!lifecycle.should_reconnect());
    assert!(!lifecycle.timers_armed());

    wait_for(|| relay.closed() == 1).await?;
    assert_eq!(relay.close_codes(), vec![1000]);
    time::sleep(ms(200)).await;
    assert_eq!(relay.opened(), 1);
    Ok(())
}

#[tokio::test]
async fn dropping_the_event_receiver_disposes() -> TestResult {
    let relay = FakeRelay::start();
    let (handle, events) = client::spawn(quick(relay.url()?).stale_check(ms(1000), ms(5000)))?;
    wait_for_phase(&mut handle.watch_phase(), Phase::Open).await?;

    // Nothing is sent afterwards, so no failed delivery can reveal the missing receiver
    drop(events);

    let lifecycle = time::timeout(Duration::from_secs(5), handle.join()).await??;
    assert_eq!(lifecycle.phase(), Phase::Closed);
    assert!(!lifecycle.should_reconnect());
    assert!(!lifecycle.timers_armed());
    wait_for(|| relay.closed() == 1).await?;
    assert_eq!(relay.close_codes(), vec![1000]);
    assert_eq!(relay.opened(), 1);
    Ok(())
}

#[tokio::test]
async fn dropping_the_event_receiver_stops_reconnecting() -> TestResult {
    let cfg = quick(Url::parse("ws://127.0.0.1:1/")?).reconnect_delays(ms(500), ms(0), ms(500));
    let (handle, events) = client::spawn(cfg)?;
    drop(events);

    let lifecycle = time::timeout(Duration::from_secs(5), handle.join()).await??;
    assert!(!lifecycle.should_reconnect());
    assert!(lifecycle.reconnect_attempts() <= 1);
    Ok(())
}

#[tokio::test]
async fn an_unreachable_relay_is_given_up_on() -> TestResult {
    let cfg = quick(Url::parse("ws://127.0.0.1:1/")?).max_reconnect_attempts(2);
    let (handle, mut events) = client::spawn(cfg)?;
    let mut phase = handle.watch_phase();

    let lifecycle = time::timeout(Duration::from_secs(10), handle.join()).await??;
    assert_eq!(lifecycle.reconnect_attempts(), 2);
    assert!(!lifecycle.timers_armed());
    assert_eq!(*phase.borrow_and_update(), Phase::Closed);
    assert!(events.recv().await.is_none());
    Ok(())
}
