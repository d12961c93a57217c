use crate::from_env_var;
use std::time::Duration;
use url::Url;

from_env_var!(
    /// The Jetstream subscription endpoint, without its query string
    let name = UpstreamUrl;
    let default: Url = Url::parse("wss://jetstream2.us-east.bsky.network/subscribe").expect("hardcoded");
    let (env_var, allowed_values) = ("JETSTREAM_URL", "a ws:// or wss:// URL");
    let from_str = |s| Url::parse(s).ok().filter(|url| matches!(url.scheme(), "ws" | "wss"));
);

from_env_var!(
    /// The record collections to ask Jetstream for
    let name = WantedCollections;
    let default: Vec<String> = vec!["app.bsky.feed.post".to_string()];
    let (env_var, allowed_values) = ("WANTED_COLLECTIONS", "a comma-separated list of NSIDs");
    let from_str = |s| {
        let collections: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|nsid| !nsid.is_empty())
            .map(String::from)
            .collect();
        Some(collections).filter(|c| !c.is_empty())
    };
);

from_env_var!(
    /// How long to wait before reconnecting to Jetstream after any closure
    let name = ReconnectDelay;
    let default: Duration = Duration::from_millis(5000);
    let (env_var, allowed_values) = ("UPSTREAM_RECONNECT_DELAY", "a number of milliseconds");
    let from_str = |s| s.parse().map(Duration::from_millis).ok();
);

from_env_var!(
    /// How often to send a keepalive ping to Jetstream
    let name = PingInterval;
    let default: Duration = Duration::from_millis(20_000);
    let (env_var, allowed_values) = ("UPSTREAM_PING_INTERVAL", "a positive number of milliseconds");
    let from_str = |s| s.parse().ok().filter(|ms: &u64| *ms > 0).map(Duration::from_millis);
);

from_env_var!(
    /// Silence from Jetstream (pongs included) longer than this closes the connection
    let name = StaleTimeout;
    let default: Duration = Duration::from_millis(40_000);
    let (env_var, allowed_values) = ("UPSTREAM_STALE_TIMEOUT", "a positive number of milliseconds");
    let from_str = |s| s.parse().ok().filter(|ms: &u64| *ms > 0).map(Duration::from_millis);
);
