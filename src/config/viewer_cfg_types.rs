use crate::from_env_var;
use url::Url;

from_env_var!(
    /// The relay to connect to
    let name = RelayUrl;
    let default: Url = Url::parse("ws://127.0.0.1:8765/").expect("hardcoded");
    let (env_var, allowed_values) = ("RELAY_URL", "a ws:// or wss:// URL");
    let from_str = |s| Url::parse(s).ok().filter(|url| matches!(url.scheme(), "ws" | "wss"));
);

from_env_var!(
    /// Multiplier applied to the speed of every spawned post
    let name = BaseSpeed;
    let default: f32 = 1.0;
    let (env_var, allowed_values) = ("BASE_SPEED", "a positive number");
    let from_str = |s| s.parse().ok().filter(|speed: &f32| speed.is_finite() && *speed > 0.0);
);

from_env_var!(
    /// Share of incoming posts that are dropped before spawning
    let name = DiscardFraction;
    let default: f64 = 0.0;
    let (env_var, allowed_values) = ("DISCARD_FRACTION", "a number between 0.0 and 1.0");
    let from_str = |s| s.parse().ok().filter(|f: &f64| (0.0..=1.0).contains(f));
);

from_env_var!(
    /// Share of spawned posts that are rendered as special
    let name = SpecialChance;
    let default: f64 = 0.05;
    let (env_var, allowed_values) = ("SPECIAL_CHANCE", "a number between 0.0 and 1.0");
    let from_str = |s| s.parse().ok().filter(|f: &f64| (0.0..=1.0).contains(f));
);

from_env_var!(
    /// How many times the viewer retries the relay before giving up
    let name = MaxReconnectAttempts;
    let default: u32 = 50;
    let (env_var, allowed_values) = ("MAX_RECONNECT_ATTEMPTS", "a non-negative integer");
    let from_str = |s| s.parse().ok();
);
