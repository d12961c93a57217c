//! Relay for the Bluesky Jetstream firehose
//!
//!
//! The relay holds exactly one subscription to Jetstream and fans every message it receives out
//! to any number of downstream viewers over WebSockets.  Viewers keep their connection alive with
//! a heartbeat, notice silent connections, and reconnect with a bounded, linearly growing delay.
//!
//! # Notes on data flow
//! * **Jetstream → Connector**:
//! The `Connector` (in `response::upstream`) owns the only upstream WebSocket.  It forwards each
//! payload verbatim, without parsing it, and resubscribes after a fixed delay whenever the
//! connection closes.  It never gives up.
//!
//! * **Connector → Broadcaster**:
//! The `Broadcaster` owns the set of downstream sessions and sends each payload to every session
//! that is still open.  Sessions are added and removed under the same lock that broadcasts take,
//! so a removed session never sees a later message.
//!
//! * **Broadcaster → Warp**:
//! Every WebSocket accepted at `/` gets a channel and a writer task; the channel keeps messages
//! in upstream order.  `GET /health` reports the client count and whether Jetstream is connected.
//!
//! * **Relay → client**:
//! On the viewer side, `client` manages one connection to the relay: heartbeat, staleness
//! check, reconnects and teardown.  Payloads are decoded by `event`, and `presentation` decides
//! which of them appear on screen and how.

pub mod client;
pub mod config;
pub mod err;
pub mod event;
pub mod presentation;
pub mod request;
pub mod response;
