//! The viewer's side of the relay: one managed WebSocket connection.
//!
//! A connection sends an application-level `ping` on a fixed interval, closes itself when
//! the relay has been silent for too long, and reconnects with a linearly growing delay
//! until its attempt budget runs out.  Calling [`Handle::dispose`] ends it for good.
//!
//! The rules live in [`Lifecycle`]; `connection` only moves bytes and timers.
mod config;
mod connection;
mod err;
mod lifecycle;

pub use config::Config;
pub use connection::{spawn, Handle};
pub use err::ClientErr;
pub use lifecycle::{Action, Lifecycle, Phase};
