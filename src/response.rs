//! Relay Jetstream payloads to every connected viewer.

pub mod broadcast;
pub mod stream;
pub mod upstream;

pub use broadcast::{Broadcaster, Client};
pub use upstream::Connector;
