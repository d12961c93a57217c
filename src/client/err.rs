use std::fmt;
use std::time::Duration;
use tokio_tungstenite::tungstenite;

#[derive(Debug)]
pub enum ClientErr {
    Config(String),
    Connect(tungstenite::Error),
    ConnectTimeout(Duration),
    Send(tungstenite::Error),
    Transport(tungstenite::Error),
    Join(tokio::task::JoinError),
}

impl std::error::Error for ClientErr {}

impl fmt::Display for ClientErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use ClientErr::*;
        let msg = match self {
            Config(reason) => format!("Invalid relay connection settings: {}", reason),
            Connect(inner) => format!("Could not connect to the relay: {}", inner),
            ConnectTimeout(after) => format!("Relay did not answer within {:?}", after),
            Send(inner) => format!("Could not send heartbeat: {}", inner),
            Transport(inner) => format!("Relay connection failed: {}", inner),
            Join(inner) => format!("Connection task ended abnormally: {}", inner),
        };
        write!(f, "{}", msg)
    }
}

impl From<tungstenite::Error> for ClientErr {
    fn from(e: tungstenite::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<tokio::task::JoinError> for ClientErr {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Join(e)
    }
}
