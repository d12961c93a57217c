use std::fmt;
use std::time::Duration;
use tokio_tungstenite::tungstenite;

#[derive(Debug)]
pub enum UpstreamErr {
    Connect { url: String, inner: tungstenite::Error },
    Transport(tungstenite::Error),
    Stale(Duration),
}

impl UpstreamErr {
    pub(super) fn with_url<T: AsRef<str>>(url: T, inner: tungstenite::Error) -> Self {
        Self::Connect {
            url: url.as_ref().to_string(),
            inner,
        }
    }
}

impl std::error::Error for UpstreamErr {}

impl fmt::Display for UpstreamErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use UpstreamErr::*;
        let msg = match self {
            Connect { url, inner } => format!(
                "Error connecting to Jetstream at {}.\n\
                 Connection Error: {}",
                url, inner
            ),
            Transport(inner) => format!("Jetstream connection failed: {}", inner),
            Stale(silent_for) => format!(
                "Jetstream has been silent for {:?}; abandoning the connection",
                silent_for
            ),
        };
        write!(f, "{}", msg)
    }
}

impl From<tungstenite::Error> for UpstreamErr {
    fn from(e: tungstenite::Error) -> Self {
        Self::Transport(e)
    }
}
