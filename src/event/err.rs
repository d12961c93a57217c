use std::{fmt, str::Utf8Error};

#[derive(Debug)]
pub enum EventErr {
    SerdeParse(serde_json::Error),
    NotUtf8(Utf8Error),
    NoText,
}

impl std::error::Error for EventErr {}

impl fmt::Display for EventErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use EventErr::*;
        match self {
            SerdeParse(inner) => write!(f, "{}", inner),
            NotUtf8(inner) => write!(f, "payload is not valid UTF-8: {}", inner),
            NoText => write!(f, "payload has no `commit.record.text` to display"),
        }?;
        Ok(())
    }
}

impl From<serde_json::Error> for EventErr {
    fn from(error: serde_json::Error) -> Self {
        Self::SerdeParse(error)
    }
}
impl From<Utf8Error> for EventErr {
    fn from(error: Utf8Error) -> Self {
        Self::NotUtf8(error)
    }
}
