//! Turn raw Jetstream payloads into the few fields a viewer displays.
//!
//! A Jetstream commit for a new post looks roughly like this (trimmed):
//!
//! ```text
//! {"did":"did:plc:abc","time_us":1732206349000167,"kind":"commit",
//!  "commit":{"operation":"create","collection":"app.bsky.feed.post","rkey":"3lbhtytnn2k2f",
//!            "record":{"$type":"app.bsky.feed.post","text":"hello","langs":["en"]}}}
//! ```
//!
//! Most firehose records (deletes, identity and account events) carry no text; dropping them
//! is routine filtering, not a failure.
mod err;

pub use err::EventErr;

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

const PERMALINK_BASE: &str = "https://bsky.app/profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub text: String,
    pub did: Option<String>,
    pub rkey: Option<String>,
    pub permalink: Option<String>,
}

/// Repeated top-level keys are merged instead of rejected: a later `commit` fills in or
/// overrides the fields of an earlier one.
#[derive(Debug, Default)]
struct RawEvent {
    did: Option<String>,
    commit: Option<RawCommit>,
}

#[derive(Deserialize, Debug)]
struct RawCommit {
    rkey: Option<String>,
    record: Option<RawRecord>,
}

#[derive(Deserialize, Debug)]
struct RawRecord {
    text: Option<String>,
}

impl RawCommit {
    fn merge(self, later: RawCommit) -> Self {
        Self {
            rkey: later.rkey.or(self.rkey),
            record: later.record.or(self.record),
        }
    }
}

impl<'de> Deserialize<'de> for RawEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawEventVisitor)
    }
}

struct RawEventVisitor;

impl<'de> Visitor<'de> for RawEventVisitor {
    type Value = RawEvent;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a Jetstream event object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEvent, A::Error> {
        let mut raw = RawEvent::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "did" => raw.did = map.next_value::<Option<String>>()?.or(raw.did),
                "commit" => {
                    if let Some(later) = map.next_value::<Option<RawCommit>>()? {
                        raw.commit = Some(match raw.commit.take() {
                            Some(earlier) => earlier.merge(later),
                            None => later,
                        });
                    }
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(raw)
    }
}

impl DecodedEvent {
    fn from_raw(raw: RawEvent) -> Result<Self, EventErr> {
        let RawEvent { did, commit } = raw;
        let (rkey, record) = match commit {
            Some(RawCommit { rkey, record }) => (rkey, record),
            None => (None, None),
        };
        let text = record
            .and_then(|r| r.text)
            .filter(|text| !text.is_empty())
            .ok_or(EventErr::NoText)?;

        let did = did.filter(|d| !d.is_empty());
        let rkey = rkey.filter(|k| !k.is_empty());
        let permalink = match (&did, &rkey) {
            (Some(did), Some(rkey)) => Some(format!("{}/{}/post/{}", PERMALINK_BASE, did, rkey)),
            _ => None,
        };

        Ok(Self {
            text,
            did,
            rkey,
            permalink,
        })
    }
}

impl TryFrom<&str> for DecodedEvent {
    type Error = EventErr;

    fn try_from(payload: &str) -> Result<Self, Self::Error> {
        Self::from_raw(serde_json::from_str(payload)?)
    }
}

impl TryFrom<&[u8]> for DecodedEvent {
    type Error = EventErr;

    fn try_from(payload: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from(std::str::from_utf8(payload)?)
    }
}

/// Decode a payload, discarding anything without usable text.
pub fn decode(payload: &str) -> Option<DecodedEvent> {
    DecodedEvent::try_from(payload)
        .map_err(|e| log::trace!("Discarding payload: {}", e))
        .ok()
}
