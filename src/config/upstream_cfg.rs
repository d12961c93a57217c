use super::{upstream_cfg_types::*, EnvVar};
use crate::err::FatalErr;
use url::Url;

#[derive(Debug, Default, Clone)]
pub struct Upstream {
    pub url: UpstreamUrl,
    pub wanted_collections: WantedCollections,
    pub reconnect_delay: ReconnectDelay,
    pub ping_interval: PingInterval,
    pub stale_timeout: StaleTimeout,
}

impl Upstream {
    pub fn from_env(env: &EnvVar) -> Result<Self, FatalErr> {
        let cfg = Self {
            url: UpstreamUrl::default().maybe_update(env.get("JETSTREAM_URL"))?,
            wanted_collections: WantedCollections::default()
                .maybe_update(env.get("WANTED_COLLECTIONS"))?,
            reconnect_delay: ReconnectDelay::default()
                .maybe_update(env.get("UPSTREAM_RECONNECT_DELAY"))?,
            ping_interval: PingInterval::default().maybe_update(env.get("UPSTREAM_PING_INTERVAL"))?,
            stale_timeout: StaleTimeout::default().maybe_update(env.get("UPSTREAM_STALE_TIMEOUT"))?,
        };

        log::info!("Upstream configuration:\n{:#?}", &cfg);
        Ok(cfg)
    }

    /// The full subscription URL, with one `wantedCollections` pair per collection.
    pub fn endpoint(&self) -> Url {
        let mut url = self.url.0.clone();
        {
            let mut query = url.query_pairs_mut();
            for collection in self.wanted_collections.iter() {
                query.append_pair("wantedCollections", collection);
            }
        }
        url
    }
}
