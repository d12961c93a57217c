use super::{viewer_cfg_types::*, EnvVar};
use crate::err::FatalErr;

#[derive(Debug, Default, Clone)]
pub struct Viewer {
    pub relay_url: RelayUrl,
    pub base_speed: BaseSpeed,
    pub discard_fraction: DiscardFraction,
    pub special_chance: SpecialChance,
    pub max_reconnect_attempts: MaxReconnectAttempts,
}

impl Viewer {
    pub fn from_env(env: &EnvVar) -> Result<Self, FatalErr> {
        let cfg = Self {
            relay_url: RelayUrl::default().maybe_update(env.get("RELAY_URL"))?,
            base_speed: BaseSpeed::default().maybe_update(env.get("BASE_SPEED"))?,
            discard_fraction: DiscardFraction::default()
                .maybe_update(env.get("DISCARD_FRACTION"))?,
            special_chance: SpecialChance::default().maybe_update(env.get("SPECIAL_CHANCE"))?,
            max_reconnect_attempts: MaxReconnectAttempts::default()
                .maybe_update(env.get("MAX_RECONNECT_ATTEMPTS"))?,
        };

        log::info!("Viewer configuration:\n{:#?}", &cfg);
        Ok(cfg)
    }
}
