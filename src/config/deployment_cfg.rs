use super::{deployment_cfg_types::*, EnvVar};
use crate::err::FatalErr;

#[derive(Debug, Default)]
pub struct Deployment<'a> {
    pub env: Env,
    pub log_level: LogLevel,
    pub address: RelayAddr,
    pub port: Port,
    pub cors: Cors<'a>,
}

impl Deployment<'_> {
    pub fn from_env(env: &EnvVar) -> Result<Self, FatalErr> {
        let cfg = Self {
            env: Env::default().maybe_update(env.get("RUST_ENV"))?,
            log_level: LogLevel::default().maybe_update(env.get("RUST_LOG"))?,
            address: RelayAddr::default().maybe_update(env.get("BIND"))?,
            port: Port::default().maybe_update(env.get("PORT"))?,
            cors: Cors::default(),
        };

        log::info!("Using deployment configuration:\n {:#?}", &cfg);
        Ok(cfg)
    }
}
