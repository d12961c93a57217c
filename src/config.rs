//! Configuration for the relay and the viewer.
//!
//! Every setting has a default that can be overridden by an environmental variable (set
//! either at runtime or in the `.env` file).
pub use {deployment_cfg::Deployment, upstream_cfg::Upstream, viewer_cfg::Viewer};

pub use self::environmental_variables::EnvVar;
use super::err;
use hashbrown::HashMap;
use std::env;

pub mod deployment_cfg_types;
pub mod upstream_cfg_types;
pub mod viewer_cfg_types;

mod deployment_cfg;
mod environmental_variables;
mod upstream_cfg;
mod viewer_cfg;


/// Load `.env` (or `.env.production` when `ENV=production`) into the process environment.
///
/// A missing file is not an error; the defaults and the real environment still apply.
pub fn merge_dotenv() -> Result<(), err::FatalErr> {
    let env_file = match env::var("ENV").ok().as_deref() {
        Some("production") => ".env.production",
        Some("development") | None => ".env",
        Some(unsupported) => Err(err::FatalErr::config(
            "ENV",
            unsupported,
            "`production` or `development`",
        ))?,
    };
    match dotenv::from_filename(env_file) {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub fn from_env<'a>(env_vars: HashMap<String, String>) -> Result<(Upstream, Deployment<'a>), err::FatalErr> {
    let env_vars = EnvVar::new(env_vars);
    log::info!("Environmental variables the relay received: {}", &env_vars);
    Ok((Upstream::from_env(&env_vars)?, Deployment::from_env(&env_vars)?))
}

pub fn viewer_from_env(env_vars: HashMap<String, String>) -> Result<Viewer, err::FatalErr> {
    let env_vars = EnvVar::new(env_vars);
    log::info!("Environmental variables the viewer received: {}", &env_vars);
    Viewer::from_env(&env_vars)
}
