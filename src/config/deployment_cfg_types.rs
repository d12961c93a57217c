use crate::from_env_var;
use std::{fmt, net::IpAddr, str::FromStr};
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

from_env_var!(
    /// The current environment, which controls what file to read other ENV vars from
    let name = Env;
    let default: EnvInner = EnvInner::Development;
    let (env_var, allowed_values) = ("RUST_ENV", format!("one of: {:?}", EnvInner::VARIANTS));
    let from_str = |s| EnvInner::from_str(s).ok();
);
#[derive(EnumString, VariantNames, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum EnvInner {
    Production,
    Development,
}

from_env_var!(
    /// The address to run the relay on
    let name = RelayAddr;
    let default: IpAddr = IpAddr::V4("0.0.0.0".parse().expect("hardcoded"));
    let (env_var, allowed_values) = ("BIND", "a valid address (e.g., 0.0.0.0)");
    let from_str = |s| s.parse().ok();
);

from_env_var!(
    /// The port to run the relay on
    let name = Port;
    let default: u16 = 8765;
    let (env_var, allowed_values) = ("PORT", "a number between 0 and 65535");
    let from_str = |s| s.parse().ok();
);

from_env_var!(
    /// How verbosely the relay should log messages
    let name = LogLevel;
    let default: LogLevelInner = LogLevelInner::Warn;
    let (env_var, allowed_values) = ("RUST_LOG", format!("one of {:?}", LogLevelInner::VARIANTS));
    let from_str = |s| LogLevelInner::from_str(s).ok();
);
#[derive(EnumString, VariantNames, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum LogLevelInner {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevelInner {
    pub fn as_filter(self) -> log::LevelFilter {
        use LogLevelInner::*;
        match self {
            Trace => log::LevelFilter::Trace,
            Debug => log::LevelFilter::Debug,
            Info => log::LevelFilter::Info,
            Warn => log::LevelFilter::Warn,
            Error => log::LevelFilter::Error,
        }
    }
}

/// Permissions for Cross Origin Resource Sharing (CORS)
#[derive(Clone)]
pub struct Cors<'a> {
    pub allowed_headers: Vec<&'a str>,
    pub allowed_methods: Vec<&'a str>,
}
impl fmt::Debug for Cors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allowed headers: {:?}\n      allowed methods: {:?}",
            self.allowed_headers, self.allowed_methods
        )
    }
}
impl std::default::Default for Cors<'_> {
    fn default() -> Self {
        Self {
            allowed_methods: vec!["GET", "OPTIONS"],
            allowed_headers: vec!["Accept", "Cache-Control"],
        }
    }
}
